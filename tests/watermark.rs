/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

use image::{DynamicImage, Rgba, RgbaImage};
use photo_watermarker::settings::{NamingKind, WatermarkKind};
use photo_watermarker::{
    apply_watermark, export_file, parse_hex_color, render, render_preview, watermark_extent,
    Anchor, Color, Error, ExportOptions, ImageStyle, OutputFormat, Placement, ResizeSpec,
    Settings, TemplateStore, TextStyle, WatermarkStyle
};

const BACKGROUND: Rgba<u8> = Rgba([240, 240, 240, 255]);

fn plain_base(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, BACKGROUND))
}

fn sample_style() -> WatermarkStyle {
    WatermarkStyle::Text(TextStyle {
        font_size: 40,
        opacity: 100,
        ..TextStyle::new("SAMPLE")
    })
}

#[test]
fn centered_text_lands_near_center() {
    let base = plain_base(800, 600);
    let style = sample_style();
    let placement = Placement::anchored(Anchor::Center);

    let out = apply_watermark(&base, &style, &placement);
    assert_eq!(out.dimensions(), (800, 600));

    let (ew, eh) = watermark_extent(&style, (800, 600)).unwrap();
    let (half_w, half_h) = (ew as i64 / 2 + 1, eh as i64 / 2 + 1);

    let mut changed = 0;
    for (x, y, p) in out.enumerate_pixels() {
        if *p != BACKGROUND {
            changed += 1;
            assert!((x as i64 - 400).abs() <= half_w, "pixel at x={} outside extent", x);
            assert!((y as i64 - 300).abs() <= half_h, "pixel at y={} outside extent", y);
        }
    }

    assert!(changed > 0);
}

#[test]
fn every_anchor_stays_inside_canvas() {
    let style = sample_style();

    for anchor in Anchor::FIXED {
        let layer = render(&style, &Placement::anchored(anchor), (640, 480)).unwrap();
        let (x, y) = layer.position;
        let (w, h) = layer.content_size;

        assert!(x + w <= 640, "{} overflows horizontally", anchor);
        assert!(y + h <= 480, "{} overflows vertically", anchor);
    }
}

#[test]
fn custom_points_are_clamped() {
    let style = sample_style();
    let canvas = (800, 600);

    let low = render(&style, &Placement::custom(-50, -50), canvas).unwrap();
    assert_eq!(low.position, (0, 0));

    let high = render(&style, &Placement::custom(900, 700), canvas).unwrap();
    let (w, h) = high.content_size;
    assert_eq!(high.position, (800 - w, 600 - h));
}

#[test]
fn zero_opacity_round_trip_is_identity() {
    let base = DynamicImage::ImageRgba8(RgbaImage::from_fn(300, 200, |x, y| {
        Rgba([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8, 255])
    }));

    let text = WatermarkStyle::Text(TextStyle {
        opacity: 0,
        shadow_enabled: true,
        stroke_width: 2,
        ..TextStyle::new("SAMPLE")
    });
    assert_eq!(apply_watermark(&base, &text, &Placement::default()), base.to_rgba8());

    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    RgbaImage::from_pixel(60, 30, Rgba([255, 0, 0, 255])).save(&logo).unwrap();

    let image = WatermarkStyle::Image(ImageStyle { opacity: 0, ..ImageStyle::new(&logo) });
    assert_eq!(apply_watermark(&base, &image, &Placement::default()), base.to_rgba8());
}

#[test]
fn missing_logo_leaves_base_unchanged() {
    let base = plain_base(120, 90);
    let style = WatermarkStyle::Image(ImageStyle::new("/nonexistent/logo.png"));

    assert_eq!(apply_watermark(&base, &style, &Placement::default()), base.to_rgba8());
}

#[test]
fn logo_watermark_is_composited() {
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    RgbaImage::from_pixel(100, 50, Rgba([0, 0, 255, 255])).save(&logo).unwrap();

    let style = WatermarkStyle::Image(ImageStyle { opacity: 100, ..ImageStyle::new(&logo) });
    let out = apply_watermark(&plain_base(400, 300), &style, &Placement::anchored(Anchor::TopLeft));

    let is_blue = |p: &Rgba<u8>| p[2] > 240 && p[0] < 16 && p[1] < 16;

    // 50% に縮小されたロゴが左上の余白の内側に置かれる
    assert!(is_blue(out.get_pixel(10, 10)));
    assert!(is_blue(out.get_pixel(35, 22)));
    assert!(is_blue(out.get_pixel(59, 34)));
    assert_eq!(*out.get_pixel(61, 36), BACKGROUND);
    assert_eq!(*out.get_pixel(5, 5), BACKGROUND);
}

#[test]
fn color_parsing_examples() {
    assert_eq!(parse_hex_color(Some("#1A2B3C")), Color::new(26, 43, 60));
    assert_eq!(parse_hex_color(Some("bad")), Color::BLACK);
    assert_eq!(parse_hex_color(Some("")), Color::BLACK);
    assert_eq!(parse_hex_color(None), Color::BLACK);
    assert_eq!(parse_hex_color(Some("#ZZZZZZ")), Color::BLACK);
}

#[test]
fn export_formats_and_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photo.png");
    RgbaImage::from_pixel(200, 100, Rgba([10, 120, 200, 128])).save(&input).unwrap();

    let out_dir = dir.path().join("out");
    let style = sample_style();
    let placement = Placement::anchored(Anchor::BottomRight);

    let png = export_file(&input, &out_dir, &style, &placement, &ExportOptions::default()).unwrap();
    assert_eq!(png, out_dir.join("photo.png"));
    assert!(image::open(&png).unwrap().color().has_alpha());

    let jpeg_options = ExportOptions {
        format: OutputFormat::Jpeg,
        jpeg_quality: 75,
        resize: ResizeSpec::percent(50),
        ..Default::default()
    };
    let jpeg = export_file(&input, &out_dir, &style, &placement, &jpeg_options).unwrap();
    let decoded = image::open(&jpeg).unwrap();

    assert_eq!(jpeg, out_dir.join("photo.jpg"));
    assert!(!decoded.color().has_alpha());
    assert_eq!((decoded.width(), decoded.height()), (100, 50));
}

#[test]
fn undecodable_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.bmp");
    std::fs::write(&input, b"").unwrap();

    let result = export_file(
        &input,
        dir.path().join("out"),
        &sample_style(),
        &Placement::default(),
        &ExportOptions::default(),
    );

    match result {
        Err(Error::Decode { path, .. }) => assert_eq!(path, input),
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[test]
fn settings_drive_a_full_export() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("IMG_0001.png");
    RgbaImage::from_pixel(320, 240, BACKGROUND).save(&input).unwrap();

    let settings = Settings {
        text: "© Studio".into(),
        opacity: 90,
        position: Anchor::Top,
        format: OutputFormat::Jpeg,
        naming: NamingKind::Prefix,
        prefix: "wm_".into(),
        font_color: "#FF0000".into(),
        ..Default::default()
    };
    assert_eq!(settings.watermark_type, WatermarkKind::Text);

    let written = export_file(
        &input,
        dir.path(),
        &settings.watermark_style(),
        &settings.placement(),
        &settings.export_options(),
    ).unwrap();

    assert_eq!(written, dir.path().join("wm_IMG_0001.jpg"));
}

#[test]
fn templates_survive_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("templates.toml");

    let mut store = TemplateStore::default();
    store.add_or_update(Settings { name: "corner".into(), position: Anchor::TopLeft, ..Default::default() });
    store.add_or_update(Settings { name: "faint".into(), opacity: 15, ..Default::default() });
    store.save(&path).unwrap();

    let loaded = TemplateStore::load(&path).unwrap();
    assert_eq!(loaded.names(), vec!["corner", "faint"]);
    assert_eq!(loaded.find("faint").map(|t| t.opacity), Some(15));
}

#[test]
fn preview_uses_the_export_path() {
    let base = plain_base(800, 600);
    let preview = render_preview(&base, &sample_style(), &Placement::anchored(Anchor::Center), (200, 200));

    assert_eq!(preview.dimensions(), (200, 150));
    assert!(preview.pixels().any(|p| *p != BACKGROUND));
}
