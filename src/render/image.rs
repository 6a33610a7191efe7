/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 画像透かしの描画
//!

use image::RgbaImage;
use tracing::{debug, warn};

use crate::style::{ImageStyle, Placement, ScaleMode};
use crate::transform::{normalize_degrees, resize_rgba, rotate_expand};

use super::RenderedLayer;

///
/// 画像透かしの描画
///
/// # 引数
/// * `style` - 画像透かしのスタイル
/// * `placement` - 配置指定
/// * `canvas` - 貼り付け先画像の大きさ(幅, 高さ)
///
/// # 戻り値
/// 画像と同じ大きさの透明レイヤーに配置済みの透かしを描いたものを返す。透
/// かし画像を読み込めなかった場合は`None`を返す(呼び出し側は元画像をその
/// まま使う)。
///
pub fn render_image(style: &ImageStyle, placement: &Placement, canvas: (u32, u32))
    -> Option<RenderedLayer>
{
    image_content(style).map(|content| RenderedLayer::place(content, placement, canvas))
}

///
/// 配置前の画像透かしレイヤーの生成
///
pub(crate) fn image_content(style: &ImageStyle) -> Option<RgbaImage> {
    let source = match image::open(&style.path) {
        Ok(source) => source.to_rgba8(),
        Err(err) => {
            warn!(path = %style.path.display(), %err, "cannot load watermark image");
            return None;
        }
    };

    let (width, height) = target_size(source.dimensions(), style);
    debug!(width, height, "watermark image size");

    let resized = match resize_rgba(source, width, height) {
        Ok(resized) => resized,
        Err(err) => {
            warn!(%err, "cannot resize watermark image");
            return None;
        }
    };

    let mut layer = if normalize_degrees(style.rotation) != 0 {
        rotate_expand(&resized, style.rotation)
    } else {
        resized
    };

    apply_opacity(&mut layer, style.opacity);

    Some(layer)
}

///
/// 透かし画像の出力サイズの算出
///
/// # 引数
/// * `original` - 透かし画像の元の大きさ(幅, 高さ)
/// * `style` - 画像透かしのスタイル
///
/// # 戻り値
/// リサイズ後の大きさ(幅, 高さ)を返す。各辺は1ピクセル以上となる。
///
/// # 注記
/// 百分率指定では切り捨てで算出する。直接指定で縦横比を維持する場合は、幅
/// の指定を優先して高さを求め、幅が未指定なら高さから幅を求める。どちらも
/// 未指定なら元の大きさのままとする。
///
pub fn target_size(original: (u32, u32), style: &ImageStyle) -> (u32, u32) {
    let (ow, oh) = original;
    if ow == 0 || oh == 0 {
        return original;
    }

    let scaled = |value: u32, num: u64, den: u64| -> u32 {
        ((value as u64 * num / den) as u32).max(1)
    };

    match style.scale_mode {
        ScaleMode::Percent => {
            let percent = style.scale_percent.max(1) as u64;
            (scaled(ow, percent, 100), scaled(oh, percent, 100))
        }

        ScaleMode::Free if style.keep_aspect => {
            if style.free_width > 0 {
                let w = style.free_width as u32;
                (w, scaled(oh, w as u64, ow as u64))
            } else if style.free_height > 0 {
                let h = style.free_height as u32;
                (scaled(ow, h as u64, oh as u64), h)
            } else {
                original
            }
        }

        ScaleMode::Free => {
            let w = if style.free_width > 0 { style.free_width as u32 } else { ow };
            let h = if style.free_height > 0 { style.free_height as u32 } else { oh };
            (w, h)
        }
    }
}

///
/// 不透明度の適用
///
/// # 引数
/// * `layer` - 対象のレイヤー
/// * `opacity` - 不透明度(%、0〜100にクランプ)
///
/// # 注記
/// 各ピクセルのアルファに倍率を掛ける。ロゴ自身の半透明部分の比率はその
/// まま保たれる。
///
pub fn apply_opacity(layer: &mut RgbaImage, opacity: i32) {
    let opacity = opacity.clamp(0, 100) as u32;
    if opacity == 100 {
        return;
    }

    for pixel in layer.pixels_mut() {
        pixel[3] = ((pixel[3] as u32 * opacity + 50) / 100) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::path::PathBuf;

    fn free(width: i32, height: i32, keep_aspect: bool) -> ImageStyle {
        ImageStyle {
            scale_mode: ScaleMode::Free,
            free_width: width,
            free_height: height,
            keep_aspect,
            ..ImageStyle::new("logo.png")
        }
    }

    #[test]
    fn percent_mode_floors_with_minimum() {
        let style = ImageStyle { scale_percent: 50, ..ImageStyle::new("logo.png") };
        assert_eq!(target_size((201, 99), &style), (100, 49));

        let tiny = ImageStyle { scale_percent: 1, ..ImageStyle::new("logo.png") };
        assert_eq!(target_size((50, 20), &tiny), (1, 1));

        let clamped = ImageStyle { scale_percent: -5, ..ImageStyle::new("logo.png") };
        assert_eq!(target_size((400, 200), &clamped), (4, 2));
    }

    #[test]
    fn free_mode_with_aspect_derives_missing_side() {
        assert_eq!(target_size((400, 200), &free(100, 999, true)), (100, 50));
        assert_eq!(target_size((400, 200), &free(0, 50, true)), (100, 50));
        assert_eq!(target_size((400, 200), &free(0, 0, true)), (400, 200));
    }

    #[test]
    fn free_mode_without_aspect_uses_values() {
        assert_eq!(target_size((400, 200), &free(120, 30, false)), (120, 30));
        assert_eq!(target_size((400, 200), &free(0, 30, false)), (400, 30));
        assert_eq!(target_size((400, 200), &free(-1, -1, false)), (400, 200));
    }

    #[test]
    fn opacity_scales_existing_alpha() {
        let mut layer = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 128]));
        layer.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        apply_opacity(&mut layer, 50);

        assert!(layer.get_pixel(0, 0)[3].abs_diff(64) <= 1);
        assert!(layer.get_pixel(1, 0)[3].abs_diff(128) <= 1);
        assert_eq!(layer.get_pixel(0, 0)[0], 10);
    }

    #[test]
    fn missing_file_yields_no_layer() {
        let style = ImageStyle::new(PathBuf::from("/nonexistent/logo.png"));
        assert!(image_content(&style).is_none());
    }

    #[test]
    fn loaded_logo_is_resized_and_dimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(40, 20, Rgba([255, 0, 0, 200])).save(&path).unwrap();

        let style = ImageStyle { opacity: 50, ..ImageStyle::new(&path) };
        let layer = image_content(&style).unwrap();

        assert_eq!(layer.dimensions(), (20, 10));
        assert!(layer.get_pixel(10, 5)[3].abs_diff(100) <= 1);
    }

    #[test]
    fn rotated_logo_expands_its_footprint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(40, 20, Rgba([0, 0, 255, 255])).save(&path).unwrap();

        let upright = image_content(&ImageStyle { rotation: 90, ..ImageStyle::new(&path) }).unwrap();
        assert_eq!(upright.dimensions(), (10, 20));

        let tilted = image_content(&ImageStyle { rotation: 45, ..ImageStyle::new(&path) }).unwrap();
        assert_eq!(tilted.dimensions(), (22, 22));
        assert_eq!(tilted.get_pixel(0, 0)[3], 0);
        assert!(tilted.get_pixel(11, 11)[3] > 0);
    }
}
