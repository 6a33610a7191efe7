/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 画像ファイルのデコードとエンコード
//!

use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

use image::{imageops, ImageBuffer, ImageError, ImageFormat, RgbaImage};
use mozjpeg::{ColorSpace, Compress, Decompress};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// JPEG品質の既定値
pub const DEFAULT_JPEG_QUALITY: i32 = 90;

///
/// 出力フォーマット
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG(可逆、アルファ保持)
    #[default]
    Png,

    /// JPEG(RGBに平坦化)
    Jpeg,
}

impl OutputFormat {
    /// 出力ファイルの拡張子
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

// FromStrトレイトの実装
impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

// Displayトレイトの実装
impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        })
    }
}

///
/// 画像ファイルのデコード
///
/// # 引数
/// * `path` - デコード対象の画像ファイルへのパス
///
/// # 戻り値
/// 処理に成功した場合はデコードした画像を`RgbaImage`オブジェクトとして`Ok()`
/// でラップして返す。デコードできなかった場合は`Error::Decode`を返す。
///
/// # 注記
/// JPEGはmozjpegで、それ以外は`image`クレートでデコードする。EXIFの向き情
/// 報がある場合は表示上の向きに回転した画像を返す。
///
pub fn decode_image<P>(path: P) -> Result<RgbaImage>
where
    P: AsRef<Path>
{
    let path = path.as_ref();

    let decoded = if is_jpeg(path) {
        decode_jpeg(path).or_else(|err| {
            debug!(path = %path.display(), %err, "mozjpeg failed, retrying");
            image::open(path).map(|img| img.to_rgba8())
        })
    } else {
        image::open(path).map(|img| img.to_rgba8())
    };

    let image = decoded.map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(apply_orientation(image, read_orientation(path)))
}

///
/// JPEGファイルのデコード
///
fn decode_jpeg(path: &Path) -> std::result::Result<RgbaImage, ImageError> {
    let reader = BufReader::new(File::open(path)?);

    let mut decomp = Decompress::new_reader(reader)?.rgba()?;

    let width = decomp.width() as u32;
    let height = decomp.height() as u32;
    let pixels = decomp.read_scanlines::<[u8; 4]>()?.concat();

    ImageBuffer::from_raw(width, height, pixels)
        .ok_or_else(|| ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "invalid dimensions"
        )))
}

///
/// EXIFの向き情報の取得
///
fn read_orientation(path: &Path) -> Option<u32> {
    let mut reader = BufReader::new(File::open(path).ok()?);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
        .value
        .get_uint(0)
}

///
/// EXIFの向き情報の適用
///
/// # 引数
/// * `image` - デコードした画像
/// * `orientation` - EXIFの向き情報(1〜8)
///
pub fn apply_orientation(image: RgbaImage, orientation: Option<u32>) -> RgbaImage {
    match orientation {
        Some(2) => imageops::flip_horizontal(&image),
        Some(3) => imageops::rotate180(&image),
        Some(4) => imageops::flip_vertical(&image),
        Some(5) => imageops::flip_horizontal(&imageops::rotate90(&image)),
        Some(6) => imageops::rotate90(&image),
        Some(7) => imageops::flip_horizontal(&imageops::rotate270(&image)),
        Some(8) => imageops::rotate270(&image),
        _ => image,
    }
}

///
/// 画像の保存
///
/// # 引数
/// * `image` - 保存する画像
/// * `format` - 出力フォーマット
/// * `jpeg_quality` - JPEG品質(0〜100、PNGでは無視)
/// * `path` - 書き込み先ファイルへのパス
///
pub fn save_image<P>(image: &RgbaImage, format: OutputFormat, jpeg_quality: i32, path: P)
    -> Result<()>
where
    P: AsRef<Path>
{
    match format {
        OutputFormat::Png => Ok(image.save_with_format(path, ImageFormat::Png)?),
        OutputFormat::Jpeg => encode_jpeg(path, image, jpeg_quality),
    }
}

///
/// JPEGファイルへのエンコード(ファイルへの出力)
///
/// # 引数
/// * `path` - エンコード結果の書き込み対象ファイルへのパス
/// * `image` - エンコード対象のイメージデータ
/// * `quality` - 品質(0〜100)
///
/// # 注記
/// アルファチャネルは捨ててRGBとして書き込む。
///
fn encode_jpeg<P>(path: P, image: &RgbaImage, quality: i32) -> Result<()>
where
    P: AsRef<Path>
{
    let rgb: Vec<u8> = image.pixels()
        .flat_map(|p| [p[0], p[1], p[2]])
        .collect();

    let writer = BufWriter::new(File::create(path)?);

    let mut comp = Compress::new(ColorSpace::JCS_RGB);
    comp.set_size(image.width() as usize, image.height() as usize);
    comp.set_quality(quality.clamp(0, 100) as f32);
    comp.set_optimize_coding(true);

    let mut comp = comp.start_compress(writer)?;
    comp.write_scanlines(&rgb)?;
    comp.finish()?;

    Ok(())
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, Rgba};

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(16, 8, |x, y| Rgba([x as u8 * 10, y as u8 * 20, 128, 100]))
    }

    #[test]
    fn png_keeps_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_image(&sample(), OutputFormat::Png, 90, &path).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgba8);
        assert_eq!(decoded.to_rgba8(), sample());
    }

    #[test]
    fn jpeg_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        save_image(&sample(), OutputFormat::Jpeg, 80, &path).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn jpeg_round_trips_through_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpeg");
        save_image(&sample(), OutputFormat::Jpeg, 95, &path).unwrap();

        let decoded = decode_image(&path).unwrap();
        assert_eq!(decoded.dimensions(), (16, 8));
        assert!(decoded.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn undecodable_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        match decode_image(&path) {
            Err(Error::Decode { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected: {:?}", other.map(|i| i.dimensions())),
        }
    }

    #[test]
    fn orientation_six_rotates_clockwise() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));

        let rotated = apply_orientation(img.clone(), Some(6));
        assert_eq!(rotated.dimensions(), (2, 3));
        assert_eq!(rotated.get_pixel(1, 0)[0], 255);

        assert_eq!(apply_orientation(img.clone(), None), img);
        assert_eq!(apply_orientation(img.clone(), Some(1)), img);
    }

    #[test]
    fn format_names() {
        assert_eq!("JPG".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("png".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert!("gif".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
    }
}
