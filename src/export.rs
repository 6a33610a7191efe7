/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 書き出し処理(リサイズ・ファイル名の決定・保存)
//!

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::{self, OutputFormat, DEFAULT_JPEG_QUALITY};
use crate::compositor::apply_watermark;
use crate::error::Result;
use crate::style::{Placement, WatermarkStyle};
use crate::transform::resize_rgba;

///
/// 書き出し時のリサイズ方法
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeMode {
    /// リサイズしない
    #[default]
    None,

    /// 幅を指定(高さは縦横比から算出)
    Width,

    /// 高さを指定(幅は縦横比から算出)
    Height,

    /// 百分率で指定
    Percent,
}

// FromStrトレイトの実装
impl FromStr for ResizeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "width" => Ok(Self::Width),
            "height" => Ok(Self::Height),
            "percent" => Ok(Self::Percent),
            _ => Err(format!("unknown resize mode: {}", s)),
        }
    }
}

// Displayトレイトの実装
impl Display for ResizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Self::None => "none",
            Self::Width => "width",
            Self::Height => "height",
            Self::Percent => "percent",
        })
    }
}

///
/// 書き出し時のリサイズ指定
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeSpec {
    /// リサイズ方法
    pub mode: ResizeMode,

    /// `Width`指定時の幅
    pub width: i32,

    /// `Height`指定時の高さ
    pub height: i32,

    /// `Percent`指定時の倍率(%)
    pub percent: i32,
}

impl ResizeSpec {
    /// リサイズ無し
    pub fn none() -> Self {
        Self::default()
    }

    /// 幅指定
    pub fn width(width: i32) -> Self {
        Self { mode: ResizeMode::Width, width, ..Default::default() }
    }

    /// 高さ指定
    pub fn height(height: i32) -> Self {
        Self { mode: ResizeMode::Height, height, ..Default::default() }
    }

    /// 百分率指定
    pub fn percent(percent: i32) -> Self {
        Self { mode: ResizeMode::Percent, percent, ..Default::default() }
    }

    ///
    /// リサイズ後の大きさの算出
    ///
    /// # 引数
    /// * `original` - 元画像の大きさ(幅, 高さ)
    ///
    /// # 戻り値
    /// リサイズが必要な場合は新しい大きさを`Some()`でラップして返す。指定が
    /// 無効な場合や元画像が空の場合は`None`を返す。
    ///
    pub fn target_size(&self, original: (u32, u32)) -> Option<(u32, u32)> {
        let (ow, oh) = (original.0 as u64, original.1 as u64);
        if ow == 0 || oh == 0 {
            return None;
        }

        let scaled = |value: u64, num: u64, den: u64| ((value * num / den) as u32).max(1);

        match self.mode {
            ResizeMode::None => None,

            ResizeMode::Width if self.width > 0 => {
                let tw = self.width as u64;
                Some((tw as u32, scaled(oh, tw, ow)))
            }

            ResizeMode::Height if self.height > 0 => {
                let th = self.height as u64;
                Some((scaled(ow, th, oh), th as u32))
            }

            ResizeMode::Percent if self.percent > 0 => {
                let p = self.percent as u64;
                Some((scaled(ow, p, 100), scaled(oh, p, 100)))
            }

            _ => None,
        }
    }
}

///
/// 縦横比を維持したリサイズ
///
/// # 引数
/// * `image` - リサイズ元の画像
/// * `spec` - リサイズ指定
///
/// # 戻り値
/// リサイズした画像を返す。リサイズ不要な場合や処理に失敗した場合は元の画
/// 像をそのまま返す。
///
pub fn resize_proportional(image: RgbaImage, spec: &ResizeSpec) -> RgbaImage {
    let Some((width, height)) = spec.target_size(image.dimensions()) else {
        return image;
    };

    debug!(from = ?image.dimensions(), to = ?(width, height), "resize output");

    let fallback = image.clone();
    match resize_rgba(image, width, height) {
        Ok(resized) => resized,
        Err(err) => {
            warn!(%err, "resize failed, keeping original size");
            fallback
        }
    }
}

///
/// 出力ファイル名の命名規則
///
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamingRule {
    /// 元のファイル名のまま
    #[default]
    Original,

    /// 接頭辞を付ける
    Prefix(String),

    /// 接尾辞を付ける
    Suffix(String),
}

///
/// 出力ファイル名の決定
///
/// # 引数
/// * `input` - 入力ファイルへのパス
/// * `rule` - 命名規則
/// * `format` - 出力フォーマット
///
/// # 戻り値
/// 拡張子を含む出力ファイル名を返す。
///
pub fn output_file_name<P>(input: P, rule: &NamingRule, format: OutputFormat) -> String
where
    P: AsRef<Path>
{
    let stem = input.as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match rule {
        NamingRule::Original => stem,
        NamingRule::Prefix(prefix) => format!("{}{}", prefix, stem),
        NamingRule::Suffix(suffix) => format!("{}{}", stem, suffix),
    };

    format!("{}.{}", name, format.extension())
}

///
/// 書き出し設定
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// 出力フォーマット
    pub format: OutputFormat,

    /// JPEG品質(0〜100)
    pub jpeg_quality: i32,

    /// リサイズ指定
    pub resize: ResizeSpec,

    /// 命名規則
    pub naming: NamingRule,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            resize: ResizeSpec::none(),
            naming: NamingRule::Original,
        }
    }
}

impl ExportOptions {
    ///
    /// 出力先パスの決定
    ///
    /// # 引数
    /// * `input` - 入力ファイルへのパス
    /// * `output_dir` - 出力先ディレクトリ
    ///
    pub fn output_path<P, Q>(&self, input: P, output_dir: Q) -> PathBuf
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        output_dir.as_ref().join(output_file_name(input, &self.naming, self.format))
    }
}

///
/// 1ファイルの書き出し
///
/// # 引数
/// * `input` - 入力画像ファイルへのパス
/// * `output_dir` - 出力先ディレクトリ(無ければ作成する)
/// * `style` - 透かしのスタイル
/// * `placement` - 配置指定
/// * `options` - 書き出し設定
///
/// # 戻り値
/// 処理に成功した場合は書き出したファイルへのパスを`Ok()`でラップして返す。
/// 入力画像をデコードできなかった場合は`Error::Decode`を返す。
///
/// # 注記
/// 透かしの合成は元の解像度で行い、リサイズはその後に行う。
///
pub fn export_file<P, Q>(
    input: P,
    output_dir: Q,
    style: &WatermarkStyle,
    placement: &Placement,
    options: &ExportOptions,
) -> Result<PathBuf>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();

    /*
     * 入力画像のデコード
     */
    let base = DynamicImage::ImageRgba8(codec::decode_image(input)?);

    /*
     * 透かしの合成とリサイズ
     */
    let composed = apply_watermark(&base, style, placement);
    let resized = resize_proportional(composed, &options.resize);

    /*
     * ファイルの書き込み
     */
    std::fs::create_dir_all(output_dir)?;
    let output = options.output_path(input, output_dir);
    codec::save_image(&resized, options.format, options.jpeg_quality, &output)?;

    Ok(output)
}
