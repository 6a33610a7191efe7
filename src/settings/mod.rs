/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 設定情報の保存と復元
//!
//! 設定はスタイル・配置・出力の全項目を平坦に並べたレコードとしてTOMLに
//! 保存する。欠けている項目は既定値で補う。
//!

mod template;

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::BaseDirs;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::codec::{OutputFormat, DEFAULT_JPEG_QUALITY};
use crate::color::{parse_hex_color, Color};
use crate::error::{Error, Result};
use crate::export::{ExportOptions, NamingRule, ResizeMode, ResizeSpec};
use crate::style::{
    Anchor, ImageStyle, Placement, ScaleMode, TextStyle, WatermarkStyle, DEFAULT_OPACITY
};

pub use self::template::TemplateStore;

/// 設定ファイル名
const SETTINGS_FILE: &str = "settings.toml";

/// テンプレートファイル名
const TEMPLATES_FILE: &str = "templates.toml";

///
/// デシリアライズ用の&strからenumへの変換の為の中継関数
///
/// # 注記
/// 解釈できない値はエラーにせず既定値として扱う。
///
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let s = String::deserialize(deserializer)?;
    Ok(T::from_str(&s).unwrap_or_default())
}

///
/// 配置名のデシリアライズ
///
/// # 注記
/// 解釈できない名前は`custom`として扱う。
///
fn anchor_name<'de, D>(deserializer: D) -> std::result::Result<Anchor, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Anchor::from_name(&String::deserialize(deserializer)?))
}

///
/// 透かしの種別
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkKind {
    /// 文字透かし
    #[default]
    Text,

    /// 画像透かし
    Image,
}

// FromStrトレイトの実装
impl FromStr for WatermarkKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            _ => Err(format!("unknown watermark type: {}", s)),
        }
    }
}

// Displayトレイトの実装
impl Display for WatermarkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Self::Text => "text",
            Self::Image => "image",
        })
    }
}

///
/// 命名規則の種別
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingKind {
    /// 元のファイル名のまま
    #[default]
    Original,

    /// 接頭辞を付ける
    Prefix,

    /// 接尾辞を付ける
    Suffix,
}

// FromStrトレイトの実装
impl FromStr for NamingKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "prefix" => Ok(Self::Prefix),
            "suffix" => Ok(Self::Suffix),
            _ => Err(format!("unknown naming rule: {}", s)),
        }
    }
}

// Displayトレイトの実装
impl Display for NamingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Self::Original => "original",
            Self::Prefix => "prefix",
            Self::Suffix => "suffix",
        })
    }
}

///
/// 設定情報を集約する構造体
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// テンプレート名(テンプレートとして保存する場合のみ使用)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// 透かしのテキスト
    pub text: String,

    /// 不透明度(%)
    pub opacity: i32,

    /// 配置基準
    #[serde(deserialize_with = "anchor_name")]
    pub position: Anchor,

    /// 任意配置時のX座標
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_x: Option<i32>,

    /// 任意配置時のY座標
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_y: Option<i32>,

    /// 出力フォーマット
    #[serde(deserialize_with = "lenient")]
    pub format: OutputFormat,

    /// 命名規則
    #[serde(deserialize_with = "lenient")]
    pub naming: NamingKind,

    /// 接頭辞
    pub prefix: String,

    /// 接尾辞
    pub suffix: String,

    /// JPEG品質
    pub jpeg_quality: i32,

    /// 書き出し時のリサイズ方法
    #[serde(deserialize_with = "lenient")]
    pub resize_mode: ResizeMode,

    /// リサイズ後の幅
    pub resize_width: i32,

    /// リサイズ後の高さ
    pub resize_height: i32,

    /// リサイズ倍率(%)
    pub resize_percent: i32,

    /// フォントファイル
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,

    /// フォントサイズ(0は自動)
    pub font_size: i32,

    /// 太字
    pub font_bold: bool,

    /// 斜体
    pub font_italic: bool,

    /// 文字色
    pub font_color: String,

    /// 縁取りの幅
    pub font_stroke_width: i32,

    /// 縁取りの色
    pub font_stroke_color: String,

    /// 影の有無
    pub font_shadow_enabled: bool,

    /// 影のX方向のずらし量
    pub font_shadow_offset_x: i32,

    /// 影のY方向のずらし量
    pub font_shadow_offset_y: i32,

    /// 影の色
    pub font_shadow_color: String,

    /// スーパーサンプリング倍率
    pub render_scale: i32,

    /// 透かしの種別
    #[serde(deserialize_with = "lenient")]
    pub watermark_type: WatermarkKind,

    /// 透かし画像のファイル
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_watermark_path: Option<PathBuf>,

    /// 透かし画像の拡縮方法
    #[serde(deserialize_with = "lenient")]
    pub image_scale_mode: ScaleMode,

    /// 透かし画像の倍率(%)
    pub image_scale_percent: i32,

    /// 透かし画像の幅
    pub image_scale_width: i32,

    /// 透かし画像の高さ
    pub image_scale_height: i32,

    /// 透かし画像の縦横比を維持するか否か
    pub image_keep_aspect: bool,

    /// 回転角(度)
    pub watermark_rotation: i32,
}

impl Default for Settings {
    fn default() -> Self {
        let black = Color::BLACK.to_string();
        let image = ImageStyle::new(PathBuf::new());

        Self {
            name: String::new(),
            text: String::new(),
            opacity: DEFAULT_OPACITY,
            position: Anchor::BottomRight,
            custom_x: None,
            custom_y: None,
            format: OutputFormat::Png,
            naming: NamingKind::Original,
            prefix: String::new(),
            suffix: String::new(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            resize_mode: ResizeMode::None,
            resize_width: 0,
            resize_height: 0,
            resize_percent: 0,
            font_path: None,
            font_size: 0,
            font_bold: false,
            font_italic: false,
            font_color: black.clone(),
            font_stroke_width: 0,
            font_stroke_color: black.clone(),
            font_shadow_enabled: false,
            font_shadow_offset_x: 2,
            font_shadow_offset_y: 2,
            font_shadow_color: black,
            render_scale: 1,
            watermark_type: WatermarkKind::Text,
            image_watermark_path: None,
            image_scale_mode: image.scale_mode,
            image_scale_percent: image.scale_percent,
            image_scale_width: image.free_width,
            image_scale_height: image.free_height,
            image_keep_aspect: image.keep_aspect,
            watermark_rotation: 0,
        }
    }
}

impl Settings {
    ///
    /// 設定ファイルの読み込み
    ///
    /// # 引数
    /// * `path` - 設定ファイルへのパス
    ///
    /// # 戻り値
    /// 読み込めた場合は設定を`Ok(Some())`でラップして返す。ファイルが存在し
    /// ない場合は`Ok(None)`を返す。
    ///
    pub fn load<P>(path: P) -> Result<Option<Self>>
    where
        P: AsRef<Path>
    {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no settings file");
            return Ok(None);
        }

        Ok(Some(toml::from_str(&std::fs::read_to_string(path)?)?))
    }

    ///
    /// 設定ファイルの書き込み
    ///
    /// # 注記
    /// 親ディレクトリが無い場合は作成する。
    ///
    pub fn save<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>
    {
        write_toml(path.as_ref(), &toml::to_string_pretty(self)?)
    }

    ///
    /// 透かしスタイルへの変換
    ///
    pub fn watermark_style(&self) -> WatermarkStyle {
        match self.watermark_type {
            WatermarkKind::Text => WatermarkStyle::Text(TextStyle {
                text: self.text.clone(),
                font_path: self.font_path.clone(),
                font_size: self.font_size,
                bold: self.font_bold,
                italic: self.font_italic,
                color: parse_hex_color(Some(&self.font_color)),
                stroke_width: self.font_stroke_width,
                stroke_color: parse_hex_color(Some(&self.font_stroke_color)),
                shadow_enabled: self.font_shadow_enabled,
                shadow_offset: (self.font_shadow_offset_x, self.font_shadow_offset_y),
                shadow_color: parse_hex_color(Some(&self.font_shadow_color)),
                opacity: self.opacity,
                render_scale: self.render_scale,
                rotation: self.watermark_rotation,
            }),

            WatermarkKind::Image => WatermarkStyle::Image(ImageStyle {
                path: self.image_watermark_path.clone().unwrap_or_default(),
                scale_mode: self.image_scale_mode,
                scale_percent: self.image_scale_percent,
                free_width: self.image_scale_width,
                free_height: self.image_scale_height,
                keep_aspect: self.image_keep_aspect,
                opacity: self.opacity,
                rotation: self.watermark_rotation,
            }),
        }
    }

    ///
    /// 配置指定への変換
    ///
    /// # 注記
    /// 任意配置で座標が揃っていない場合は座標無し(左上)として扱う。
    ///
    pub fn placement(&self) -> Placement {
        match (self.position, self.custom_x, self.custom_y) {
            (Anchor::Custom, Some(x), Some(y)) => Placement::custom(x, y),
            (anchor, _, _) => Placement::anchored(anchor),
        }
    }

    ///
    /// 書き出し設定への変換
    ///
    pub fn export_options(&self) -> ExportOptions {
        let naming = match self.naming {
            NamingKind::Original => NamingRule::Original,
            NamingKind::Prefix => NamingRule::Prefix(self.prefix.clone()),
            NamingKind::Suffix => NamingRule::Suffix(self.suffix.clone()),
        };

        ExportOptions {
            format: self.format,
            jpeg_quality: self.jpeg_quality,
            resize: ResizeSpec {
                mode: self.resize_mode,
                width: self.resize_width,
                height: self.resize_height,
                percent: self.resize_percent,
            },
            naming,
        }
    }
}

///
/// TOML文字列のファイルへの書き込み
///
fn write_toml(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(std::fs::write(path, body)?)
}

///
/// 設定ディレクトリのパス情報を生成
///
fn config_dir() -> Result<PathBuf> {
    Ok(BaseDirs::new()
        .ok_or(Error::NoConfigDir)?
        .config_local_dir()
        .join(env!("CARGO_PKG_NAME")))
}

///
/// デフォルトの設定ファイルのパス情報を生成
///
pub fn default_settings_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}

///
/// デフォルトのテンプレートファイルのパス情報を生成
///
pub fn default_templates_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(TEMPLATES_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.opacity, 50);
        assert_eq!(settings.position, Anchor::BottomRight);
        assert_eq!(settings.format, OutputFormat::Png);
        assert_eq!(settings.jpeg_quality, 90);
        assert_eq!(settings.render_scale, 1);
        assert_eq!(settings.font_color, "#000000");
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let settings: Settings = toml::from_str(r#"
            text = "© me"
            opacity = 80
            format = "jpeg"
        "#).unwrap();

        assert_eq!(settings.text, "© me");
        assert_eq!(settings.opacity, 80);
        assert_eq!(settings.format, OutputFormat::Jpeg);
        assert_eq!(settings.naming, NamingKind::Original);
        assert_eq!(settings.image_scale_percent, 50);
    }

    #[test]
    fn unknown_names_fall_back() {
        let settings: Settings = toml::from_str(r#"
            position = "middle-ish"
            format = "webp"
            resize_mode = "stretch"
            watermark_type = "video"
        "#).unwrap();

        assert_eq!(settings.position, Anchor::Custom);
        assert_eq!(settings.format, OutputFormat::Png);
        assert_eq!(settings.resize_mode, ResizeMode::None);
        assert_eq!(settings.watermark_type, WatermarkKind::Text);
        assert_eq!(settings.placement(), Placement::anchored(Anchor::Custom));
    }

    #[test]
    fn conversions_into_core_values() {
        let settings = Settings {
            text: "SAMPLE".into(),
            font_color: "#1A2B3C".into(),
            font_stroke_color: "bad".into(),
            font_shadow_offset_x: 5,
            position: Anchor::Custom,
            custom_x: Some(30),
            custom_y: Some(40),
            naming: NamingKind::Suffix,
            suffix: "_wm".into(),
            resize_mode: ResizeMode::Width,
            resize_width: 640,
            ..Default::default()
        };

        let WatermarkStyle::Text(style) = settings.watermark_style() else {
            panic!("expected a text style");
        };
        assert_eq!(style.color, Color::new(26, 43, 60));
        assert_eq!(style.stroke_color, Color::BLACK);
        assert_eq!(style.shadow_offset, (5, 2));

        assert_eq!(settings.placement(), Placement::custom(30, 40));

        let options = settings.export_options();
        assert_eq!(options.naming, NamingRule::Suffix("_wm".into()));
        assert_eq!(options.resize, ResizeSpec::width(640));
    }

    #[test]
    fn image_type_builds_image_style() {
        let settings = Settings {
            watermark_type: WatermarkKind::Image,
            image_watermark_path: Some(PathBuf::from("logo.png")),
            opacity: 70,
            watermark_rotation: 15,
            ..Default::default()
        };

        match settings.watermark_style() {
            WatermarkStyle::Image(style) => {
                assert_eq!(style.path, PathBuf::from("logo.png"));
                assert_eq!(style.opacity, 70);
                assert_eq!(style.rotation, 15);
                assert!(style.keep_aspect);
            }
            other => panic!("unexpected style: {:?}", other),
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf/settings.toml");

        assert_eq!(Settings::load(&path).unwrap(), None);

        let settings = Settings {
            text: "hello\nworld".into(),
            position: Anchor::Custom,
            custom_x: Some(-5),
            custom_y: Some(12),
            font_path: Some(PathBuf::from("/fonts/a.ttf")),
            ..Default::default()
        };
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), Some(settings));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "opacity = = 3").unwrap();

        assert!(matches!(Settings::load(&path), Err(Error::ConfigRead(_))));
    }
}
