/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 透かしのスタイルと配置を表す値オブジェクト
//!
//! いずれも描画関数に値として渡す不変のデータであり、描画側で範囲外の数
//! 値はクランプして扱う。
//!

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// 不透明度の既定値(%)
pub const DEFAULT_OPACITY: i32 = 50;

/// スーパーサンプリング倍率の上限
pub const MAX_RENDER_SCALE: u32 = 8;

///
/// 透かしの配置基準
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// 左上
    TopLeft,

    /// 上端中央
    Top,

    /// 右上
    TopRight,

    /// 左端中央
    Left,

    /// 画像中央
    Center,

    /// 右端中央
    Right,

    /// 左下
    BottomLeft,

    /// 下端中央
    Bottom,

    /// 右下
    #[default]
    BottomRight,

    /// 任意座標
    Custom,
}

impl Anchor {
    /// 固定位置の全候補
    pub const FIXED: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::Top,
        Anchor::TopRight,
        Anchor::Left,
        Anchor::Center,
        Anchor::Right,
        Anchor::BottomLeft,
        Anchor::Bottom,
        Anchor::BottomRight,
    ];

    ///
    /// 名前からの変換(寛容版)
    ///
    /// # 注記
    /// 解釈できない名前は`Custom`として扱う。
    ///
    pub fn from_name(name: &str) -> Self {
        Self::from_str(name).unwrap_or(Anchor::Custom)
    }

    /// 設定ファイル等で使用する名前
    pub fn name(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::Top => "top",
            Self::TopRight => "top-right",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::BottomLeft => "bottom-left",
            Self::Bottom => "bottom",
            Self::BottomRight => "bottom-right",
            Self::Custom => "custom",
        }
    }
}

// FromStrトレイトの実装
impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase().replace('_', "-");

        Self::FIXED
            .iter()
            .chain(std::iter::once(&Anchor::Custom))
            .find(|anchor| anchor.name() == name)
            .copied()
            .ok_or_else(|| format!("unknown position: {}", s))
    }
}

// Displayトレイトの実装
impl Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

///
/// 透かしの配置指定
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    /// 配置基準
    pub anchor: Anchor,

    /// `Custom`の場合に使用する左上座標
    pub custom_point: Option<(i32, i32)>,
}

impl Placement {
    ///
    /// 固定位置での配置
    ///
    pub fn anchored(anchor: Anchor) -> Self {
        Self { anchor, custom_point: None }
    }

    ///
    /// 任意座標での配置
    ///
    pub fn custom(x: i32, y: i32) -> Self {
        Self {
            anchor: Anchor::Custom,
            custom_point: Some((x, y)),
        }
    }
}

///
/// 文字透かしのスタイル
///
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// 描画するテキスト
    pub text: String,

    /// フォントファイル(未指定の場合は自動選択)
    pub font_path: Option<PathBuf>,

    /// フォントのピクセルサイズ(0の場合は画像サイズから自動算出)
    pub font_size: i32,

    /// 太字(重ね描きによる模擬)
    pub bold: bool,

    /// 斜体(シアー変換による模擬)
    pub italic: bool,

    /// 文字色
    pub color: Color,

    /// 縁取りの幅(ピクセル数)
    pub stroke_width: i32,

    /// 縁取りの色
    pub stroke_color: Color,

    /// 影の有無
    pub shadow_enabled: bool,

    /// 影のずらし量(dx, dy)
    pub shadow_offset: (i32, i32),

    /// 影の色
    pub shadow_color: Color,

    /// 不透明度(0〜100)
    pub opacity: i32,

    /// スーパーサンプリング倍率
    pub render_scale: i32,

    /// 回転角(度)
    pub rotation: i32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_path: None,
            font_size: 0,
            bold: false,
            italic: false,
            color: Color::BLACK,
            stroke_width: 0,
            stroke_color: Color::BLACK,
            shadow_enabled: false,
            shadow_offset: (2, 2),
            shadow_color: Color::BLACK,
            opacity: DEFAULT_OPACITY,
            render_scale: 1,
            rotation: 0,
        }
    }
}

impl TextStyle {
    ///
    /// テキストを指定したスタイルの生成
    ///
    pub fn new<S>(text: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// 0〜255に換算した不透明度
    pub fn alpha(&self) -> u8 {
        opacity_to_alpha(self.opacity)
    }

    /// 有効なスーパーサンプリング倍率(1〜MAX_RENDER_SCALE)
    pub fn effective_scale(&self) -> u32 {
        self.render_scale.clamp(1, MAX_RENDER_SCALE as i32) as u32
    }

    /// 有効な縁取り幅
    pub fn effective_stroke(&self) -> u32 {
        self.stroke_width.max(0) as u32
    }
}

///
/// 画像透かしの拡縮方法
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleMode {
    /// 元画像に対する百分率
    #[default]
    Percent,

    /// 幅・高さの直接指定
    Free,
}

// FromStrトレイトの実装
impl FromStr for ScaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percent" => Ok(Self::Percent),
            "free" => Ok(Self::Free),
            _ => Err(format!("unknown scale mode: {}", s)),
        }
    }
}

// Displayトレイトの実装
impl Display for ScaleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Self::Percent => "percent",
            Self::Free => "free",
        })
    }
}

///
/// 画像透かしのスタイル
///
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStyle {
    /// 透かしに使用する画像ファイル
    pub path: PathBuf,

    /// 拡縮方法
    pub scale_mode: ScaleMode,

    /// 百分率指定時の倍率(%)
    pub scale_percent: i32,

    /// 直接指定時の幅(0は未指定)
    pub free_width: i32,

    /// 直接指定時の高さ(0は未指定)
    pub free_height: i32,

    /// 直接指定時に縦横比を維持するか否か
    pub keep_aspect: bool,

    /// 不透明度(0〜100)
    pub opacity: i32,

    /// 回転角(度)
    pub rotation: i32,
}

impl ImageStyle {
    ///
    /// 画像ファイルを指定したスタイルの生成
    ///
    pub fn new<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            path: path.into(),
            scale_mode: ScaleMode::Percent,
            scale_percent: 50,
            free_width: 200,
            free_height: 200,
            keep_aspect: true,
            opacity: DEFAULT_OPACITY,
            rotation: 0,
        }
    }
}

///
/// 透かしのスタイル
///
#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkStyle {
    /// 文字透かし
    Text(TextStyle),

    /// 画像透かし
    Image(ImageStyle),
}

impl From<TextStyle> for WatermarkStyle {
    fn from(style: TextStyle) -> Self {
        Self::Text(style)
    }
}

impl From<ImageStyle> for WatermarkStyle {
    fn from(style: ImageStyle) -> Self {
        Self::Image(style)
    }
}

///
/// 不透明度(%)からアルファ値への換算
///
/// # 注記
/// 範囲外の値は0〜100にクランプしてから換算する。
///
pub fn opacity_to_alpha(opacity: i32) -> u8 {
    (255 * opacity.clamp(0, 100) / 100) as u8
}
