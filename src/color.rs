/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 色指定文字列の解析
//!

use std::fmt::Display;

use image::Rgba;

///
/// RGB色
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    ///
    /// `#RRGGBB`形式の文字列からの生成
    ///
    /// # 注記
    /// 解析できない文字列の場合は黒を返す。
    ///
    pub fn parse(hex: &str) -> Self {
        parse_hex_color(Some(hex))
    }

    ///
    /// アルファ値を付与したピクセル値への変換
    ///
    pub fn with_alpha(&self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }
}

// Displayトレイトの実装
impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

///
/// 色指定文字列の解析
///
/// # 引数
/// * `hex` - `#RRGGBB`形式の文字列(未指定の場合は`None`)
///
/// # 戻り値
/// 解析した色を返す。
///
/// # 注記
/// 先頭の`#`が無い、長さが7文字でない、16進数字以外を含むなど、形式に合致
/// しない入力は全て黒(0, 0, 0)として扱う。エラーにはしない。
///
pub fn parse_hex_color(hex: Option<&str>) -> Color {
    let Some(digits) = hex.and_then(|s| s.strip_prefix('#')) else {
        return Color::BLACK;
    };

    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Color::BLACK;
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);

    Color::new(channel(0), channel(2), channel(4))
}
