/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! テキストのレイアウトと寸法計測
//!
//! 座標系は描画原点をテキストの左上(1行目のアセンダ位置)とする。改行を含
//! むテキストは複数行としてレイアウトする。
//!

use ab_glyph::{point, Font, Glyph, ScaleFont};
use image::{GrayImage, Luma};

use crate::font::FontFace;

///
/// テキストのインク領域
///
/// # 注記
/// 原点(0, 0)に描画した際に実際にピクセルが置かれる範囲を表す。空のテキ
/// ストではすべて0となる。
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBounds {
    /// 幅(ピクセル数)
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    /// 高さ(ピクセル数)
    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }

    /// インクが無いか否か
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    fn union(self, other: TextBounds) -> TextBounds {
        if other.is_empty() {
            return self;
        }

        if self.is_empty() {
            return other;
        }

        TextBounds {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

///
/// 配置済みのグリフ
///
pub(crate) enum PlacedGlyph {
    /// アウトラインフォントのグリフ
    Outline(Glyph),

    /// 内蔵フェイスの矩形グリフ(x, y, 幅, 高さ)
    Tofu(f32, f32, f32, f32),
}

///
/// テキストのレイアウト
///
/// # 引数
/// * `face` - 使用するフォントフェイス
/// * `text` - レイアウト対象のテキスト
/// * `origin` - 1行目の左上の座標
///
/// # 戻り値
/// 配置済みグリフのリストを返す。
///
pub(crate) fn layout(face: &FontFace, text: &str, origin: (f32, f32)) -> Vec<PlacedGlyph> {
    let size = face.size();
    let mut glyphs = Vec::new();

    for (line_no, line) in text.split('\n').enumerate() {
        let baseline = origin.1 + face.ascent() + line_no as f32 * face.line_height();
        let mut caret = origin.0;

        match face.outline() {
            Some(font) => {
                let px = face.px_scale();
                let scaled = font.as_scaled(px);
                let mut prev = None;

                for ch in line.chars().filter(|c| !c.is_control()) {
                    let id = font.glyph_id(ch);
                    if let Some(prev) = prev {
                        caret += scaled.kern(prev, id);
                    }

                    glyphs.push(PlacedGlyph::Outline(
                        id.with_scale_and_position(px, point(caret, baseline)),
                    ));

                    caret += scaled.h_advance(id);
                    prev = Some(id);
                }
            }

            None => {
                for ch in line.chars().filter(|c| !c.is_control()) {
                    if !ch.is_whitespace() {
                        glyphs.push(PlacedGlyph::Tofu(
                            caret + size * 0.05,
                            baseline - size * 0.7,
                            size * 0.5,
                            size * 0.7,
                        ));
                    }

                    caret += size * 0.6;
                }
            }
        }
    }

    glyphs
}

///
/// テキストの寸法計測
///
/// # 引数
/// * `face` - 使用するフォントフェイス
/// * `text` - 計測対象のテキスト
///
/// # 戻り値
/// 原点に描画した場合のインク領域を返す。
///
pub fn measure(face: &FontFace, text: &str) -> TextBounds {
    layout(face, text, (0.0, 0.0))
        .into_iter()
        .filter_map(|glyph| glyph_bounds(face, glyph))
        .fold(TextBounds::default(), TextBounds::union)
}

///
/// テキストのカバレッジマスクの生成
///
/// # 引数
/// * `face` - 使用するフォントフェイス
/// * `text` - 描画するテキスト
/// * `origin` - 1行目の左上の座標
/// * `size` - マスクの大きさ(幅, 高さ)
///
/// # 戻り値
/// 各ピクセルのグリフ被覆率を0〜255で表したマスクを返す。
///
pub fn rasterize(face: &FontFace, text: &str, origin: (f32, f32), size: (u32, u32))
    -> GrayImage
{
    let mut mask = GrayImage::new(size.0, size.1);

    for glyph in layout(face, text, origin) {
        match glyph {
            PlacedGlyph::Outline(glyph) => {
                let Some(font) = face.outline() else {
                    continue;
                };
                let Some(outlined) = font.outline_glyph(glyph) else {
                    continue;
                };
                let bounds = outlined.px_bounds();

                outlined.draw(|x, y, coverage| {
                    let px = bounds.min.x as i32 + x as i32;
                    let py = bounds.min.y as i32 + y as i32;
                    let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                    accumulate(&mut mask, px, py, value);
                });
            }

            PlacedGlyph::Tofu(x, y, w, h) => {
                let thickness = (face.size() / 12.0).round().max(1.0) as i32;
                let (x0, y0) = (x.round() as i32, y.round() as i32);
                let (x1, y1) = ((x + w).round() as i32, (y + h).round() as i32);

                for py in y0..y1 {
                    for px in x0..x1 {
                        let edge = px - x0 < thickness
                            || x1 - 1 - px < thickness
                            || py - y0 < thickness
                            || y1 - 1 - py < thickness;

                        if edge {
                            accumulate(&mut mask, px, py, 255);
                        }
                    }
                }
            }
        }
    }

    mask
}

///
/// グリフ単体のインク領域
///
fn glyph_bounds(face: &FontFace, glyph: PlacedGlyph) -> Option<TextBounds> {
    match glyph {
        PlacedGlyph::Outline(glyph) => {
            let outlined = face.outline()?.outline_glyph(glyph)?;
            let rect = outlined.px_bounds();

            Some(TextBounds {
                left: rect.min.x.floor() as i32,
                top: rect.min.y.floor() as i32,
                right: rect.max.x.ceil() as i32,
                bottom: rect.max.y.ceil() as i32,
            })
        }

        PlacedGlyph::Tofu(x, y, w, h) => Some(TextBounds {
            left: x.round() as i32,
            top: y.round() as i32,
            right: (x + w).round() as i32,
            bottom: (y + h).round() as i32,
        }),
    }
}

// 範囲外は無視し、重なった部分は大きい方の被覆率を採用する
fn accumulate(mask: &mut GrayImage, x: i32, y: i32, value: u8) {
    if x < 0 || y < 0 || x >= mask.width() as i32 || y >= mask.height() as i32 {
        return;
    }

    let pixel = mask.get_pixel_mut(x as u32, y as u32);
    if value > pixel[0] {
        *pixel = Luma([value]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_extent() {
        let face = FontFace::builtin(40.0);
        let bounds = measure(&face, "");
        assert_eq!(bounds, TextBounds::default());
        assert!(bounds.is_empty());
    }

    #[test]
    fn builtin_face_measures_boxes() {
        let face = FontFace::builtin(20.0);
        let bounds = measure(&face, "AB");

        // 2文字目の右端 = 12(送り) + 1 + 10
        assert_eq!(bounds.left, 1);
        assert_eq!(bounds.right, 23);
        assert_eq!(bounds.height(), 14);
    }

    #[test]
    fn multiline_text_is_taller() {
        let face = FontFace::builtin(20.0);
        let one = measure(&face, "AB");
        let two = measure(&face, "AB\nAB");

        assert_eq!(one.width(), two.width());
        assert_eq!(two.height(), one.height() + 20);
    }

    #[test]
    fn rasterized_pixels_stay_inside_bounds() {
        let face = crate::font::resolve(32, None);
        let bounds = measure(&face, "Sample");
        let mask = rasterize(&face, "Sample", (0.0, 0.0), (400, 100));

        let mut inked = 0;
        for (x, y, p) in mask.enumerate_pixels() {
            if p[0] > 0 {
                inked += 1;
                assert!((x as i32) >= bounds.left && (x as i32) < bounds.right);
                assert!((y as i32) >= bounds.top && (y as i32) < bounds.bottom);
            }
        }
        assert!(inked > 0);
    }
}
