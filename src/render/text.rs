/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 文字透かしの描画
//!

use image::{GrayImage, Pixel, Rgba, RgbaImage};
use imageproc::morphology::{grayscale_dilate, Mask};
use tracing::{debug, warn};

use crate::font::{self, FontFace};
use crate::layout;
use crate::style::{Placement, TextStyle};
use crate::transform::{normalize_degrees, resize_rgba, rotate_expand, shear_horizontal};

use super::RenderedLayer;

/// 自動算出時のフォントサイズの除数
const AUTO_FONT_DIVISOR: u32 = 15;

/// 自動算出時のフォントサイズの下限
pub const MIN_AUTO_FONT_SIZE: u32 = 8;

/// 縁取り・影のはみ出し用に確保する片側の余白(等倍時)
pub const LAYER_MARGIN: u32 = 4;

/// 斜体模擬のシアー量(高さに対する比率)
pub const ITALIC_SHEAR: f32 = 0.25;

///
/// 有効なフォントサイズの算出
///
/// # 引数
/// * `style` - 文字透かしのスタイル
/// * `canvas` - 貼り付け先画像の大きさ
///
/// # 戻り値
/// 指定値が正ならその値、そうでなければ画像の短辺の1/15(下限あり)を返す。
///
pub fn effective_font_size(style: &TextStyle, canvas: (u32, u32)) -> u32 {
    if style.font_size > 0 {
        style.font_size as u32
    } else {
        (canvas.0.min(canvas.1) / AUTO_FONT_DIVISOR).max(MIN_AUTO_FONT_SIZE)
    }
}

///
/// 文字透かしの描画
///
/// # 引数
/// * `style` - 文字透かしのスタイル
/// * `placement` - 配置指定
/// * `canvas` - 貼り付け先画像の大きさ(幅, 高さ)
///
/// # 戻り値
/// 画像と同じ大きさの透明レイヤーに、配置済みの透かしを描いたものを返す。
///
/// # 注記
/// 空のテキストでも余白分のレイヤーは作られ、結果は全面透明となる。
///
pub fn render_text(style: &TextStyle, placement: &Placement, canvas: (u32, u32))
    -> RenderedLayer
{
    RenderedLayer::place(text_content(style, canvas), placement, canvas)
}

///
/// 配置前の文字透かしレイヤーの生成
///
pub(crate) fn text_content(style: &TextStyle, canvas: (u32, u32)) -> RgbaImage {
    let scale = style.effective_scale();
    let hires = draw_supersampled(style, canvas);

    /*
     * 等倍への縮小(スーパーサンプリングによるアンチエイリアス)
     */
    let layer = if scale > 1 {
        let (w, h) = hires.dimensions();
        let (tw, th) = ((w / scale).max(1), (h / scale).max(1));

        match resize_rgba(hires, tw, th) {
            Ok(layer) => layer,
            Err(err) => {
                warn!(%err, "cannot downscale text layer");
                RgbaImage::new(tw, th)
            }
        }
    } else {
        hires
    };

    /*
     * 回転
     */
    if normalize_degrees(style.rotation) != 0 {
        rotate_expand(&layer, style.rotation)
    } else {
        layer
    }
}

///
/// 倍率を掛けた解像度での描画
///
/// # 戻り値
/// 影・縁取り・太字・斜体を適用した高解像度レイヤーを返す。
///
fn draw_supersampled(style: &TextStyle, canvas: (u32, u32)) -> RgbaImage {
    let scale = style.effective_scale();
    let font_size = effective_font_size(style, canvas);
    let face = font::resolve(font_size * scale, style.font_path.as_deref());

    /*
     * 寸法の計測とレイヤーの確保
     */
    let bounds = layout::measure(&face, &style.text);
    let margin = LAYER_MARGIN * scale;
    let width = bounds.width() + margin * 2;
    let height = bounds.height() + margin * 2;
    let mut layer = RgbaImage::new(width, height);

    debug!(font_size, scale, width, height, builtin = face.is_builtin(), "text layer");

    // インク領域の左上が余白の内側に来る描画原点
    let origin = (
        (margin as i32 - bounds.left) as f32,
        (margin as i32 - bounds.top) as f32,
    );

    let alpha = style.alpha();
    let stroke = style.effective_stroke() * scale;
    let step = scale as f32;

    /*
     * 影
     */
    if style.shadow_enabled {
        let (dx, dy) = style.shadow_offset;
        let at = (origin.0 + dx as f32 * step, origin.1 + dy as f32 * step);
        let color = style.shadow_color.with_alpha(alpha / 2);

        draw_text(&mut layer, &face, &style.text, at, color, stroke, color);
    }

    /*
     * 本体(太字は縦横に1ピクセルずらして重ね描き)
     */
    let fill = style.color.with_alpha(alpha);
    let stroke_color = style.stroke_color.with_alpha(alpha);
    let offsets: &[(f32, f32)] = if style.bold {
        &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]
    } else {
        &[(0.0, 0.0)]
    };

    for (ox, oy) in offsets {
        let at = (origin.0 + ox * step, origin.1 + oy * step);
        draw_text(&mut layer, &face, &style.text, at, fill, stroke, stroke_color);
    }

    /*
     * 斜体
     */
    if style.italic {
        layer = shear_horizontal(&layer, ITALIC_SHEAR);
    }

    layer
}

///
/// テキスト1回分の描画
///
/// # 引数
/// * `layer` - 描画先のレイヤー
/// * `face` - 使用するフォントフェイス
/// * `text` - 描画するテキスト
/// * `origin` - 描画原点
/// * `fill` - 文字色
/// * `stroke` - 縁取りの幅(0で縁取り無し)
/// * `stroke_color` - 縁取りの色
///
fn draw_text(
    layer: &mut RgbaImage,
    face: &FontFace,
    text: &str,
    origin: (f32, f32),
    fill: Rgba<u8>,
    stroke: u32,
    stroke_color: Rgba<u8>,
) {
    let mask = layout::rasterize(face, text, origin, layer.dimensions());

    if stroke > 0 {
        paint(layer, &dilate(&mask, stroke), stroke_color);
    }

    paint(layer, &mask, fill);
}

///
/// マスクに従った塗り
///
fn paint(layer: &mut RgbaImage, mask: &GrayImage, color: Rgba<u8>) {
    if color[3] == 0 {
        return;
    }

    for (pixel, coverage) in layer.pixels_mut().zip(mask.pixels()) {
        let coverage = coverage[0] as u32;
        if coverage == 0 {
            continue;
        }

        let alpha = (color[3] as u32 * coverage + 127) / 255;
        pixel.blend(&Rgba([color[0], color[1], color[2], alpha as u8]));
    }
}

///
/// 円形近傍での最大値フィルタ(縁取りの生成)
///
/// # 引数
/// * `mask` - 元のカバレッジマスク
/// * `radius` - 縁取りの幅
///
/// # 戻り値
/// 半径`radius`の円内の最大被覆率を各ピクセルに置いたマスクを返す。
///
/// # 注記
/// 半径は255で打ち切る。
///
fn dilate(mask: &GrayImage, radius: u32) -> GrayImage {
    let radius = radius.min(u8::MAX as u32) as u8;
    grayscale_dilate(mask, &Mask::disk(radius))
}
