/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 透かしレイヤーの合成
//!

use image::{imageops, DynamicImage, GenericImageView, RgbaImage};
use tracing::debug;

use crate::render;
use crate::style::{Placement, WatermarkStyle};

///
/// 透かしの適用
///
/// # 引数
/// * `base` - 元画像
/// * `style` - 透かしのスタイル
/// * `placement` - 配置指定
///
/// # 戻り値
/// 透かしを合成した新しい画像を返す。元画像は変更しない。
///
/// # 注記
/// 画像透かしを読み込めなかった場合は、元画像をRGBAに変換したものをその
/// まま返す。プレビューと書き出しの双方がこの関数を経由する。
///
pub fn apply_watermark(base: &DynamicImage, style: &WatermarkStyle, placement: &Placement)
    -> RgbaImage
{
    match render::render(style, placement, base.dimensions()) {
        Some(layer) => {
            debug!(position = ?layer.position, size = ?layer.content_size, "compositing");
            composite(base, &layer.image)
        }
        None => base.to_rgba8(),
    }
}

///
/// レイヤーのアルファ合成
///
/// # 引数
/// * `base` - 下になる画像
/// * `layer` - 上に重ねるレイヤー(`base`と同じ大きさ)
///
/// # 戻り値
/// `layer`を"over"合成した新しい画像を返す。
///
/// # 注記
/// 大きさが異なる場合は左上を揃えて重なる範囲のみ合成する。
///
pub fn composite(base: &DynamicImage, layer: &RgbaImage) -> RgbaImage {
    let mut out = base.to_rgba8();
    imageops::overlay(&mut out, layer, 0, 0);

    out
}
