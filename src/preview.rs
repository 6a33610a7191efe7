/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! プレビュー用の縮小表示と座標変換
//!

use image::{DynamicImage, RgbaImage};
use tracing::warn;

use crate::compositor::apply_watermark;
use crate::style::{Placement, WatermarkStyle};
use crate::transform::resize_rgba;

///
/// 表示枠に収まる大きさの算出
///
/// # 引数
/// * `image` - 画像の大きさ(幅, 高さ)
/// * `bounds` - 表示枠の大きさ(幅, 高さ)
///
/// # 戻り値
/// 縦横比を維持して枠に収まる最大の大きさを返す。各辺は1以上。
///
pub fn fit_within(image: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    if image.0 == 0 || image.1 == 0 {
        return (1, 1);
    }

    let scale = f64::min(
        bounds.0 as f64 / image.0 as f64,
        bounds.1 as f64 / image.1 as f64,
    );

    (
        ((image.0 as f64 * scale) as u32).max(1),
        ((image.1 as f64 * scale) as u32).max(1),
    )
}

///
/// プレビュー画像の生成
///
/// # 引数
/// * `base` - 元画像
/// * `style` - 透かしのスタイル
/// * `placement` - 配置指定
/// * `bounds` - 表示枠の大きさ(幅, 高さ)
///
/// # 戻り値
/// 書き出しと同じ経路で透かしを合成し、表示枠に収まるよう縮小した画像を返
/// す。
///
pub fn render_preview(
    base: &DynamicImage,
    style: &WatermarkStyle,
    placement: &Placement,
    bounds: (u32, u32),
) -> RgbaImage {
    let composed = apply_watermark(base, style, placement);
    let (width, height) = fit_within(composed.dimensions(), bounds);

    let fallback = composed.clone();
    resize_rgba(composed, width, height).unwrap_or_else(|err| {
        warn!(%err, "cannot scale preview");
        fallback
    })
}

///
/// プレビュー上の指定位置から任意配置の座標への変換
///
/// # 引数
/// * `click` - 表示領域内での指定位置
/// * `label` - 表示領域の大きさ
/// * `preview` - 表示領域の中央に置かれたプレビュー画像の大きさ
/// * `image` - 元画像の大きさ
/// * `layer` - 透かし本体の大きさ(`watermark_extent()`の値)
///
/// # 戻り値
/// 透かしの中心が指定位置に来る左上座標を、画像内に収まるようクランプして
/// 返す。指定位置がプレビュー画像の外側の場合は`None`を返す。
///
/// # 注記
/// 縦横の倍率は等しいものとして横方向の倍率のみを使う。
///
pub fn custom_point_from_preview(
    click: (i32, i32),
    label: (u32, u32),
    preview: (u32, u32),
    image: (u32, u32),
    layer: (u32, u32),
) -> Option<(i32, i32)> {
    let (pw, ph) = (preview.0 as i64, preview.1 as i64);
    let (iw, ih) = (image.0 as i64, image.1 as i64);
    let (lw, lh) = (layer.0 as i64, layer.1 as i64);

    /*
     * 余白(レターボックス)の除去
     */
    let offset_x = (label.0 as i64 - pw).div_euclid(2);
    let offset_y = (label.1 as i64 - ph).div_euclid(2);
    let x = click.0 as i64 - offset_x;
    let y = click.1 as i64 - offset_y;

    if x < 0 || y < 0 || x > pw || y > ph {
        return None;
    }

    /*
     * 元画像の座標への変換
     */
    let scale = if iw > 0 { pw as f64 / iw as f64 } else { 1.0 };
    let img_x = (x as f64 / scale) as i64;
    let img_y = (y as f64 / scale) as i64;

    /*
     * 中心合わせとクランプ
     */
    let pos_x = (img_x - lw / 2).min(iw - lw).max(0);
    let pos_y = (img_y - lh / 2).min(ih - lh).max(0);

    Some((pos_x as i32, pos_y as i32))
}
