/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 配置基準から貼り付け座標への変換
//!

use crate::style::{Anchor, Placement};

/// 固定位置で画像の縁から空ける余白(ピクセル数)
pub const EDGE_MARGIN: i64 = 10;

///
/// 貼り付け座標の算出
///
/// # 引数
/// * `anchor` - 配置基準
/// * `layer` - 貼り付けるレイヤーの大きさ(幅, 高さ)
/// * `canvas` - 貼り付け先画像の大きさ(幅, 高さ)
/// * `custom_point` - `Custom`の場合に使用する左上座標
///
/// # 戻り値
/// レイヤー左上の貼り付け座標を返す。
///
/// # 注記
/// 結果は常に`[0, 画像幅 - レイヤー幅] × [0, 画像高 - レイヤー高]`に収まる。
/// レイヤーが画像より大きい軸では0になる。`Custom`で座標が無い場合は(0, 0)
/// とする。
///
pub fn resolve(
    anchor: Anchor,
    layer: (u32, u32),
    canvas: (u32, u32),
    custom_point: Option<(i32, i32)>,
) -> (u32, u32) {
    let (lw, lh) = (layer.0 as i64, layer.1 as i64);
    let (cw, ch) = (canvas.0 as i64, canvas.1 as i64);

    let near = EDGE_MARGIN;
    let right = cw - lw - EDGE_MARGIN;
    let bottom = ch - lh - EDGE_MARGIN;
    let center_x = (cw - lw).div_euclid(2);
    let center_y = (ch - lh).div_euclid(2);

    let (x, y) = match anchor {
        Anchor::TopLeft => (near, near),
        Anchor::Top => (center_x, near),
        Anchor::TopRight => (right, near),
        Anchor::Left => (near, center_y),
        Anchor::Center => (center_x, center_y),
        Anchor::Right => (right, center_y),
        Anchor::BottomLeft => (near, bottom),
        Anchor::Bottom => (center_x, bottom),
        Anchor::BottomRight => (right, bottom),
        Anchor::Custom => match custom_point {
            Some((x, y)) => (x as i64, y as i64),
            None => (0, 0),
        },
    };

    (clamp_axis(x, cw - lw), clamp_axis(y, ch - lh))
}

///
/// 配置指定からの貼り付け座標の算出
///
pub fn resolve_placement(placement: &Placement, layer: (u32, u32), canvas: (u32, u32))
    -> (u32, u32)
{
    resolve(placement.anchor, layer, canvas, placement.custom_point)
}

// 上限が負になる場合は下限の0を優先する
fn clamp_axis(value: i64, upper: i64) -> u32 {
    value.min(upper).max(0) as u32
}
