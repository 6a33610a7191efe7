/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! レイヤーに対する幾何変換(リサイズ・回転・シアー)
//!

use fast_image_resize::{
    FilterType, PixelType, Resizer, ResizeOptions, ResizeAlg
};
use fast_image_resize::images::Image;
use image::error::{ParameterError, ParameterErrorKind};
use image::{imageops, ImageError, Rgba, RgbaImage};
use imageproc::geometric_transformations::{
    rotate_about_center, warp_into, Interpolation, Projection
};

use crate::error::Result;

/// 透明ピクセル
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// 補間時に縁が欠けないよう作業キャンバスに付与する余白
const WORK_PADDING: u32 = 4;

///
/// 画像データのリサイズ
///
/// # 引数
/// * `image` - リサイズ元の画像データ
/// * `width` - ターゲットサイズの幅(ピクセル数)
/// * `height` - ターゲットサイズの高さ(ピクセル数)
///
/// # 戻り値
/// リサイズに成功した場合は、リサイズされた画像データを`Ok()`でラップして返す。
/// 処理に失敗した場合はエラー情報を`Err()`でラップして返す。
///
/// # 注記
/// Lanczos3フィルタを使用する。縮小時はフィルタ幅が倍率に応じて広がるため、
/// 面積平均に相当する滑らかな結果になる。アルファはプリマルチプライした上
/// で補間される。
///
pub fn resize_rgba(image: RgbaImage, width: u32, height: u32) -> Result<RgbaImage> {
    if image.dimensions() == (width, height) {
        return Ok(image);
    }

    if image.width() == 0 || image.height() == 0 || width == 0 || height == 0 {
        return Ok(RgbaImage::new(width, height));
    }

    let mut src = Image::from_vec_u8(
        image.width(),
        image.height(),
        image.into_raw(),
        PixelType::U8x4
    )?;

    let mut dst = Image::new(width, height, PixelType::U8x4);

    let mut resizer = Resizer::new();
    let resize_opts = ResizeOptions::new()
        .resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));

    resizer.resize(&mut src, &mut dst, &resize_opts)?;

    RgbaImage::from_raw(width, height, dst.into_vec())
        .ok_or_else(|| {
            ImageError::Parameter(
                ParameterError::from_kind(ParameterErrorKind::DimensionMismatch)
            ).into()
        })
}

///
/// 回転角の正規化
///
/// # 戻り値
/// 0〜359の範囲に正規化した角度を返す。
///
pub fn normalize_degrees(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}

///
/// キャンバスを拡張しながらの回転
///
/// # 引数
/// * `image` - 回転対象のレイヤー
/// * `degrees` - 回転角(度、正の値で反時計回り)
///
/// # 戻り値
/// 回転後の内容が収まる大きさに拡張したレイヤーを返す。
///
/// # 注記
/// 直角の回転は補間なしで行う。それ以外はバイキュービック補間を使用し、は
/// み出した領域は透明になる。
///
pub fn rotate_expand(image: &RgbaImage, degrees: i32) -> RgbaImage {
    match normalize_degrees(degrees) {
        0 => image.clone(),
        90 => imageops::rotate270(image),
        180 => imageops::rotate180(image),
        270 => imageops::rotate90(image),
        deg => {
            let (w, h) = image.dimensions();
            if w == 0 || h == 0 {
                return image.clone();
            }

            let theta = (deg as f32).to_radians();
            let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
            let out_w = ((w as f32 * cos + h as f32 * sin).ceil() as u32).max(1);
            let out_h = ((w as f32 * sin + h as f32 * cos).ceil() as u32).max(1);

            /*
             * 回転前の内容を中央に置いた作業キャンバスを用意
             */
            let work_w = out_w.max(w) + WORK_PADDING * 2;
            let work_h = out_h.max(h) + WORK_PADDING * 2;
            let mut work = RgbaImage::from_pixel(work_w, work_h, TRANSPARENT);
            imageops::replace(
                &mut work,
                image,
                ((work_w - w) / 2) as i64,
                ((work_h - h) / 2) as i64
            );

            /*
             * imageprocの回転は時計回りなので符号を反転して渡す
             */
            let rotated = rotate_about_center(
                &work,
                -theta,
                Interpolation::Bicubic,
                TRANSPARENT
            );

            imageops::crop_imm(
                &rotated,
                (work_w - out_w) / 2,
                (work_h - out_h) / 2,
                out_w,
                out_h
            ).to_image()
        }
    }
}

///
/// 水平方向のシアー変換(斜体の模擬)
///
/// # 引数
/// * `image` - 変換対象のレイヤー
/// * `factor` - 高さに対するずらし量の比率
///
/// # 戻り値
/// 上端ほど右にずれるよう変形したレイヤーを返す。幅は`factor × 高さ`だけ
/// 拡張される。
///
pub fn shear_horizontal(image: &RgbaImage, factor: f32) -> RgbaImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 || factor == 0.0 {
        return image.clone();
    }

    /*
     * 補間の近傍が欠けないよう余白を付けてから変形する
     */
    let pad = WORK_PADDING as f32;
    let mut work = RgbaImage::from_pixel(w + WORK_PADDING * 2, h + WORK_PADDING * 2, TRANSPARENT);
    imageops::replace(&mut work, image, WORK_PADDING as i64, WORK_PADDING as i64);

    let shift = factor * h as f32;
    let projection = Projection::from_matrix([
        1.0, -factor, shift - pad + factor * pad,
        0.0, 1.0, -pad,
        0.0, 0.0, 1.0,
    ]);

    let Some(projection) = projection else {
        return image.clone();
    };

    // 拡張幅の端数は切り捨てる
    let mut out = RgbaImage::from_pixel(w + shift as u32, h, TRANSPARENT);
    warp_into(&work, &projection, Interpolation::Bicubic, TRANSPARENT, &mut out);

    out
}
