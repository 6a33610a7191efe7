/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 透かしレイヤーの描画
//!
//! 文字・画像のいずれの透かしも、貼り付け先画像と同じ大きさの透明レイヤー
//! として描画する。合成はcompositorモジュールで行う。
//!

mod image;
mod text;

use ::image::{imageops, RgbaImage};

use crate::position;
use crate::style::{Placement, WatermarkStyle};

pub use self::image::{apply_opacity, render_image, target_size};
pub use self::text::{
    effective_font_size, render_text, ITALIC_SHEAR, LAYER_MARGIN, MIN_AUTO_FONT_SIZE
};

///
/// 描画済みの透かしレイヤー
///
#[derive(Debug, Clone)]
pub struct RenderedLayer {
    /// 貼り付け先と同じ大きさの透明レイヤー
    pub image: RgbaImage,

    /// 透かし本体の左上座標
    pub position: (u32, u32),

    /// 透かし本体の大きさ(回転後)
    pub content_size: (u32, u32),
}

impl RenderedLayer {
    ///
    /// 透かし本体の配置
    ///
    /// # 引数
    /// * `content` - 配置前の透かし本体
    /// * `placement` - 配置指定
    /// * `canvas` - 貼り付け先画像の大きさ
    ///
    pub(crate) fn place(content: RgbaImage, placement: &Placement, canvas: (u32, u32)) -> Self {
        let content_size = content.dimensions();
        let position = position::resolve_placement(placement, content_size, canvas);

        let mut image = RgbaImage::new(canvas.0, canvas.1);
        imageops::replace(&mut image, &content, position.0 as i64, position.1 as i64);

        Self { image, position, content_size }
    }
}

///
/// 透かしレイヤーの描画
///
/// # 引数
/// * `style` - 透かしのスタイル
/// * `placement` - 配置指定
/// * `canvas` - 貼り付け先画像の大きさ(幅, 高さ)
///
/// # 戻り値
/// 描画したレイヤーを返す。画像透かしの読み込みに失敗した場合は`None`。
///
pub fn render(style: &WatermarkStyle, placement: &Placement, canvas: (u32, u32))
    -> Option<RenderedLayer>
{
    match style {
        WatermarkStyle::Text(style) => Some(render_text(style, placement, canvas)),
        WatermarkStyle::Image(style) => render_image(style, placement, canvas),
    }
}

///
/// 透かし本体の大きさの取得
///
/// # 注記
/// プレビュー上の座標指定で透かしの中心を合わせるために使用する。
///
pub fn watermark_extent(style: &WatermarkStyle, canvas: (u32, u32)) -> Option<(u32, u32)> {
    match style {
        WatermarkStyle::Text(style) => Some(text::text_content(style, canvas).dimensions()),
        WatermarkStyle::Image(style) => self::image::image_content(style).map(|c| c.dimensions()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Anchor, ImageStyle, TextStyle};

    #[test]
    fn layer_matches_canvas_and_contains_content() {
        let style = WatermarkStyle::Text(TextStyle { font_size: 30, opacity: 100, ..TextStyle::new("Hi") });
        let layer = render(&style, &Placement::anchored(Anchor::BottomRight), (320, 240)).unwrap();

        assert_eq!(layer.image.dimensions(), (320, 240));
        assert!(layer.position.0 + layer.content_size.0 <= 320);
        assert!(layer.position.1 + layer.content_size.1 <= 240);

        for (x, y, p) in layer.image.enumerate_pixels() {
            if p[3] > 0 {
                assert!(x >= layer.position.0 && x < layer.position.0 + layer.content_size.0);
                assert!(y >= layer.position.1 && y < layer.position.1 + layer.content_size.1);
            }
        }
    }

    #[test]
    fn extent_matches_rendered_content() {
        let style = WatermarkStyle::Text(TextStyle { font_size: 24, ..TextStyle::new("abc") });
        let layer = render(&style, &Placement::default(), (400, 300)).unwrap();

        assert_eq!(watermark_extent(&style, (400, 300)), Some(layer.content_size));
    }

    #[test]
    fn unreadable_image_watermark_renders_nothing() {
        let style = WatermarkStyle::Image(ImageStyle::new("/nonexistent/logo.png"));
        assert!(render(&style, &Placement::default(), (100, 100)).is_none());
        assert!(watermark_extent(&style, (100, 100)).is_none());
    }
}
