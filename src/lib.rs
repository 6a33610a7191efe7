/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 写真に文字または画像の透かしを合成するライブラリ
//!
//! 描画・配置・合成・書き出しの各処理は、スタイルと配置指定を値として受
//! け取る純粋な関数として実装しており、複数スレッドから同時に呼び出して
//! よい。プロセス内で共有するのはフォントのキャッシュのみ。
//!

pub mod codec;
pub mod color;
pub mod compositor;
pub mod error;
pub mod export;
pub mod font;
pub mod layout;
pub mod media;
pub mod position;
pub mod preview;
pub mod render;
pub mod settings;
pub mod style;
pub mod transform;

pub use codec::{decode_image, save_image, OutputFormat};
pub use color::{parse_hex_color, Color};
pub use compositor::{apply_watermark, composite};
pub use error::{Error, Result};
pub use export::{
    export_file, output_file_name, resize_proportional, ExportOptions, NamingRule, ResizeMode,
    ResizeSpec
};
pub use font::{scan_system_font_files, FontEntry};
pub use media::{collect_inputs, is_supported_image, scan_directory_for_images};
pub use preview::{custom_point_from_preview, fit_within, render_preview};
pub use render::{render, render_image, render_text, watermark_extent, RenderedLayer};
pub use settings::{Settings, TemplateStore};
pub use style::{Anchor, ImageStyle, Placement, ScaleMode, TextStyle, WatermarkStyle};
