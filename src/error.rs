/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! ライブラリ全体で使用するエラー型の定義
//!

use std::path::PathBuf;

///
/// ライブラリが返すエラー
///
/// # 注記
/// フォント・色・透かし画像の読み込み失敗などはフォールバックで吸収するた
/// め、ここには現れない。呼び出し側に伝播するのは元画像のデコード失敗と入
/// 出力系の失敗のみ。
///
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 元画像をデコードできなかった
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// 画像のエンコード等で発生したエラー
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// リサイズ処理のエラー
    #[error("resize error: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    /// リサイズ用バッファの構築エラー
    #[error("resize buffer error: {0}")]
    ResizeBuffer(#[from] fast_image_resize::ImageBufferError),

    /// 設定ファイルの読み込みエラー
    #[error("invalid settings file: {0}")]
    ConfigRead(#[from] toml::de::Error),

    /// 設定ファイルの書き出しエラー
    #[error("cannot serialize settings: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// 設定ディレクトリを特定できない
    #[error("cannot determine configuration directory")]
    NoConfigDir,
}

/// このクレート用の`Result`型
pub type Result<T> = std::result::Result<T, Error>;
