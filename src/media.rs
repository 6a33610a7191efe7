/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 入力画像ファイルの探索
//!

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// 入力として受け付ける拡張子
pub const SUPPORTED_EXTS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tiff"];

///
/// 入力として受け付ける画像ファイルか否かの判定
///
/// # 注記
/// 拡張子のみで判定する(大文字小文字は区別しない)。
///
pub fn is_supported_image<P>(path: P) -> bool
where
    P: AsRef<Path>
{
    path.as_ref()
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_EXTS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

///
/// 画像ファイルのリストアップ
///
/// # 引数
/// * `dir` - 探査の起点となるフォルダへのパス
///
/// # 戻り値
/// 起点から再帰的に降下探査して見つけた画像ファイルのパスを、ソートして返
/// す。
///
pub fn scan_directory_for_images<P>(dir: P) -> Vec<PathBuf>
where
    P: AsRef<Path>
{
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_supported_image(e.path()))
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}

///
/// 入力パスの展開
///
/// # 引数
/// * `paths` - コマンドライン等で指定されたファイルまたはディレクトリ
///
/// # 戻り値
/// 処理対象の画像ファイルのリストを返す。ディレクトリは再帰的に探査し、対
/// 応していないファイルは除外する。
///
pub fn collect_inputs<P>(paths: &[P]) -> Vec<PathBuf>
where
    P: AsRef<Path>
{
    let mut inputs = Vec::new();

    for path in paths.iter().map(|p| p.as_ref()) {
        if path.is_dir() {
            inputs.extend(scan_directory_for_images(path));
        } else if path.is_file() && is_supported_image(path) {
            inputs.push(path.to_path_buf());
        } else {
            warn!(path = %path.display(), "ignored input");
        }
    }

    inputs
}
