/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! システムフォントファイルの列挙
//!

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, UserDirs};
use walkdir::{DirEntry, WalkDir};

/// フォントファイルとして扱う拡張子
const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

/// 優先表示するCJKフォントのファミリ名(小文字)
const CJK_FAMILY_KEYWORDS: [&str; 12] = [
    "pingfang",
    "songti",
    "stheiti",
    "hiragino",
    "notosanscjk",
    "notoserifcjk",
    "sourcehan",
    "wqy",
    "msyh",
    "simsun",
    "simhei",
    "yugoth",
];

///
/// 列挙したフォントファイルの情報
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontEntry {
    /// 表示名(ファイル名)
    pub name: String,

    /// フォントファイルへの絶対パス
    pub path: PathBuf,
}

///
/// 探査対象とするフォントディレクトリの一覧
///
/// # 戻り値
/// OSの標準フォントディレクトリとユーザーフォントディレクトリのリストを返
/// す。存在しないディレクトリも含まれる。
///
pub fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = [
        // macOS
        "/System/Library/Fonts",
        "/System/Library/Fonts/Supplemental",
        "/Library/Fonts",
        // Linux
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        // Windows
        "C:\\Windows\\Fonts",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    if let Some(user) = UserDirs::new() {
        if let Some(dir) = user.font_dir() {
            dirs.push(dir.to_path_buf());
        }
    }

    if let Some(base) = BaseDirs::new() {
        dirs.push(base.home_dir().join("Library/Fonts"));
        dirs.push(base.home_dir().join(".fonts"));
    }

    dirs
}

///
/// システムフォントファイルの列挙
///
/// # 戻り値
/// 見つかったフォントファイルを、CJKフォントを先頭にして並べたリストを返す。
///
pub fn scan_system_font_files() -> Vec<FontEntry> {
    scan_font_files(&font_directories())
}

///
/// 指定ディレクトリ群のフォントファイルの列挙
///
/// # 引数
/// * `dirs` - 探査対象のディレクトリのリスト
///
/// # 戻り値
/// `(表示名, パス)`のリストを返す。
///
/// # 注記
/// 同一パスは一度だけ列挙する。並び順はCJKファミリを優先し、名前に"bold"
/// を含むものを後ろに回す(同順位の中では発見順を保つ)。
///
pub fn scan_font_files<P>(dirs: &[P]) -> Vec<FontEntry>
where
    P: AsRef<Path>,
{
    let mut seen = HashSet::new();
    let mut fonts = Vec::new();

    for dir in dirs {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            continue;
        }

        for entry in font_files(dir) {
            let path = entry.path().to_path_buf();
            if !seen.insert(path.clone()) {
                continue;
            }

            fonts.push(FontEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
            });
        }
    }

    fonts.sort_by_key(|font| priority(&font.name));
    fonts
}

///
/// ファイル名(拡張子を除く)によるフォントファイルの検索
///
/// # 注記
/// 大文字小文字を区別せずに比較する。フォールバック用の汎用フェイスを名前
/// で引くために使用する。
///
pub(crate) fn find_font_file(stem: &str) -> Option<PathBuf> {
    let stem = stem.to_lowercase();

    font_directories()
        .iter()
        .filter(|dir| dir.is_dir())
        .flat_map(|dir| font_files(dir))
        .find(|entry| {
            entry.path()
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_lowercase() == stem)
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
}

///
/// フォントファイルのリストアップ
///
fn font_files(dir: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| FONT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
}

///
/// 並び替え用のスコア(小さいほど先頭)
///
fn priority(name: &str) -> i32 {
    let name = name.to_lowercase().replace([' ', '-', '_'], "");
    let mut score = 0;

    if CJK_FAMILY_KEYWORDS.iter().any(|k| name.contains(k)) {
        score -= 10;
    }

    if name.contains("bold") {
        score += 1;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn cjk_families_sort_first() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Arial.ttf", "Helvetica Bold.otf", "PingFang.ttc", "readme.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/Songti.TTC"), b"").unwrap();

        let fonts = scan_font_files(&[dir.path()]);
        let names: Vec<&str> = fonts.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names.len(), 4);
        assert!(names[..2].contains(&"PingFang.ttc"));
        assert!(names[..2].contains(&"Songti.TTC"));
        assert_eq!(names[2], "Arial.ttf");
        assert_eq!(names[3], "Helvetica Bold.otf");
    }

    #[test]
    fn duplicate_directories_are_listed_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Font.ttf"), b"").unwrap();

        let fonts = scan_font_files(&[dir.path(), dir.path()]);
        assert_eq!(fonts.len(), 1);
        assert!(fonts[0].path.is_absolute());
    }

    #[test]
    fn missing_directories_are_ignored() {
        let fonts = scan_font_files(&[Path::new("/nonexistent/font/dir")]);
        assert!(fonts.is_empty());
    }

    #[test]
    fn font_directories_cover_system_and_user_locations() {
        let dirs = font_directories();
        assert!(dirs.contains(&PathBuf::from("/usr/share/fonts")));

        if let Some(base) = BaseDirs::new() {
            assert!(dirs.contains(&base.home_dir().join(".fonts")));
        }
    }
}
