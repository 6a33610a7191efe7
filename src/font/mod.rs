/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! フォントフェイスの解決
//!
//! 明示指定のフォントファイル、CJK対応のシステムフォント、汎用フォント、
//! 内蔵フェイスの順にフォールバックしながら描画用のフェイスを決定する。
//!

mod scan;

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use ab_glyph::{Font, FontArc, FontVec, PxScale, ScaleFont};
use tracing::{debug, warn};

pub use scan::{font_directories, scan_font_files, scan_system_font_files, FontEntry};

/// フォントコレクション(.ttc)で試行するサブフェイスの数
const COLLECTION_FACE_PROBES: u32 = 8;

/// CJK対応のフォントコレクション(優先順)
const CJK_COLLECTIONS: [&str; 12] = [
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/Hiragino Sans GB.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
    "/System/Library/Fonts/STHeiti Light.ttc",
    "/System/Library/Fonts/Supplemental/Songti.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simsun.ttc",
];

/// その他のUnicode対応フォント
const OTHER_CANDIDATES: [&str; 5] = [
    "/Library/Fonts/NotoSansCJKsc-Regular.otf",
    "/Library/Fonts/NotoSansCJK-Regular.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
    "/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf",
    "C:\\Windows\\Fonts\\arialuni.ttf",
];

/// 汎用フェイスとして名前で検索するフォント
const GENERIC_FACES: [&str; 4] = ["Arial", "DejaVuSans", "LiberationSans-Regular", "FreeSans"];

/// 読み込み済みフォントのキャッシュ(失敗もキャッシュする)
static LOADED: OnceLock<Mutex<HashMap<(PathBuf, u32), Option<FontArc>>>> = OnceLock::new();

/// 自動選択したフォールバックフォント
static FALLBACK: OnceLock<Option<FontArc>> = OnceLock::new();

///
/// 描画に使用するフォントフェイス
///
/// # 注記
/// アウトラインフォントが一つも見つからない場合は内蔵フェイスとなる。内蔵
/// フェイスは全ての文字を矩形(いわゆる豆腐)として描画する。
///
#[derive(Clone)]
pub struct FontFace {
    /// フェイスの実体
    kind: FaceKind,

    /// ピクセルサイズ(emの大きさ)
    size: f32,
}

#[derive(Clone)]
enum FaceKind {
    Outline(FontArc),
    Builtin,
}

impl Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("builtin", &self.is_builtin())
            .field("size", &self.size)
            .finish()
    }
}

impl FontFace {
    ///
    /// アウトラインフォントからの生成
    ///
    pub fn from_font(font: FontArc, size: f32) -> Self {
        Self {
            kind: FaceKind::Outline(font),
            size: size.max(1.0),
        }
    }

    ///
    /// 内蔵フェイスの生成
    ///
    pub fn builtin(size: f32) -> Self {
        Self {
            kind: FaceKind::Builtin,
            size: size.max(1.0),
        }
    }

    /// ピクセルサイズへのアクセサ
    pub fn size(&self) -> f32 {
        self.size
    }

    ///
    /// グリフ描画用のスケール
    ///
    /// # 注記
    /// ab_glyphのスケールはアセントからディセントまでの高さを表すので、em
    /// の大きさがピクセルサイズに一致するよう換算する。
    ///
    pub fn px_scale(&self) -> PxScale {
        match &self.kind {
            FaceKind::Outline(font) => {
                let height = font.height_unscaled();
                let upem = font.units_per_em().unwrap_or(height);

                if height > 0.0 && upem > 0.0 {
                    PxScale::from(self.size * height / upem)
                } else {
                    PxScale::from(self.size)
                }
            }
            FaceKind::Builtin => PxScale::from(self.size),
        }
    }

    /// 内蔵フェイスか否か
    pub fn is_builtin(&self) -> bool {
        matches!(self.kind, FaceKind::Builtin)
    }

    /// アウトラインフォントへのアクセサ
    pub(crate) fn outline(&self) -> Option<&FontArc> {
        match &self.kind {
            FaceKind::Outline(font) => Some(font),
            FaceKind::Builtin => None,
        }
    }

    ///
    /// ベースラインから上端までの距離
    ///
    pub fn ascent(&self) -> f32 {
        match &self.kind {
            FaceKind::Outline(font) => font.as_scaled(self.px_scale()).ascent(),
            FaceKind::Builtin => self.size * 0.8,
        }
    }

    ///
    /// ベースラインから下端までの距離(負値)
    ///
    pub fn descent(&self) -> f32 {
        match &self.kind {
            FaceKind::Outline(font) => font.as_scaled(self.px_scale()).descent(),
            FaceKind::Builtin => -self.size * 0.2,
        }
    }

    ///
    /// 行送り量
    ///
    pub fn line_height(&self) -> f32 {
        match &self.kind {
            FaceKind::Outline(font) => {
                let scaled = font.as_scaled(self.px_scale());
                scaled.ascent() - scaled.descent() + scaled.line_gap()
            }
            FaceKind::Builtin => self.size,
        }
    }
}

///
/// フォントフェイスの解決
///
/// # 引数
/// * `size_px` - フォントのピクセルサイズ
/// * `explicit_path` - ユーザーが指定したフォントファイルへのパス
///
/// # 戻り値
/// 描画に使用するフォントフェイスを返す。
///
/// # 注記
/// 失敗することは無い。指定フォントが読めない場合はCJK対応のシステムフォ
/// ント(コレクションはサブフェイス0〜7を順に試す)、その他のUnicodeフォン
/// ト、汎用フェイスの順に試し、全て駄目なら内蔵フェイスを返す。
///
pub fn resolve(size_px: u32, explicit_path: Option<&Path>) -> FontFace {
    let size = size_px.max(1) as f32;

    if let Some(path) = explicit_path {
        if let Some(font) = load_cached(path, 0) {
            debug!(path = %path.display(), size, "using selected font");
            return FontFace::from_font(font, size);
        }

        warn!(path = %path.display(), "cannot load selected font, falling back");
    }

    match FALLBACK.get_or_init(search_fallback) {
        Some(font) => FontFace::from_font(font.clone(), size),
        None => FontFace::builtin(size),
    }
}

///
/// フォールバックフォントの探索
///
fn search_fallback() -> Option<FontArc> {
    for path in CJK_COLLECTIONS.iter().map(Path::new) {
        if !path.exists() {
            continue;
        }

        for index in 0..COLLECTION_FACE_PROBES {
            if let Some(font) = load_cached(path, index) {
                debug!(path = %path.display(), index, "using CJK font");
                return Some(font);
            }
        }
    }

    for path in OTHER_CANDIDATES.iter().map(Path::new) {
        if path.exists() {
            if let Some(font) = load_cached(path, 0) {
                debug!(path = %path.display(), "using unicode font");
                return Some(font);
            }
        }
    }

    for name in GENERIC_FACES {
        if let Some(path) = scan::find_font_file(name) {
            if let Some(font) = load_cached(&path, 0) {
                debug!(path = %path.display(), "using generic font");
                return Some(font);
            }
        }
    }

    warn!("no outline font available, using built-in face");
    None
}

///
/// キャッシュを経由したフォントファイルの読み込み
///
fn load_cached(path: &Path, index: u32) -> Option<FontArc> {
    let cache = LOADED.get_or_init(|| Mutex::new(HashMap::new()));
    let key = (path.to_path_buf(), index);

    if let Ok(map) = cache.lock() {
        if let Some(hit) = map.get(&key) {
            return hit.clone();
        }
    }

    let font = load_font_file(path, index);

    if let Ok(mut map) = cache.lock() {
        map.insert(key, font.clone());
    }

    font
}

///
/// フォントファイルの読み込み
///
/// # 引数
/// * `path` - フォントファイルへのパス
/// * `index` - コレクション内のフェイス番号(単体フォントの場合は0)
///
/// # 戻り値
/// 読み込めた場合はフォントを返す。読めない場合は`None`を返す。
///
pub fn load_font_file(path: &Path, index: u32) -> Option<FontArc> {
    let data = std::fs::read(path).ok()?;
    let font = FontVec::try_from_vec_and_index(data, index).ok()?;

    Some(FontArc::new(font))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_explicit_path_still_resolves() {
        let face = resolve(32, Some(Path::new("/nonexistent/font.ttf")));
        assert_eq!(face.size(), 32.0);
        assert!(face.ascent() > 0.0);
        assert!(face.descent() <= 0.0);
    }

    #[test]
    fn non_font_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.ttf");
        std::fs::write(&path, b"not a font").unwrap();

        assert!(load_font_file(&path, 0).is_none());
    }

    #[test]
    fn builtin_face_metrics() {
        let face = FontFace::builtin(20.0);
        assert!(face.is_builtin());
        assert!((face.ascent() - 16.0).abs() < 1e-3);
        assert!((face.descent() + 4.0).abs() < 1e-3);
        assert!((face.line_height() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn capital_height_follows_em_size() {
        let Some(path) = scan::find_font_file("DejaVuSans") else {
            return;
        };
        let Some(font) = load_font_file(&path, 0) else {
            return;
        };

        // DejaVu Sansのキャップハイトは1493/2048em
        let face = FontFace::from_font(font, 100.0);
        let height = crate::layout::measure(&face, "M").height();
        assert!((71..=76).contains(&height), "cap height {}", height);
    }

    #[test]
    fn builtin_scale_is_size() {
        let face = FontFace::builtin(24.0);
        assert_eq!(face.px_scale(), PxScale::from(24.0));
    }

    #[test]
    fn zero_size_is_floored() {
        let face = resolve(0, None);
        assert!(face.size() >= 1.0);
    }
}
