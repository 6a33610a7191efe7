/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! コンフィギュレーションファイル関連の処理をまとめたモジュール
//!

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use photo_watermarker::settings::{self, Settings, TemplateStore};
use tracing::info;

///
/// 読み込むコンフィギュレーションファイルの決定
///
/// # 引数
/// * `explicit` - オプションで指定されたパス
///
/// # 戻り値
/// 読み込むべきファイルがある場合はそのパスを`Some()`で、無い場合は`None`を
/// 返す。明示的に指定されたパスに何も無い場合はエラーとする。
///
pub(super) fn resolve_path(explicit: Option<&PathBuf>) -> Result<Option<PathBuf>> {
    let path = if let Some(path) = explicit {
        // オプションでコンフィギュレーションファイルのパスが指定されて
        // いる場合、そのパスに何もなければエラー
        if !path.exists() {
            return Err(anyhow!("{} is not exists", path.display()));
        }

        path.clone()
    } else {
        // 指定されていない場合はデフォルトのパス
        match settings::default_settings_path() {
            Ok(path) => path,
            Err(_) => return Ok(None),
        }
    };

    // この時点でパスに何も無い場合は読み込まない
    if !path.exists() {
        return Ok(None);
    }

    // 指定されたパスにあるのがファイルでなければエラー
    if !path.is_file() {
        return Err(anyhow!("{} is not file", path.display()));
    }

    Ok(Some(path))
}

///
/// コンフィギュレーションファイルの読み込み
///
pub(super) fn read<P>(path: P) -> Result<Settings>
where
    P: AsRef<Path>
{
    let path = path.as_ref();

    Settings::load(path)?
        .ok_or_else(|| anyhow!("{} is not exists", path.display()))
}

///
/// テンプレートの読み込み
///
/// # 引数
/// * `name` - テンプレート名
///
pub(super) fn read_template(name: &str) -> Result<Settings> {
    let path = settings::default_templates_path()?;
    let store = TemplateStore::load(&path)?;

    store.find(name)
        .cloned()
        .ok_or_else(|| anyhow!(
            "template \"{}\" is not found (available: {})",
            name,
            store.names().join(", ")
        ))
}

///
/// テンプレートの保存
///
/// # 引数
/// * `template` - 保存する設定(`name`が設定済みであること)
///
/// # 戻り値
/// 保存先のテンプレートファイルのパスを返す。
///
pub(super) fn write_template(template: &Settings) -> Result<PathBuf> {
    if template.name.is_empty() {
        return Err(anyhow!("template name is empty"));
    }

    let path = settings::default_templates_path()?;
    let mut store = TemplateStore::load(&path)?;

    store.add_or_update(template.clone());
    store.save(&path)?;

    info!(name = %template.name, path = %path.display(), "template saved");

    Ok(path)
}
