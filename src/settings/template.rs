/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! 名前付きテンプレートの管理
//!

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

use super::{write_toml, Settings};

///
/// テンプレートの一覧
///
/// # 注記
/// TOMLでは`[[template]]`の配列として保存する。
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateStore {
    #[serde(default, rename = "template")]
    templates: Vec<Settings>,
}

impl TemplateStore {
    ///
    /// テンプレートの追加または更新
    ///
    /// # 注記
    /// 同名のテンプレートがあればその位置で置き換え、無ければ末尾に追加す
    /// る。名前が空のテンプレートは無視する。
    ///
    pub fn add_or_update(&mut self, template: Settings) {
        if template.name.is_empty() {
            return;
        }

        match self.templates.iter_mut().find(|t| t.name == template.name) {
            Some(slot) => *slot = template,
            None => self.templates.push(template),
        }
    }

    /// 保存順のテンプレート名
    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }

    /// 名前によるテンプレートの検索
    pub fn find(&self, name: &str) -> Option<&Settings> {
        self.templates.iter().find(|t| t.name == name)
    }

    ///
    /// テンプレートの削除
    ///
    /// # 戻り値
    /// 削除した場合は`true`を返す。
    ///
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.name != name);
        self.templates.len() != before
    }

    /// 空か否か
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    ///
    /// テンプレートファイルの読み込み
    ///
    /// # 注記
    /// ファイルが存在しない場合は空の一覧を返す。
    ///
    pub fn load<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>
    {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no templates file");
            return Ok(Self::default());
        }

        Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
    }

    ///
    /// テンプレートファイルの書き込み
    ///
    pub fn save<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>
    {
        write_toml(path.as_ref(), &toml::to_string_pretty(self)?)
    }
}
