/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! コマンドラインオプション関連の処理をまとめたモジュール
//!

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use photo_watermarker::settings::{NamingKind, Settings, WatermarkKind};
use photo_watermarker::{Anchor, OutputFormat, ResizeMode, ScaleMode};

/// テキスト未指定時に使用する透かし文字列
const DEFAULT_TEXT: &str = "WATERMARK";

///
/// コマンドラインオプションの情報をまとめる構造体
///
#[derive(Parser, Debug, Clone)]
#[command(
    name = "photo-watermarker",
    about = "写真に文字または画像の透かしを合成するCLIツール",
    version,
    long_about = None,
)]
pub struct Options {
    /// コンフィギュレーションファイルのパス
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// 適用するテンプレートの名前
    #[arg(short = 't', long = "template", value_name = "NAME")]
    template: Option<String>,

    /// 有効な設定をテンプレートとして保存する際の名前
    #[arg(long = "save-template", value_name = "NAME")]
    save_template: Option<String>,

    /// 出力先ディレクトリ
    #[arg(short = 'o', long = "output-path", value_name = "PATH")]
    output_path: Option<PathBuf>,

    /// 透かしの種別(text, image)
    #[arg(short = 'w', long = "watermark-type", value_name = "TYPE")]
    watermark_type: Option<WatermarkKind>,

    /// 透かしのテキスト(\nで改行)
    #[arg(short = 'T', long = "text", value_name = "TEXT")]
    text: Option<String>,

    /// 不透明度(0〜100)
    #[arg(long = "opacity", value_name = "PERCENT")]
    opacity: Option<i32>,

    /// 透かしの配置位置
    ///
    /// top-left, top, top-right, left, center, right, bottom-left, bottom,
    /// bottom-right, custom
    #[arg(short = 'p', long = "position", value_name = "POSITION")]
    position: Option<Anchor>,

    /// 任意配置時のX座標
    #[arg(long = "custom-x", value_name = "X", allow_negative_numbers = true)]
    custom_x: Option<i32>,

    /// 任意配置時のY座標
    #[arg(long = "custom-y", value_name = "Y", allow_negative_numbers = true)]
    custom_y: Option<i32>,

    /// 回転角(度、反時計回りが正)
    #[arg(short = 'r', long = "rotation", value_name = "DEGREES",
        allow_negative_numbers = true)]
    rotation: Option<i32>,

    /// フォントファイルのパス
    #[arg(long = "font-path", value_name = "FILE")]
    font_path: Option<PathBuf>,

    /// フォントサイズ(0は画像サイズから自動算出)
    #[arg(long = "font-size", value_name = "PIXELS")]
    font_size: Option<i32>,

    /// 太字
    #[arg(long = "bold", value_name = "BOOL", num_args = 0..=1,
        require_equals = true, default_missing_value = "true")]
    bold: Option<bool>,

    /// 斜体
    #[arg(long = "italic", value_name = "BOOL", num_args = 0..=1,
        require_equals = true, default_missing_value = "true")]
    italic: Option<bool>,

    /// 文字色(#RRGGBB)
    #[arg(long = "font-color", value_name = "COLOR")]
    font_color: Option<String>,

    /// 縁取りの幅
    #[arg(long = "stroke-width", value_name = "PIXELS")]
    stroke_width: Option<i32>,

    /// 縁取りの色(#RRGGBB)
    #[arg(long = "stroke-color", value_name = "COLOR")]
    stroke_color: Option<String>,

    /// 影
    #[arg(long = "shadow", value_name = "BOOL", num_args = 0..=1,
        require_equals = true, default_missing_value = "true")]
    shadow: Option<bool>,

    /// 影のX方向のずらし量
    #[arg(long = "shadow-offset-x", value_name = "PIXELS",
        allow_negative_numbers = true)]
    shadow_offset_x: Option<i32>,

    /// 影のY方向のずらし量
    #[arg(long = "shadow-offset-y", value_name = "PIXELS",
        allow_negative_numbers = true)]
    shadow_offset_y: Option<i32>,

    /// 影の色(#RRGGBB)
    #[arg(long = "shadow-color", value_name = "COLOR")]
    shadow_color: Option<String>,

    /// スーパーサンプリング倍率
    #[arg(long = "render-scale", value_name = "SCALE")]
    render_scale: Option<i32>,

    /// 透かし画像のパス
    #[arg(short = 'l', long = "image-path", value_name = "FILE")]
    image_path: Option<PathBuf>,

    /// 透かし画像の拡縮方法(percent, free)
    #[arg(long = "image-scale-mode", value_name = "MODE")]
    image_scale_mode: Option<ScaleMode>,

    /// 透かし画像の倍率(%)
    #[arg(long = "image-scale-percent", value_name = "PERCENT")]
    image_scale_percent: Option<i32>,

    /// 透かし画像の幅
    #[arg(long = "image-width", value_name = "PIXELS")]
    image_width: Option<i32>,

    /// 透かし画像の高さ
    #[arg(long = "image-height", value_name = "PIXELS")]
    image_height: Option<i32>,

    /// 透かし画像の縦横比の維持
    #[arg(long = "keep-aspect", value_name = "BOOL", num_args = 0..=1,
        require_equals = true, default_missing_value = "true")]
    keep_aspect: Option<bool>,

    /// 出力フォーマット(png, jpeg)
    #[arg(short = 'F', long = "format", value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// JPEG品質(0〜100)
    #[arg(short = 'q', long = "jpeg-quality", value_name = "QUALITY")]
    jpeg_quality: Option<i32>,

    /// 出力ファイル名の命名規則(original, prefix, suffix)
    #[arg(short = 'n', long = "naming", value_name = "RULE")]
    naming: Option<NamingKind>,

    /// 出力ファイル名の接頭辞
    #[arg(long = "prefix", value_name = "PREFIX")]
    prefix: Option<String>,

    /// 出力ファイル名の接尾辞
    #[arg(long = "suffix", value_name = "SUFFIX")]
    suffix: Option<String>,

    /// 出力時のリサイズ方法(none, width, height, percent)
    #[arg(long = "resize", value_name = "MODE")]
    resize_mode: Option<ResizeMode>,

    /// リサイズ後の幅
    #[arg(long = "resize-width", value_name = "PIXELS")]
    resize_width: Option<i32>,

    /// リサイズ後の高さ
    #[arg(long = "resize-height", value_name = "PIXELS")]
    resize_height: Option<i32>,

    /// リサイズ倍率(%)
    #[arg(long = "resize-percent", value_name = "PERCENT")]
    resize_percent: Option<i32>,

    /// 並列処理数(省略時はCPUコア数)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    jobs: Option<usize>,

    /// 上書き許可
    #[arg(short = 'f', long, default_value = "false")]
    force: bool,

    /// 設定情報の表示
    #[arg(short = 's', long = "show-options", default_value = "false")]
    show_options: bool,

    /// 入力ファイルまたはディレクトリ
    #[arg(required_unless_present_any = ["save_template", "show_options"])]
    inputs: Vec<PathBuf>,

    /// 各層を適用した後の有効な設定
    #[arg(skip)]
    settings: Settings,
}

impl Options {
    ///
    /// 出力フォルダへのアクセサ
    ///
    pub(crate) fn output_path(&self) -> PathBuf {
        if let Some(path) = &self.output_path {
            path.clone()
        } else {
            PathBuf::from(".")
        }
    }

    ///
    /// 有効な設定へのアクセサ
    ///
    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    ///
    /// テンプレート保存名へのアクセサ
    ///
    pub(crate) fn save_template(&self) -> Option<&str> {
        self.save_template.as_deref()
    }

    ///
    /// 並列処理数へのアクセサ
    ///
    /// # 注記
    /// 未指定の場合は0を返す(スレッドプールの既定値を使用する)。
    ///
    pub(crate) fn jobs(&self) -> usize {
        self.jobs.unwrap_or(0)
    }

    ///
    /// 強制書き込み可否のフラグへのアクセサ
    ///
    pub(crate) fn is_force(&self) -> bool {
        self.force
    }

    ///
    /// 入力ファイルリストへのアクセサ
    ///
    pub(crate) fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    ///
    /// オプション情報モードか否かのフラグへのアクセサ
    ///
    /// # 戻り値
    /// オプション情報表示モードが指定されている場合は`true`が、通常モードのが
    /// 指定されている場合は`false`が返される。
    ///
    pub(crate) fn is_show_options(&self) -> bool {
        self.show_options
    }

    ///
    /// オプション設定内容の表示
    ///
    pub(crate) fn show_options(&self) {
        let config_path = config::resolve_path(self.config_file.as_ref())
            .ok()
            .flatten();

        println!("config path:       {:?}", config_path);
        println!("template:          {:?}", self.template);
        println!("output path:       {:?}", self.output_path());
        println!("jobs:              {}", self.jobs());
        println!("force:             {}", self.force);
        println!();

        match toml::to_string_pretty(&self.settings) {
            Ok(text) => print!("{}", text),
            Err(err) => println!("(cannot show settings: {})", err),
        }
    }

    ///
    /// コンフィギュレーションの適用
    ///
    /// # 注記
    /// 既定値・設定ファイル・テンプレート・コマンドラインの順に重ね、後の
    /// ものを優先する。
    ///
    fn apply_config(&mut self) -> Result<()> {
        /*
         * 設定ファイル
         */
        let mut settings = match config::resolve_path(self.config_file.as_ref())? {
            Some(path) => config::read(&path)?,
            None => Settings::default(),
        };

        /*
         * テンプレート
         */
        if let Some(name) = &self.template {
            settings = config::read_template(name)?;
        }

        /*
         * コマンドライン
         */
        self.apply_args(&mut settings);

        if settings.text.is_empty() {
            settings.text = DEFAULT_TEXT.to_string();
        }

        if let Some(name) = &self.save_template {
            settings.name = name.clone();
        }

        self.settings = settings;

        Ok(())
    }

    ///
    /// コマンドラインで指定された値の反映
    ///
    fn apply_args(&self, settings: &mut Settings) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }

        set(&mut settings.watermark_type, &self.watermark_type);
        set(&mut settings.text, &self.text.as_ref().map(|s| s.replace("\\n", "\n")));
        set(&mut settings.opacity, &self.opacity);
        set(&mut settings.position, &self.position);
        set(&mut settings.watermark_rotation, &self.rotation);

        if self.custom_x.is_some() {
            settings.custom_x = self.custom_x;
        }

        if self.custom_y.is_some() {
            settings.custom_y = self.custom_y;
        }

        // 座標のみ指定された場合は任意配置とみなす
        if self.position.is_none() && (self.custom_x.is_some() || self.custom_y.is_some()) {
            settings.position = Anchor::Custom;
        }

        if self.font_path.is_some() {
            settings.font_path = self.font_path.clone();
        }

        set(&mut settings.font_size, &self.font_size);
        set(&mut settings.font_bold, &self.bold);
        set(&mut settings.font_italic, &self.italic);
        set(&mut settings.font_color, &self.font_color);
        set(&mut settings.font_stroke_width, &self.stroke_width);
        set(&mut settings.font_stroke_color, &self.stroke_color);
        set(&mut settings.font_shadow_enabled, &self.shadow);
        set(&mut settings.font_shadow_offset_x, &self.shadow_offset_x);
        set(&mut settings.font_shadow_offset_y, &self.shadow_offset_y);
        set(&mut settings.font_shadow_color, &self.shadow_color);
        set(&mut settings.render_scale, &self.render_scale);

        if self.image_path.is_some() {
            settings.image_watermark_path = self.image_path.clone();

            // 画像のみ指定された場合は画像透かしとみなす
            if self.watermark_type.is_none() {
                settings.watermark_type = WatermarkKind::Image;
            }
        }

        set(&mut settings.image_scale_mode, &self.image_scale_mode);
        set(&mut settings.image_scale_percent, &self.image_scale_percent);
        set(&mut settings.image_scale_width, &self.image_width);
        set(&mut settings.image_scale_height, &self.image_height);
        set(&mut settings.image_keep_aspect, &self.keep_aspect);

        set(&mut settings.format, &self.format);
        set(&mut settings.jpeg_quality, &self.jpeg_quality);
        set(&mut settings.naming, &self.naming);
        set(&mut settings.prefix, &self.prefix);
        set(&mut settings.suffix, &self.suffix);
        set(&mut settings.resize_mode, &self.resize_mode);
        set(&mut settings.resize_width, &self.resize_width);
        set(&mut settings.resize_height, &self.resize_height);
        set(&mut settings.resize_percent, &self.resize_percent);
    }

    ///
    /// 設定情報のバリデーション
    ///
    /// # 戻り値
    /// 設定情報に問題が無い場合は`Ok(())`を返す。問題があった場合はエラー情報
    /// を`Err()`でラップして返す。
    ///
    fn validate(&self) -> Result<()> {
        /*
         * 出力先パスの確認(存在しない場合は書き出し時に作成する)
         */
        if let Some(path) = &self.output_path {
            if path.exists() && !path.is_dir() {
                return Err(anyhow!(
                    "output path \"{}\" is not directory",
                    path.display()
                ));
            }
        }

        /*
         * 透かし画像の確認
         */
        if self.settings.watermark_type == WatermarkKind::Image {
            match &self.settings.image_watermark_path {
                Some(path) if !path.is_file() => {
                    return Err(anyhow!(
                        "watermark image \"{}\" is not file",
                        path.display()
                    ));
                }
                Some(_) => {}
                None => return Err(anyhow!("watermark image is not specified")),
            }
        }

        /*
         * フォントファイルの確認
         */
        if let Some(path) = &self.settings.font_path {
            if !path.is_file() {
                return Err(anyhow!("font file \"{}\" is not file", path.display()));
            }
        }

        /*
         * 入力ファイルまたはディレクトリの確認
         */
        for path in self.inputs.iter() {
            if !(path.is_file() || path.is_dir()) {
                return Err(anyhow!(
                    "input path \"{}\" is not file or directory",
                    path.display()
                ));
            }
        }

        if self.jobs == Some(0) {
            return Err(anyhow!("jobs must be greater than 0"));
        }

        Ok(())
    }
}

///
/// 有効な設定のテンプレートとしての保存
///
/// # 戻り値
/// 保存先のパスを返す。
///
pub(crate) fn save_template(opts: &Options) -> Result<Option<PathBuf>> {
    match opts.save_template() {
        Some(_) => Ok(Some(config::write_template(opts.settings())?)),
        None => Ok(None),
    }
}

///
/// コマンドライン引数のパース
///
/// # 戻り値
/// 処理に成功した場合はオプション設定をパックしたオブジェクトを`Ok()`でラップ
/// して返す。失敗した場合はエラー情報を`Err()`でラップして返す。
///
pub(crate) fn parse() -> Result<Arc<Options>> {
    from_options(Options::parse())
}

///
/// パース済みオプションへの設定の適用と検証
///
pub(crate) fn from_options(mut opts: Options) -> Result<Arc<Options>> {
    /*
     * コンフィギュレーションファイルの適用
     */
    opts.apply_config()?;

    /*
     * 設定情報のバリデーション
     */
    opts.validate()?;

    /*
     * 設定情報の返却
     */
    Ok(Arc::new(opts))
}
