/*
 * Photo Watermarker
 *
 *  Copyright (C) 2025 Hiroshi KUWAGATA <kgt9221@gmail.com>
 */

//!
//! プログラムのエントリポイント
//!

mod cmd_args;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use photo_watermarker::{collect_inputs, export_file, ExportOptions, Placement, WatermarkStyle};
use rayon::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cmd_args::Options;

///
/// プログラムのエントリポイント
///
fn main() {
    /*
     * ログ出力の初期化
     */
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    /*
     * コマンドラインオプションのパース
     */
    let opts = match cmd_args::parse() {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        },
    };

    if opts.is_show_options() {
        opts.show_options();
        std::process::exit(0);
    }

    /*
     * 実行関数の呼び出し
     */
    match run(opts) {
        Ok(0) => {}
        Ok(failed) => {
            eprintln!("error: {} file(s) failed", failed);
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    }
}

///
/// プログラムの実行関数
///
/// # 引数
/// * `opts` - オプション情報をパックしたオブジェクト
///
/// # 戻り値
/// 全ての入力を処理し終えた場合は、失敗したファイルの数を`Ok()`でラップして
/// 返す。処理を開始できなかった場合はエラー情報を`Err()`でラップして返す。
///
/// # 注記
/// 1ファイルの失敗では中断せず、残りのファイルの処理を続ける。
///
fn run(opts: Arc<Options>) -> Result<usize> {
    /*
     * テンプレートの保存
     */
    if let Some(path) = cmd_args::save_template(&opts)? {
        println!("template saved to {}", path.display());
    }

    /*
     * 入力ファイルの展開
     */
    let inputs = collect_inputs(opts.inputs());
    if inputs.is_empty() {
        info!("no input images");
        return Ok(0);
    }

    let settings = opts.settings();
    let style = settings.watermark_style();
    let placement = settings.placement();
    let export = settings.export_options();

    /*
     * 並列での書き出し
     */
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.jobs())
        .build()?;

    info!(files = inputs.len(), threads = pool.current_num_threads(), "start");

    let failed = pool.install(|| {
        inputs.par_iter()
            .filter(|path| {
                match proc_file(&opts, path, &style, &placement, &export) {
                    Ok(()) => false,
                    Err(err) => {
                        error!(path = %path.display(), "{:#}", err);
                        true
                    }
                }
            })
            .count()
    });

    Ok(failed)
}

///
/// 画像ファイルに対する透かしの合成
///
/// # 引数
/// * `opts` - オプション情報をパックしたオブジェクト
/// * `input_path` - 処理対象の画像ファイルへのパス
/// * `style` - 透かしのスタイル
/// * `placement` - 配置指定
/// * `export` - 書き出し設定
///
/// # 戻り値
/// 処理に成功した場合は`Ok(())`を返す。処理に失敗した場合はエラー情報を`Err()`
/// でラップして返す。
///
/// # 注記
/// オプション情報で強制書き込みが指定されていない場合かつ、出力ファイルが既に
/// 存在する場合は処理をスキップした上で`Ok(())`を返すので注意すること。
///
fn proc_file<P>(
    opts: &Arc<Options>,
    input_path: P,
    style: &WatermarkStyle,
    placement: &Placement,
    export: &ExportOptions,
) -> Result<()>
where
    P: AsRef<Path>
{
    let input_path = input_path.as_ref();
    let output_dir = opts.output_path();
    let output_path = export.output_path(input_path, &output_dir);

    /*
     * 出力ファイルが既に存在する場合はスキップ
     */
    if output_path.exists() && !opts.is_force() {
        eprintln!(
            "{} => {} skip (already exist)",
            input_path.display(),
            output_path.display()
        );
        return Ok(());
    }

    /*
     * デコード・合成・リサイズ・書き込み
     */
    let written = export_file(input_path, &output_dir, style, placement, export)?;

    println!("{} => {}", input_path.display(), written.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use image::{Rgba, RgbaImage};

    #[test]
    fn failed_file_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("none.toml");
        std::fs::write(&config, "").unwrap();

        let good = dir.path().join("good.png");
        RgbaImage::from_pixel(120, 80, Rgba([200, 200, 200, 255])).save(&good).unwrap();
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, b"not an image").unwrap();

        let out = dir.path().join("out");
        let opts = Options::try_parse_from([
            "photo-watermarker",
            "-c", config.to_str().unwrap(),
            "-o", out.to_str().unwrap(),
            "-j", "2",
            good.to_str().unwrap(),
            broken.to_str().unwrap(),
        ]).unwrap();
        let opts = cmd_args::from_options(opts).unwrap();

        assert_eq!(run(opts).unwrap(), 1);
        assert!(out.join("good.png").is_file());
        assert!(!out.join("broken.png").exists());
    }
}
