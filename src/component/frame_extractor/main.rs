//! 影格擷取主模組
//!
//! 協調掃描、選片、排程與結果彙整的整體流程

use super::error::ErrorKind;
use super::output_layout::OutputLayout;
use super::report::RunSummary;
use super::services::MediaToolkit;
use super::types::{ExtractionResult, ExtractionStatus};
use super::video_selector::select;
use super::worker_scheduler::{VideoJob, WorkerScheduler};
use crate::config::Config;
use crate::tools::{ensure_directory_exists, scan_video_files, validate_directory_exists};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 影格擷取器
pub struct FrameExtractor {
    config: Config,
    toolkit: MediaToolkit,
    shutdown_signal: Arc<AtomicBool>,
}

impl FrameExtractor {
    pub fn new(config: Config, toolkit: MediaToolkit, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            toolkit,
            shutdown_signal,
        }
    }

    /// 擷取 `input_dir` 底下所有選中影片的影格到 `output_dir`
    ///
    /// 回傳每部選中影片一筆結果，順序與探索順序相同。個別影片的錯誤記錄在結果中，
    /// 只有設定、路徑或工作池的問題會讓整次執行失敗。
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<Vec<ExtractionResult>> {
        let extraction = &self.config.extraction;
        extraction.validate()?;

        validate_directory_exists(input_dir)?;
        ensure_directory_exists(output_dir)?;
        let input_root = fs::canonicalize(input_dir)
            .with_context(|| format!("無法解析輸入路徑: {}", input_dir.display()))?;
        let output_root = fs::canonicalize(output_dir)
            .with_context(|| format!("無法解析輸出路徑: {}", output_dir.display()))?;

        println!("{}", style("掃描影片檔案中...").dim());
        let discovered = scan_video_files(
            &input_root,
            &self.config.file_type_table,
            Some(&output_root),
        )?;

        if discovered.is_empty() {
            println!("{}", style("找不到任何影片檔案").yellow());
            return Ok(Vec::new());
        }

        let discovered_count = discovered.len();
        let run_seed = extraction.seed.unwrap_or_else(rand::random);
        info!("亂數種子: {run_seed}");

        let selected = select(discovered, extraction, &mut StdRng::seed_from_u64(run_seed));
        println!(
            "{}",
            style(format!(
                "找到 {discovered_count} 個影片檔案，將處理 {} 個",
                selected.len()
            ))
            .green()
        );

        let layout = OutputLayout::new(&input_root, &output_root);
        let jobs: Vec<VideoJob> = layout
            .video_directories(&selected)
            .into_iter()
            .zip(selected)
            .map(|(output_dir, video_path)| VideoJob {
                video_path,
                output_dir,
            })
            .collect();

        let progress_bar = ProgressBar::new(jobs.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .context("進度條樣式無效")?
                .progress_chars("#>-"),
        );
        progress_bar.set_message("擷取影格中...");

        let scheduler = WorkerScheduler::new(
            &self.toolkit,
            extraction,
            Arc::clone(&self.shutdown_signal),
            run_seed,
        );
        let results = scheduler.run_all(jobs, |result| {
            log_result(result);
            progress_bar.inc(1);
        })?;

        if self.shutdown_signal.load(Ordering::SeqCst) {
            progress_bar.abandon_with_message("操作已中斷");
        } else {
            progress_bar.finish_with_message("完成");
        }

        Ok(results)
    }
}

fn log_result(result: &ExtractionResult) {
    let path = result.video_path.display();
    match (&result.status, &result.error) {
        (ExtractionStatus::Success, _) => info!(
            "成功 {path}: {}/{} 張",
            result.frames_written, result.frames_planned
        ),
        (_, Some(record)) if record.kind == ErrorKind::Cancelled => {
            warn!("已中斷 {path}: {record}");
        }
        (ExtractionStatus::PartialSuccess, _) => warn!(
            "部分成功 {path}: {}/{} 張，{} 個錯誤",
            result.frames_written,
            result.frames_planned,
            result.frame_errors.len()
        ),
        (ExtractionStatus::Failed, Some(record)) => error!("失敗 {record}"),
        (ExtractionStatus::Failed, None) => error!("失敗 {path}"),
    }
}

/// 顯示執行結果統計
pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", style("=== 影格擷取結果 ===").cyan().bold());
    println!("  影片: {} 個", summary.total);
    println!("  成功: {} 個", style(summary.successful).green());
    if summary.partial > 0 {
        println!("  部分成功: {} 個", style(summary.partial).yellow());
    }
    if summary.failed > 0 {
        println!("  失敗: {} 個", style(summary.failed).red());
    }
    println!("  影格: {} 張", style(summary.frames_written).cyan());
}
