use super::types::{ExtractionResult, ExtractionStatus};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// 執行結果統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub partial: usize,
    pub failed: usize,
    pub frames_written: usize,
}

impl RunSummary {
    #[must_use]
    pub fn from_results(results: &[ExtractionResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut summary, result| {
                match result.status {
                    ExtractionStatus::Success => summary.successful += 1,
                    ExtractionStatus::PartialSuccess => summary.partial += 1,
                    ExtractionStatus::Failed => summary.failed += 1,
                }
                summary.frames_written += result.frames_written;
                summary
            },
        )
    }

    /// 沒有任何影片失敗
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Serialize)]
struct Report<'a> {
    summary: RunSummary,
    results: &'a [ExtractionResult],
}

/// 將所有結果寫成 JSON 報告
pub fn write_report(path: &Path, results: &[ExtractionResult]) -> Result<()> {
    let report = Report {
        summary: RunSummary::from_results(results),
        results,
    };
    let content = serde_json::to_string_pretty(&report).context("無法序列化執行報告")?;
    fs::write(path, content).with_context(|| format!("無法寫入報告: {}", path.display()))?;
    Ok(())
}
