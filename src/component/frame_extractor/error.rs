//! 擷取流程的錯誤分類
//!
//! 外部工具（ffprobe/ffmpeg）回報的錯誤以 `thiserror` 型別表示，
//! 在單一影片的工作邊界轉成 [`ErrorRecord`]，不會再往上傳遞。

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 影片無法讀取或損壞，該影片直接失敗
#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct ProbeError {
    pub reason: String,
}

impl ProbeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// 黑邊偵測失敗，降級為不裁切
#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct CropDetectionError {
    pub reason: String,
}

impl CropDetectionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// 單一時間點擷取失敗，不影響同一影片的其他時間點
#[derive(Debug, Clone, Error)]
#[error("{reason} (t={timestamp:.3}s)")]
pub struct ExtractionError {
    pub reason: String,
    pub timestamp: f64,
}

impl ExtractionError {
    pub fn new(reason: impl Into<String>, timestamp: f64) -> Self {
        Self {
            reason: reason.into(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 無法取得影片資訊
    Probe,
    /// 扣除開頭與結尾後沒有可用區間
    Planning,
    /// 無法建立影片的輸出資料夾
    Output,
    /// 單張擷取失敗
    Extraction,
    /// 收到中斷信號
    Cancelled,
    /// 工作執行時發生 panic
    Panicked,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Probe => "probe",
            Self::Planning => "planning",
            Self::Output => "output",
            Self::Extraction => "extraction",
            Self::Cancelled => "cancelled",
            Self::Panicked => "panicked",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    pub video_path: PathBuf,
    /// 僅單張擷取錯誤會帶時間點
    pub timestamp: Option<f64>,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, video_path: &Path, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            video_path: video_path.to_path_buf(),
            timestamp: None,
        }
    }

    #[must_use]
    pub fn at(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl From<(&Path, &ExtractionError)> for ErrorRecord {
    fn from((video_path, error): (&Path, &ExtractionError)) -> Self {
        Self::new(ErrorKind::Extraction, video_path, error.reason.clone()).at(error.timestamp)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.video_path.display(), self.message)?;
        if let Some(timestamp) = self.timestamp {
            write!(f, " (t={timestamp:.3}s)")?;
        }
        Ok(())
    }
}
