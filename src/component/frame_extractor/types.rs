use super::error::ErrorRecord;
use crate::config::ImageFormat;
use crate::tools::VideoInfo;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 單一影片的探測結果，只屬於處理該影片的工作
#[derive(Debug, Clone, PartialEq)]
pub struct VideoDescriptor {
    pub path: PathBuf,
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
}

impl VideoDescriptor {
    #[must_use]
    pub fn from_info(path: &Path, info: VideoInfo) -> Self {
        Self {
            path: path.to_path_buf(),
            duration_seconds: info.duration_seconds,
            width: info.width,
            height: info.height,
        }
    }
}

/// 裁切區域（像素）
///
/// 不裁切以 `Option<CropRect>` 的 `None` 表示。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CropRect {
    pub x_offset: u32,
    pub y_offset: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// 寬高不為零，且完整落在來源畫面內
    #[must_use]
    pub fn fits_within(&self, source_width: u32, source_height: u32) -> bool {
        let right = self.x_offset.checked_add(self.width);
        let bottom = self.y_offset.checked_add(self.height);
        self.width > 0
            && self.height > 0
            && right.is_some_and(|r| r <= source_width)
            && bottom.is_some_and(|b| b <= source_height)
    }

    #[must_use]
    pub const fn is_full_frame(&self, source_width: u32, source_height: u32) -> bool {
        self.x_offset == 0
            && self.y_offset == 0
            && self.width == source_width
            && self.height == source_height
    }

    /// ffmpeg `crop` 濾鏡參數（`crop=w:h:x:y`）
    #[must_use]
    pub fn to_filter(&self) -> String {
        format!(
            "crop={}:{}:{}:{}",
            self.width, self.height, self.x_offset, self.y_offset
        )
    }
}

impl FromStr for CropRect {
    type Err = anyhow::Error;

    /// 接受 `crop=w:h:x:y` 或 `w:h:x:y`
    fn from_str(s: &str) -> Result<Self> {
        let values = s.trim().trim_start_matches("crop=");
        let parts: Vec<u32> = values
            .split(':')
            .map(|part| part.parse::<u32>())
            .collect::<std::result::Result<_, _>>()
            .with_context(|| format!("無法解析裁切參數: {s}"))?;

        let [width, height, x_offset, y_offset] = parts[..] else {
            bail!("裁切參數需要 4 個數值: {s}");
        };

        Ok(Self {
            x_offset,
            y_offset,
            width,
            height,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Success,
    PartialSuccess,
    Failed,
}

/// 單張擷取請求
#[derive(Debug, Clone)]
pub struct FrameRequest<'a> {
    pub video_path: &'a Path,
    /// 在擷取計畫中的序號，決定輸出檔名
    pub index: usize,
    pub timestamp: f64,
    pub crop: Option<CropRect>,
    pub output_path: PathBuf,
    pub format: ImageFormat,
}

/// 單一影片的處理結果，每部影片恰好產生一筆
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub video_path: PathBuf,
    pub output_dir: PathBuf,
    pub status: ExtractionStatus,
    pub frames_planned: usize,
    pub frames_written: usize,
    pub error: Option<ErrorRecord>,
    pub frame_errors: Vec<ErrorRecord>,
}

impl ExtractionResult {
    #[must_use]
    pub fn failed(video_path: &Path, output_dir: &Path, error: ErrorRecord) -> Self {
        Self {
            video_path: video_path.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            status: ExtractionStatus::Failed,
            frames_planned: 0,
            frames_written: 0,
            error: Some(error),
            frame_errors: Vec::new(),
        }
    }

    /// 依擷取成功張數決定狀態
    ///
    /// `interruption` 為中途停止的原因；未中斷時以第一筆單張錯誤作為代表錯誤。
    #[must_use]
    pub fn from_frames(
        video_path: &Path,
        output_dir: &Path,
        frames_planned: usize,
        frames_written: usize,
        frame_errors: Vec<ErrorRecord>,
        interruption: Option<ErrorRecord>,
    ) -> Self {
        let status = if frames_planned > 0 && frames_written == frames_planned {
            ExtractionStatus::Success
        } else if frames_written > 0 {
            ExtractionStatus::PartialSuccess
        } else {
            ExtractionStatus::Failed
        };

        let error = interruption.or_else(|| frame_errors.first().cloned());

        Self {
            video_path: video_path.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            status,
            frames_planned,
            frames_written,
            error,
            frame_errors,
        }
    }
}
