//! 影格擷取模組
//!
//! 從資料夾中的每部影片擷取多張靜態影格。
//!
//! ## 流程
//! 1. 遞迴掃描影片，依 `limit` 與 `random_sample` 選片
//! 2. 固定大小的工作池依序取出影片處理
//! 3. 每部影片：ffprobe 探測 → 黑邊偵測（選用）→ 規劃時間點 → 逐張擷取
//! 4. 彙整每部影片的結果，輸出統計與 JSON 報告

mod capture_job;
mod crop_detector;
mod error;
#[cfg(test)]
mod fakes;
mod ffmpeg_toolkit;
mod main;
mod output_layout;
mod report;
mod services;
mod timestamp_planner;
mod types;
mod video_selector;
mod worker_scheduler;

pub use capture_job::FrameCaptureJob;
pub use crop_detector::{CROP_SAMPLE_SECONDS, CropDetector, choose_crop};
pub use error::{CropDetectionError, ErrorKind, ErrorRecord, ExtractionError, ProbeError};
pub use ffmpeg_toolkit::{FfmpegCropService, FfmpegFrameService, FfprobeService};
pub use main::{FrameExtractor, print_summary};
pub use output_layout::{OutputLayout, frame_file_name};
pub use report::{RunSummary, write_report};
pub use services::{CropService, ExtractionService, MediaToolkit, ProbeService, SampleWindow};
pub use timestamp_planner::{TimestampPlan, UsableWindow, plan};
pub use types::{CropRect, ExtractionResult, ExtractionStatus, FrameRequest, VideoDescriptor};
pub use video_selector::select;
pub use worker_scheduler::{VideoJob, WorkerScheduler};
