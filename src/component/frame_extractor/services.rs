//! 外部能力的介面
//!
//! 探測、黑邊偵測與影格擷取各自是一個 trait，排程與規劃邏輯只依賴這些介面，
//! 實際的 ffmpeg 實作在 `ffmpeg_toolkit`，測試則換成假實作。

use super::error::{CropDetectionError, ExtractionError, ProbeError};
use super::ffmpeg_toolkit::{FfmpegCropService, FfmpegFrameService, FfprobeService};
use super::types::{CropRect, FrameRequest, VideoDescriptor};
use std::path::Path;
use std::sync::Arc;

pub trait ProbeService: Send + Sync {
    fn probe(&self, path: &Path) -> Result<VideoDescriptor, ProbeError>;
}

/// 黑邊偵測的取樣區間（秒）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleWindow {
    pub start: f64,
    pub duration: f64,
}

pub trait CropService: Send + Sync {
    /// 回傳取樣區間內每次分析得到的裁切候選，可能為空
    fn detect_crop(
        &self,
        path: &Path,
        window: SampleWindow,
    ) -> Result<Vec<CropRect>, CropDetectionError>;
}

pub trait ExtractionService: Send + Sync {
    fn extract_frame(&self, request: &FrameRequest<'_>) -> Result<(), ExtractionError>;
}

impl<T: ProbeService + ?Sized> ProbeService for Arc<T> {
    fn probe(&self, path: &Path) -> Result<VideoDescriptor, ProbeError> {
        (**self).probe(path)
    }
}

impl<T: CropService + ?Sized> CropService for Arc<T> {
    fn detect_crop(
        &self,
        path: &Path,
        window: SampleWindow,
    ) -> Result<Vec<CropRect>, CropDetectionError> {
        (**self).detect_crop(path, window)
    }
}

impl<T: ExtractionService + ?Sized> ExtractionService for Arc<T> {
    fn extract_frame(&self, request: &FrameRequest<'_>) -> Result<(), ExtractionError> {
        (**self).extract_frame(request)
    }
}

/// 一次執行所使用的外部能力組合
pub struct MediaToolkit {
    pub probe: Box<dyn ProbeService>,
    pub crop: Box<dyn CropService>,
    pub extraction: Box<dyn ExtractionService>,
}

impl MediaToolkit {
    pub fn new(
        probe: impl ProbeService + 'static,
        crop: impl CropService + 'static,
        extraction: impl ExtractionService + 'static,
    ) -> Self {
        Self {
            probe: Box::new(probe),
            crop: Box::new(crop),
            extraction: Box::new(extraction),
        }
    }

    /// 以系統上的 ffprobe/ffmpeg 實作
    #[must_use]
    pub fn ffmpeg() -> Self {
        Self::new(
            FfprobeService,
            FfmpegCropService::default(),
            FfmpegFrameService::default(),
        )
    }
}
