//! 測試用的假外部能力

use super::error::{CropDetectionError, ExtractionError, ProbeError};
use super::services::{CropService, ExtractionService, MediaToolkit, ProbeService, SampleWindow};
use super::types::{CropRect, FrameRequest, VideoDescriptor};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub struct FakeProbe {
    pub duration_seconds: f64,
    pub failing: HashSet<PathBuf>,
    pub panicking: HashSet<PathBuf>,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl FakeProbe {
    pub fn new(duration_seconds: f64) -> Self {
        Self {
            duration_seconds,
            failing: HashSet::new(),
            panicking: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProbeService for FakeProbe {
    fn probe(&self, path: &Path) -> Result<VideoDescriptor, ProbeError> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        assert!(!self.panicking.contains(path), "探測時發生 panic");
        if self.failing.contains(path) {
            return Err(ProbeError::new("moov atom not found"));
        }
        Ok(VideoDescriptor {
            path: path.to_path_buf(),
            duration_seconds: self.duration_seconds,
            width: 1920,
            height: 1080,
        })
    }
}

pub struct FakeCrop {
    pub response: Result<Vec<CropRect>, CropDetectionError>,
    pub calls: AtomicUsize,
}

impl FakeCrop {
    pub fn returning(candidates: Vec<CropRect>) -> Self {
        Self {
            response: Ok(candidates),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: Err(CropDetectionError::new("cropdetect 失敗")),
            calls: AtomicUsize::new(0),
        }
    }
}

impl CropService for FakeCrop {
    fn detect_crop(
        &self,
        _path: &Path,
        _window: SampleWindow,
    ) -> Result<Vec<CropRect>, CropDetectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub video_path: PathBuf,
    pub index: usize,
    pub timestamp: f64,
    pub crop: Option<CropRect>,
    pub output_path: PathBuf,
}

/// 記錄每次擷取並追蹤同時執行的數量
#[derive(Default)]
pub struct FakeExtraction {
    /// 這些序號的擷取會失敗
    pub failing_indices: HashSet<usize>,
    pub delay: Duration,
    /// 完成指定次數的擷取後設定中斷信號
    pub trip_after: Option<(usize, Arc<AtomicBool>)>,
    pub requests: Mutex<Vec<RecordedRequest>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeExtraction {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl ExtractionService for FakeExtraction {
    fn extract_frame(&self, request: &FrameRequest<'_>) -> Result<(), ExtractionError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        let completed = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(RecordedRequest {
                video_path: request.video_path.to_path_buf(),
                index: request.index,
                timestamp: request.timestamp,
                crop: request.crop,
                output_path: request.output_path.clone(),
            });
            requests.len()
        };

        if let Some((after, signal)) = &self.trip_after {
            if completed >= *after {
                signal.store(true, Ordering::SeqCst);
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_indices.contains(&request.index) {
            return Err(ExtractionError::new("decode error", request.timestamp));
        }
        Ok(())
    }
}

pub fn toolkit(
    probe: &Arc<FakeProbe>,
    crop: &Arc<FakeCrop>,
    extraction: &Arc<FakeExtraction>,
) -> MediaToolkit {
    MediaToolkit::new(Arc::clone(probe), Arc::clone(crop), Arc::clone(extraction))
}
