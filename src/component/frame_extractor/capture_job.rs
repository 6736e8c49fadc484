use super::crop_detector::CropDetector;
use super::error::{ErrorKind, ErrorRecord};
use super::output_layout::{frame_file_name, video_stem};
use super::services::MediaToolkit;
use super::timestamp_planner::plan;
use super::types::{ExtractionResult, FrameRequest};
use crate::config::ExtractionConfig;
use crate::tools::ensure_directory_exists;
use log::{debug, info, warn};
use rand::Rng;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// 單一影片的擷取工作
///
/// 探測 → 黑邊偵測 → 規劃時間點 → 逐一擷取。所有錯誤都在此轉為
/// [`ExtractionResult`]，單張失敗不會中止其他時間點。
pub struct FrameCaptureJob<'a> {
    toolkit: &'a MediaToolkit,
    config: &'a ExtractionConfig,
    shutdown_signal: &'a AtomicBool,
}

impl<'a> FrameCaptureJob<'a> {
    pub const fn new(
        toolkit: &'a MediaToolkit,
        config: &'a ExtractionConfig,
        shutdown_signal: &'a AtomicBool,
    ) -> Self {
        Self {
            toolkit,
            config,
            shutdown_signal,
        }
    }

    pub fn run<R: Rng + ?Sized>(
        &self,
        video_path: &Path,
        output_dir: &Path,
        rng: &mut R,
    ) -> ExtractionResult {
        debug!("處理影片: {}", video_path.display());

        let video = match self.toolkit.probe.probe(video_path) {
            Ok(video) => video,
            Err(e) => {
                let record = ErrorRecord::new(
                    ErrorKind::Probe,
                    video_path,
                    format!("無法讀取影片資訊: {e}"),
                );
                return ExtractionResult::failed(video_path, output_dir, record);
            }
        };

        debug!(
            "影片資訊 {}: {:.1}s, {}x{}",
            video_path.display(),
            video.duration_seconds,
            video.width,
            video.height
        );

        let crop = CropDetector::new(self.toolkit.crop.as_ref()).detect(&video, self.config);

        let plan = plan(video.duration_seconds, self.config, rng);
        if plan.is_empty() {
            let record = ErrorRecord::new(
                ErrorKind::Planning,
                video_path,
                format!(
                    "影片長度 {:.1}s 不足以跳過開頭 {}s 與結尾 {}s",
                    video.duration_seconds,
                    self.config.skip_start_seconds,
                    self.config.skip_end_seconds
                ),
            );
            return ExtractionResult::failed(video_path, output_dir, record);
        }

        if let Err(e) = ensure_directory_exists(output_dir) {
            let record = ErrorRecord::new(ErrorKind::Output, video_path, format!("{e:#}"));
            return ExtractionResult::failed(video_path, output_dir, record);
        }

        let stem = video_stem(video_path);
        let mut frames_written = 0;
        let mut frame_errors = Vec::new();
        let mut interruption = None;

        for (index, &timestamp) in plan.timestamps().iter().enumerate() {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!(
                    "收到中斷信號，停止擷取 {} ({index}/{})",
                    video_path.display(),
                    plan.len()
                );
                interruption = Some(ErrorRecord::new(
                    ErrorKind::Cancelled,
                    video_path,
                    format!("已擷取 {index}/{} 個時間點後中斷", plan.len()),
                ));
                break;
            }

            let format = self.config.image_format;
            let request = FrameRequest {
                video_path,
                index,
                timestamp,
                crop,
                output_path: output_dir.join(frame_file_name(&stem, index, format)),
                format,
            };

            match self.toolkit.extraction.extract_frame(&request) {
                Ok(()) => frames_written += 1,
                Err(e) => {
                    warn!("擷取失敗 [{index}] {}: {e}", video_path.display());
                    frame_errors.push(ErrorRecord::from((video_path, &e)));
                }
            }
        }

        let result = ExtractionResult::from_frames(
            video_path,
            output_dir,
            plan.len(),
            frames_written,
            frame_errors,
            interruption,
        );

        info!(
            "影片完成 {}: {}/{} 張",
            video_path.display(),
            result.frames_written,
            result.frames_planned
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::frame_extractor::fakes::{FakeCrop, FakeExtraction, FakeProbe, toolkit};
    use crate::component::frame_extractor::types::{CropRect, ExtractionStatus};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    const LETTERBOX: CropRect = CropRect {
        x_offset: 0,
        y_offset: 140,
        width: 1920,
        height: 800,
    };

    fn config(frames: usize) -> ExtractionConfig {
        ExtractionConfig {
            frames_per_video: frames,
            skip_start_seconds: 0,
            skip_end_seconds: 0,
            ..ExtractionConfig::default()
        }
    }

    struct Fixture {
        probe: Arc<FakeProbe>,
        crop: Arc<FakeCrop>,
        extraction: Arc<FakeExtraction>,
        temp_dir: TempDir,
    }

    impl Fixture {
        fn new(extraction: FakeExtraction) -> Self {
            Self {
                probe: Arc::new(FakeProbe::new(100.0)),
                crop: Arc::new(FakeCrop::returning(vec![LETTERBOX; 3])),
                extraction: Arc::new(extraction),
                temp_dir: TempDir::new().unwrap(),
            }
        }

        fn run(&self, config: &ExtractionConfig, shutdown: &AtomicBool) -> ExtractionResult {
            let toolkit = toolkit(&self.probe, &self.crop, &self.extraction);
            let job = FrameCaptureJob::new(&toolkit, config, shutdown);
            job.run(
                &PathBuf::from("/videos/movie.mkv"),
                &self.output_dir(),
                &mut StdRng::seed_from_u64(0),
            )
        }

        fn output_dir(&self) -> PathBuf {
            self.temp_dir.path().join("movie")
        }
    }

    #[test]
    fn test_all_frames_succeed() {
        let fixture = Fixture::new(FakeExtraction::default());
        let result = fixture.run(&config(5), &AtomicBool::new(false));

        assert_eq!(result.status, ExtractionStatus::Success);
        assert_eq!(result.frames_planned, 5);
        assert_eq!(result.frames_written, 5);
        assert!(result.error.is_none());
        assert!(fixture.output_dir().is_dir());

        let requests = fixture.extraction.requests();
        let timestamps: Vec<f64> = requests.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![10.0, 30.0, 50.0, 70.0, 90.0]);
        assert_eq!(
            requests[3].output_path,
            fixture.output_dir().join("movie_frame_00003.jpg")
        );
        assert!(requests.iter().all(|r| r.crop.is_none()));
    }

    #[test]
    fn test_single_extraction_error_is_partial_success() {
        let fixture = Fixture::new(FakeExtraction {
            failing_indices: HashSet::from([2]),
            ..FakeExtraction::default()
        });
        let result = fixture.run(&config(5), &AtomicBool::new(false));

        assert_eq!(result.status, ExtractionStatus::PartialSuccess);
        assert_eq!(result.frames_written, 4);
        assert_eq!(fixture.extraction.requests().len(), 5);
        assert_eq!(result.frame_errors.len(), 1);

        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::Extraction);
        assert_eq!(error.timestamp, Some(50.0));
    }

    #[test]
    fn test_every_extraction_failing_is_failed() {
        let fixture = Fixture::new(FakeExtraction {
            failing_indices: (0..3).collect(),
            ..FakeExtraction::default()
        });
        let result = fixture.run(&config(3), &AtomicBool::new(false));

        assert_eq!(result.status, ExtractionStatus::Failed);
        assert_eq!(result.frames_written, 0);
        assert_eq!(result.frame_errors.len(), 3);
    }

    #[test]
    fn test_probe_failure_stops_before_any_work() {
        let mut probe = FakeProbe::new(100.0);
        probe.failing.insert(PathBuf::from("/videos/movie.mkv"));
        let mut fixture = Fixture::new(FakeExtraction::default());
        fixture.probe = Arc::new(probe);

        let crop_config = ExtractionConfig {
            crop_enabled: true,
            ..config(5)
        };
        let result = fixture.run(&crop_config, &AtomicBool::new(false));

        assert_eq!(result.status, ExtractionStatus::Failed);
        assert_eq!(result.error.unwrap().kind, ErrorKind::Probe);
        assert_eq!(fixture.crop.calls.load(Ordering::SeqCst), 0);
        assert!(fixture.extraction.requests().is_empty());
        assert!(!fixture.output_dir().exists());
    }

    #[test]
    fn test_degenerate_window_is_planning_failure() {
        let fixture = Fixture::new(FakeExtraction::default());
        let skip_config = ExtractionConfig {
            skip_start_seconds: 60,
            skip_end_seconds: 40,
            ..config(5)
        };
        let result = fixture.run(&skip_config, &AtomicBool::new(false));

        assert_eq!(result.status, ExtractionStatus::Failed);
        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::Planning);
        assert_eq!(error.video_path, PathBuf::from("/videos/movie.mkv"));
        assert!(fixture.extraction.requests().is_empty());
    }

    #[test]
    fn test_crop_detected_once_and_applied_to_every_frame() {
        let fixture = Fixture::new(FakeExtraction::default());
        let crop_config = ExtractionConfig {
            crop_enabled: true,
            ..config(4)
        };
        let result = fixture.run(&crop_config, &AtomicBool::new(false));

        assert_eq!(result.status, ExtractionStatus::Success);
        assert_eq!(fixture.crop.calls.load(Ordering::SeqCst), 1);
        assert!(
            fixture
                .extraction
                .requests()
                .iter()
                .all(|r| r.crop == Some(LETTERBOX))
        );
    }

    #[test]
    fn test_crop_failure_does_not_fail_video() {
        let mut fixture = Fixture::new(FakeExtraction::default());
        fixture.crop = Arc::new(FakeCrop::failing());
        let crop_config = ExtractionConfig {
            crop_enabled: true,
            ..config(2)
        };
        let result = fixture.run(&crop_config, &AtomicBool::new(false));

        assert_eq!(result.status, ExtractionStatus::Success);
        assert!(fixture.extraction.requests().iter().all(|r| r.crop.is_none()));
    }

    #[test]
    fn test_shutdown_before_start_extracts_nothing() {
        let fixture = Fixture::new(FakeExtraction::default());
        let result = fixture.run(&config(5), &AtomicBool::new(true));

        assert_eq!(result.status, ExtractionStatus::Failed);
        assert_eq!(result.error.unwrap().kind, ErrorKind::Cancelled);
        assert!(fixture.extraction.requests().is_empty());
    }

    #[test]
    fn test_shutdown_mid_video_reports_partial_success() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let fixture = Fixture::new(FakeExtraction {
            trip_after: Some((2, Arc::clone(&shutdown))),
            ..FakeExtraction::default()
        });
        let result = fixture.run(&config(5), &shutdown);

        assert_eq!(result.status, ExtractionStatus::PartialSuccess);
        assert_eq!(result.frames_written, 2);
        assert_eq!(result.frames_planned, 5);
        assert_eq!(result.error.unwrap().kind, ErrorKind::Cancelled);
    }

    #[test]
    fn test_duplicate_timestamps_get_distinct_files() {
        let fixture = Fixture::new(FakeExtraction::default());
        // 可用區間只有 1 秒，大幅偏移後多數時間點會被夾到同一秒
        let jitter_config = ExtractionConfig {
            skip_start_seconds: 50,
            skip_end_seconds: 49,
            interval_jitter_seconds: 20,
            ..config(6)
        };
        let result = fixture.run(&jitter_config, &AtomicBool::new(false));

        assert_eq!(result.frames_written, 6);
        let paths: HashSet<PathBuf> = fixture
            .extraction
            .requests()
            .into_iter()
            .map(|r| r.output_path)
            .collect();
        assert_eq!(paths.len(), 6);
    }
}
