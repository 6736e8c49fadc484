use super::services::{CropService, SampleWindow};
use super::timestamp_planner::UsableWindow;
use super::types::{CropRect, VideoDescriptor};
use crate::config::ExtractionConfig;
use log::{debug, info, warn};
use std::collections::HashMap;

/// 黑邊偵測取樣長度上限（秒）
pub const CROP_SAMPLE_SECONDS: f64 = 30.0;

/// 每部影片只偵測一次黑邊，結果供該影片所有擷取共用
pub struct CropDetector<'a> {
    service: &'a dyn CropService,
}

impl<'a> CropDetector<'a> {
    pub const fn new(service: &'a dyn CropService) -> Self {
        Self { service }
    }

    /// 回傳 `None` 代表不裁切；偵測失敗也降級為不裁切
    #[must_use]
    pub fn detect(&self, video: &VideoDescriptor, config: &ExtractionConfig) -> Option<CropRect> {
        if !config.crop_enabled {
            return None;
        }

        let window = sample_window(video, config);
        let candidates = match self.service.detect_crop(&video.path, window) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("黑邊偵測失敗，改為不裁切 {}: {e}", video.path.display());
                return None;
            }
        };

        let chosen = choose_crop(&candidates, video.width, video.height);
        match chosen {
            Some(rect) => info!(
                "偵測到黑邊 {}: {} ({} 個候選)",
                video.path.display(),
                rect.to_filter(),
                candidates.len()
            ),
            None => debug!("未偵測到黑邊: {}", video.path.display()),
        }
        chosen
    }
}

/// 取樣區間：置中於可用區間，長度不超過 [`CROP_SAMPLE_SECONDS`]
///
/// 可用區間為空時改用整部影片。
#[must_use]
pub fn sample_window(video: &VideoDescriptor, config: &ExtractionConfig) -> SampleWindow {
    let (start, end) = UsableWindow::new(video.duration_seconds, config)
        .map_or((0.0, video.duration_seconds), |w| (w.start, w.end));

    let duration = (end - start).min(CROP_SAMPLE_SECONDS);
    let center = f64::midpoint(start, end);

    SampleWindow {
        start: (center - duration / 2.0).max(0.0),
        duration,
    }
}

/// 從候選中選出出現次數最多的裁切區域
///
/// 超出畫面或寬高為零的候選會被忽略。次數相同時選面積最大（裁得最少）者，
/// 再依偏移量與寬度決定，確保結果不受候選順序影響。選中整個畫面時回傳 `None`。
#[must_use]
pub fn choose_crop(candidates: &[CropRect], width: u32, height: u32) -> Option<CropRect> {
    let mut counts: HashMap<CropRect, usize> = HashMap::new();
    for candidate in candidates.iter().filter(|c| c.fits_within(width, height)) {
        *counts.entry(*candidate).or_default() += 1;
    }

    let (chosen, _) = counts.into_iter().max_by(|(a, count_a), (b, count_b)| {
        count_a
            .cmp(count_b)
            .then_with(|| a.area().cmp(&b.area()))
            .then_with(|| b.x_offset.cmp(&a.x_offset))
            .then_with(|| b.y_offset.cmp(&a.y_offset))
            .then_with(|| a.width.cmp(&b.width))
    })?;

    (!chosen.is_full_frame(width, height)).then_some(chosen)
}
