//! 擷取時間點規劃
//!
//! 策略：
//! 1. 扣除開頭與結尾後得到可用區間 `[start, end)`，區間為空時回傳空計畫
//! 2. 只取一張時取區間中點
//! 3. 否則把區間均分為 N 段，每段取中點（避開區間邊界）
//! 4. 有設定偏移時，每個時間點各自加上 `[-J, +J]` 的隨機整數秒，再夾回區間內
//! 5. 依時間排序；偏移後重複的時間點仍保留，輸出檔名以序號區分

use crate::config::ExtractionConfig;
use rand::Rng;

/// 夾回區間時與區間結尾保留的距離（秒），確保時間點嚴格小於結尾
const END_GUARD_SECONDS: f64 = 0.001;

/// 扣除開頭與結尾秒數後的可用區間
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsableWindow {
    pub start: f64,
    pub end: f64,
}

impl UsableWindow {
    /// 區間為空（或長度無效）時回傳 `None`
    #[must_use]
    pub fn new(duration: f64, config: &ExtractionConfig) -> Option<Self> {
        let start = f64::from(config.skip_start_seconds);
        let end = duration - f64::from(config.skip_end_seconds);
        (duration.is_finite() && end > start).then_some(Self { start, end })
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    #[must_use]
    pub fn midpoint(&self) -> f64 {
        f64::midpoint(self.start, self.end)
    }

    fn clamp(&self, timestamp: f64) -> f64 {
        timestamp.min(self.end - END_GUARD_SECONDS).max(self.start)
    }
}

/// 依時間排序的擷取時間點（秒）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimestampPlan {
    timestamps: Vec<f64>,
}

impl TimestampPlan {
    #[must_use]
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// 計算一部影片的擷取時間點
///
/// 偏移為 0 時不會從 `rng` 取值，相同輸入永遠得到相同結果。
pub fn plan<R: Rng + ?Sized>(
    duration: f64,
    config: &ExtractionConfig,
    rng: &mut R,
) -> TimestampPlan {
    let Some(window) = UsableWindow::new(duration, config) else {
        return TimestampPlan::default();
    };

    let mut timestamps = candidate_timestamps(window, config.frames_per_video);

    let jitter = i64::from(config.interval_jitter_seconds);
    if jitter > 0 {
        for timestamp in &mut timestamps {
            let offset = rng.gen_range(-jitter..=jitter);
            *timestamp = window.clamp(*timestamp + offset as f64);
        }
    }

    timestamps.sort_by(f64::total_cmp);
    TimestampPlan { timestamps }
}

/// 未偏移的候選時間點
fn candidate_timestamps(window: UsableWindow, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![window.midpoint()],
        _ => {
            let step = window.length() / count as f64;
            (0..count)
                .map(|i| window.start + step * (i as f64 + 0.5))
                .collect()
        }
    }
}
