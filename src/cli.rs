use crate::config::{ExtractionConfig, ImageFormat};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// 命令列參數
///
/// 未指定的選項沿用設定檔或內建預設值。
#[derive(Debug, Parser)]
#[command(
    name = "video_frame_sampler",
    version,
    about = "從資料夾中的每部影片擷取靜態影格"
)]
pub struct Cli {
    /// 影片所在的資料夾（遞迴掃描）
    pub input_dir: PathBuf,

    /// 影格輸出根目錄
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// 每部影片擷取的張數
    #[arg(long)]
    pub frames_per_video: Option<usize>,

    /// 同時處理的影片數上限
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// 跳過影片開頭的秒數
    #[arg(long)]
    pub skip_start: Option<u32>,

    /// 跳過影片結尾的秒數
    #[arg(long)]
    pub skip_end: Option<u32>,

    /// 最多處理幾部影片
    #[arg(long)]
    pub limit: Option<usize>,

    /// 搭配 --limit 隨機抽選影片
    #[arg(long)]
    pub random_sample: bool,

    /// 偵測並裁切黑邊
    #[arg(long)]
    pub crop: bool,

    /// 每個時間點在 ±N 秒內隨機偏移
    #[arg(long, value_name = "N")]
    pub interval_jitter: Option<u32>,

    /// 亂數種子，用於重現選片與偏移結果
    #[arg(long)]
    pub seed: Option<u64>,

    /// 輸出圖片格式
    #[arg(long, value_enum)]
    pub format: Option<ImageFormat>,

    /// JSON 設定檔
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 將執行結果寫入 JSON 報告
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// 顯示更多日誌（-v 為 debug，-vv 為 trace）
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// 以命令列參數覆寫設定；布林旗標只能開啟，不會關閉設定檔中的值
    pub fn apply_overrides(&self, config: &mut ExtractionConfig) {
        if let Some(frames) = self.frames_per_video {
            config.frames_per_video = frames;
        }
        if let Some(workers) = self.max_workers {
            config.max_workers = workers;
        }
        if let Some(seconds) = self.skip_start {
            config.skip_start_seconds = seconds;
        }
        if let Some(seconds) = self.skip_end {
            config.skip_end_seconds = seconds;
        }
        if let Some(seconds) = self.interval_jitter {
            config.interval_jitter_seconds = seconds;
        }
        if self.limit.is_some() {
            config.limit = self.limit;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(format) = self.format {
            config.image_format = format;
        }
        config.random_sample |= self.random_sample;
        config.crop_enabled |= self.crop;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_keeps_defaults() {
        let cli = Cli::try_parse_from(["video_frame_sampler", "videos", "-o", "frames"]).unwrap();
        assert_eq!(cli.input_dir, PathBuf::from("videos"));
        assert_eq!(cli.output_dir, PathBuf::from("frames"));
        assert_eq!(cli.verbose, 0);

        let mut config = ExtractionConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, ExtractionConfig::default());
    }

    #[test]
    fn test_parse_all_options() {
        let cli = Cli::try_parse_from([
            "video_frame_sampler",
            "videos",
            "--output-dir",
            "frames",
            "--frames-per-video",
            "12",
            "--max-workers",
            "2",
            "--skip-start",
            "0",
            "--skip-end",
            "5",
            "--limit",
            "3",
            "--random-sample",
            "--crop",
            "--interval-jitter",
            "2",
            "--seed",
            "42",
            "--format",
            "png",
            "--report",
            "report.json",
            "-vv",
        ])
        .unwrap();

        let mut config = ExtractionConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(
            config,
            ExtractionConfig {
                frames_per_video: 12,
                skip_start_seconds: 0,
                skip_end_seconds: 5,
                interval_jitter_seconds: 2,
                crop_enabled: true,
                max_workers: 2,
                limit: Some(3),
                random_sample: true,
                seed: Some(42),
                image_format: ImageFormat::Png,
            }
        );
        assert_eq!(cli.report, Some(PathBuf::from("report.json")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_flags_do_not_disable_settings_file_values() {
        let cli = Cli::try_parse_from(["video_frame_sampler", "videos", "-o", "frames"]).unwrap();
        let mut config = ExtractionConfig {
            crop_enabled: true,
            random_sample: true,
            limit: Some(4),
            ..ExtractionConfig::default()
        };
        cli.apply_overrides(&mut config);

        assert!(config.crop_enabled);
        assert!(config.random_sample);
        assert_eq!(config.limit, Some(4));
    }

    #[test]
    fn test_output_dir_is_required() {
        assert!(Cli::try_parse_from(["video_frame_sampler", "videos"]).is_err());
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(
            Cli::try_parse_from(["video_frame_sampler", "videos", "-o", "f", "--format", "gif"])
                .is_err()
        );
    }
}
