use std::path::{Path, PathBuf};
use std::process::Command;

/// 兩段式 seek 的前置緩衝時間（秒）
const SEEK_MARGIN: f64 = 2.0;

/// 單張影格擷取命令
///
/// 兩段式 seek：
/// 1. `-ss` 在 `-i` 前：快速跳轉到最近的關鍵幀
/// 2. `-ss` 在 `-i` 後：精準解碼到目標時間點
pub struct FrameCaptureCommand {
    source_path: PathBuf,
    timestamp: f64,
    destination_path: PathBuf,
    video_filter: Option<String>,
    jpeg_quality: Option<u8>,
    program: PathBuf,
}

impl FrameCaptureCommand {
    #[must_use]
    pub fn new(source_path: &Path, timestamp: f64, destination_path: &Path) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            timestamp: timestamp.max(0.0),
            destination_path: destination_path.to_path_buf(),
            video_filter: None,
            jpeg_quality: None,
            program: PathBuf::from("ffmpeg"),
        }
    }

    /// 指定 ffmpeg 執行檔，預設從 PATH 尋找
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    #[must_use]
    pub fn with_video_filter(mut self, filter: impl Into<String>) -> Self {
        self.video_filter = Some(filter.into());
        self
    }

    /// JPEG 品質 (1-31，數字越小品質越高)
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = Some(quality.clamp(1, 31));
        self
    }

    #[must_use]
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let t0 = (self.timestamp - SEEK_MARGIN).max(0.0);
        let delta = self.timestamp - t0;

        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
        ];

        if t0 > 0.0 {
            args.push("-ss".to_string());
            args.push(format!("{t0:.3}"));
        }

        args.push("-i".to_string());
        args.push(self.source_path.to_string_lossy().to_string());

        if delta > 0.0 {
            args.push("-ss".to_string());
            args.push(format!("{delta:.3}"));
        }

        args.extend([
            "-frames:v".to_string(),
            "1".to_string(),
            "-an".to_string(),
            "-sn".to_string(),
            "-dn".to_string(),
        ]);

        if let Some(filter) = &self.video_filter {
            args.push("-vf".to_string());
            args.push(filter.clone());
        }

        if let Some(quality) = self.jpeg_quality {
            args.push("-q:v".to_string());
            args.push(quality.to_string());
        }

        args.push("-y".to_string());
        args.push(self.destination_path.to_string_lossy().to_string());
        args
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args());
        cmd
    }
}

/// 黑邊偵測命令，只分析影片中的一段取樣區間
pub struct CropDetectCommand {
    source_path: PathBuf,
    start: f64,
    duration: f64,
    analyze_fps: f64,
    limit: u32,
    round: u32,
}

impl CropDetectCommand {
    #[must_use]
    pub fn new(source_path: &Path, start: f64, duration: f64) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            start: start.max(0.0),
            duration,
            analyze_fps: 2.0,
            limit: 24,
            round: 16,
        }
    }

    #[must_use]
    pub const fn with_analyze_fps(mut self, analyze_fps: f64) -> Self {
        self.analyze_fps = analyze_fps;
        self
    }

    /// `limit`：亮度低於此值視為黑色；`round`：寬高對齊的倍數
    #[must_use]
    pub const fn with_thresholds(mut self, limit: u32, round: u32) -> Self {
        self.limit = limit;
        self.round = round;
        self
    }

    /// 每個分析影格各自回報裁切範圍 (reset=1)，不與先前影格累積聯集
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let filter = format!(
            "fps={},cropdetect={}:{}:1",
            self.analyze_fps, self.limit, self.round
        );

        let mut args = vec!["-hide_banner".to_string(), "-nostdin".to_string()];
        if self.start > 0.0 {
            args.push("-ss".to_string());
            args.push(format!("{:.3}", self.start));
        }
        args.extend([
            "-i".to_string(),
            self.source_path.to_string_lossy().to_string(),
            "-t".to_string(),
            format!("{:.3}", self.duration),
            "-an".to_string(),
            "-sn".to_string(),
            "-dn".to_string(),
            "-threads".to_string(),
            "1".to_string(),
            "-vf".to_string(),
            filter,
            "-f".to_string(),
            "null".to_string(),
            "-".to_string(),
        ]);
        args
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(self.args());
        cmd
    }
}
