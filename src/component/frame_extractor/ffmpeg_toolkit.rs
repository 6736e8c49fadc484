use super::error::{CropDetectionError, ExtractionError, ProbeError};
use super::services::{CropService, ExtractionService, ProbeService, SampleWindow};
use super::types::{CropRect, FrameRequest, VideoDescriptor};
use crate::config::ImageFormat;
use crate::tools::{CropDetectCommand, FrameCaptureCommand, get_video_info};
use anyhow::Result;
use log::{debug, trace};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// ffprobe 探測
pub struct FfprobeService;

impl ProbeService for FfprobeService {
    fn probe(&self, path: &Path) -> Result<VideoDescriptor, ProbeError> {
        get_video_info(path)
            .map(|info| VideoDescriptor::from_info(path, info))
            .map_err(|e| ProbeError::new(format!("{e:#}")))
    }
}

/// ffmpeg cropdetect 黑邊偵測
pub struct FfmpegCropService {
    /// 分析用的 FPS，越低越快
    pub analyze_fps: f64,
    /// 亮度低於此值視為黑色
    pub limit: u32,
    /// 裁切寬高對齊的倍數
    pub round: u32,
}

impl Default for FfmpegCropService {
    fn default() -> Self {
        Self {
            analyze_fps: 2.0,
            limit: 24,
            round: 16,
        }
    }
}

impl CropService for FfmpegCropService {
    fn detect_crop(
        &self,
        path: &Path,
        window: SampleWindow,
    ) -> Result<Vec<CropRect>, CropDetectionError> {
        let command = CropDetectCommand::new(path, window.start, window.duration)
            .with_analyze_fps(self.analyze_fps)
            .with_thresholds(self.limit, self.round);

        debug!(
            "黑邊偵測: {} (start={:.2}s, duration={:.2}s)",
            path.display(),
            window.start,
            window.duration
        );

        let output = command.build_command().output().map_err(|e| {
            CropDetectionError::new(format!("無法執行 ffmpeg 黑邊偵測: {e}"))
        })?;

        // cropdetect 輸出在 stderr
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(CropDetectionError::new(format!(
                "ffmpeg 黑邊偵測失敗: {}",
                last_line(&stderr)
            )));
        }

        parse_cropdetect_output(&stderr).map_err(|e| CropDetectionError::new(e.to_string()))
    }
}

/// 解析 ffmpeg cropdetect 輸出
///
/// 格式: `[Parsed_cropdetect_1 @ 0x...] x1:0 x2:1919 ... crop=1920:800:0:140`
fn parse_cropdetect_output(output: &str) -> Result<Vec<CropRect>> {
    let crop_regex = Regex::new(r"crop=(\d+:\d+:\d+:\d+)")?;

    let candidates: Vec<CropRect> = output
        .lines()
        .filter_map(|line| crop_regex.captures(line))
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse::<CropRect>().ok())
        .collect();

    trace!("cropdetect 回報 {} 個候選", candidates.len());

    Ok(candidates)
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .map_or("未知錯誤", str::trim)
}

/// ffmpeg 單張擷取
pub struct FfmpegFrameService {
    /// JPEG 品質 (1-31，數字越小品質越高)
    pub jpeg_quality: u8,
    /// ffmpeg 執行檔
    pub program: PathBuf,
}

impl Default for FfmpegFrameService {
    fn default() -> Self {
        Self {
            jpeg_quality: 1,
            program: PathBuf::from("ffmpeg"),
        }
    }
}

impl ExtractionService for FfmpegFrameService {
    fn extract_frame(&self, request: &FrameRequest<'_>) -> Result<(), ExtractionError> {
        let mut command =
            FrameCaptureCommand::new(request.video_path, request.timestamp, &request.output_path)
                .with_program(&self.program);
        if let Some(crop) = request.crop {
            command = command.with_video_filter(crop.to_filter());
        }
        if request.format == ImageFormat::Jpg {
            command = command.with_jpeg_quality(self.jpeg_quality);
        }

        debug!(
            "擷取影格 {}: {} t={:.3}s",
            request.index,
            request.video_path.display(),
            request.timestamp
        );

        // 先移除上次執行留下的檔案，下方的存在檢查才有意義
        match fs::remove_file(command.destination_path()) {
            Ok(()) => trace!("移除舊的影格檔案: {}", command.destination_path().display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ExtractionError::new(
                    format!(
                        "無法移除舊的影格檔案 {}: {e}",
                        command.destination_path().display()
                    ),
                    request.timestamp,
                ));
            }
        }

        let output = command.build_command().output().map_err(|e| {
            ExtractionError::new(format!("無法執行 ffmpeg: {e}"), request.timestamp)
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::new(
                format!("ffmpeg 擷取失敗: {}", last_line(&stderr)),
                request.timestamp,
            ));
        }

        // seek 超過最後一個影格時 ffmpeg 仍會正常結束但不寫檔
        if !command.destination_path().exists() {
            return Err(ExtractionError::new(
                format!("影格檔案未建立: {}", command.destination_path().display()),
                request.timestamp,
            ));
        }

        Ok(())
    }
}
