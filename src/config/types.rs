use anyhow::{Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl FileTypeTable {
    /// 副檔名比對不分大小寫，表內的副檔名帶有前導的 `.`
    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.video_file
                    .iter()
                    .any(|known| known.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

/// 輸出圖片格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpg,
    Png,
}

impl ImageFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// 擷取設定
///
/// 可由 JSON 設定檔載入（缺少的欄位使用預設值），再由命令列參數覆寫。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    /// 每部影片擷取的張數
    pub frames_per_video: usize,
    /// 跳過影片開頭的秒數
    pub skip_start_seconds: u32,
    /// 跳過影片結尾的秒數
    pub skip_end_seconds: u32,
    /// 每個時間點隨機偏移的最大秒數，0 代表不偏移
    pub interval_jitter_seconds: u32,
    /// 是否偵測並裁切黑邊
    pub crop_enabled: bool,
    /// 同時處理的影片數上限
    pub max_workers: usize,
    /// 最多處理幾部影片
    pub limit: Option<usize>,
    /// 搭配 `limit` 時隨機抽選影片
    pub random_sample: bool,
    /// 隨機種子，未指定時每次執行隨機產生
    pub seed: Option<u64>,
    pub image_format: ImageFormat,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            frames_per_video: 100,
            skip_start_seconds: 6,
            skip_end_seconds: 60,
            interval_jitter_seconds: 0,
            crop_enabled: false,
            max_workers: 4,
            limit: None,
            random_sample: false,
            seed: None,
            image_format: ImageFormat::Jpg,
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frames_per_video == 0 {
            bail!("frames_per_video 必須至少為 1");
        }
        if self.max_workers == 0 {
            bail!("max_workers 必須至少為 1");
        }
        if self.limit == Some(0) {
            bail!("limit 必須至少為 1");
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub extraction: ExtractionConfig,
}
