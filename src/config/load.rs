use crate::config::types::{Config, ExtractionConfig, FileTypeTable};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// 編譯時嵌入的檔案類型設定（不需要外部檔案）
const FILE_TYPE_TABLE_JSON: &str = include_str!("../data/file_type_table.json");

impl Config {
    /// 載入設定；未指定設定檔時使用內建預設值
    pub fn new(settings_path: Option<&Path>) -> Result<Self> {
        let file_type_table = Self::load_embedded_file_type_table()?;
        let extraction = match settings_path {
            Some(path) => Self::load_settings(path)?,
            None => ExtractionConfig::default(),
        };

        Ok(Self {
            file_type_table,
            extraction,
        })
    }

    fn load_settings(path: &Path) -> Result<ExtractionConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("無法讀取設定檔: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("無法解析設定檔: {}", path.display()))
    }

    /// 從編譯時嵌入的 JSON 載入檔案類型表
    fn load_embedded_file_type_table() -> Result<FileTypeTable> {
        serde_json::from_str(FILE_TYPE_TABLE_JSON).context("無法解析嵌入的檔案類型設定")
    }
}
