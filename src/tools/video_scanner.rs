use crate::config::FileTypeTable;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 遞迴掃描影片檔案
///
/// 回傳依路徑排序的結果，作為穩定的探索順序。`exclude` 底下的檔案
/// （例如位於輸入資料夾內的輸出資料夾）不會列入。
pub fn scan_video_files(
    directory: &Path,
    file_type_table: &FileTypeTable,
    exclude: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let mut video_files: Vec<PathBuf> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| exclude.is_none_or(|excluded| entry.path() != excluded))
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| file_type_table.is_video_file(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    video_files.sort();
    Ok(video_files)
}
