use crate::config::ImageFormat;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 輸出資料夾配置
///
/// 每部影片一個資料夾：`<輸出根目錄>/<相對於輸入根目錄的上層路徑>/<檔名主體>`。
/// 同一資料夾內主體相同、副檔名不同的影片改用完整檔名（例如 `movie.mkv`）。
pub struct OutputLayout {
    input_root: PathBuf,
    output_root: PathBuf,
}

impl OutputLayout {
    #[must_use]
    pub fn new(input_root: &Path, output_root: &Path) -> Self {
        Self {
            input_root: input_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
        }
    }

    /// 依輸入順序回傳每部影片的輸出資料夾
    #[must_use]
    pub fn video_directories(&self, videos: &[PathBuf]) -> Vec<PathBuf> {
        let primary: Vec<PathBuf> = videos
            .iter()
            .map(|video| self.parent_directory(video).join(video_stem(video)))
            .collect();

        let mut occurrences: HashMap<&Path, usize> = HashMap::new();
        for dir in &primary {
            *occurrences.entry(dir.as_path()).or_default() += 1;
        }

        videos
            .iter()
            .zip(&primary)
            .map(|(video, dir)| {
                if occurrences[dir.as_path()] > 1 {
                    let file_name = video
                        .file_name()
                        .map_or_else(|| video_stem(video), |n| n.to_string_lossy().to_string());
                    self.parent_directory(video).join(file_name)
                } else {
                    dir.clone()
                }
            })
            .collect()
    }

    fn parent_directory(&self, video: &Path) -> PathBuf {
        let relative_parent = video
            .strip_prefix(&self.input_root)
            .ok()
            .and_then(Path::parent)
            .unwrap_or(Path::new(""));
        self.output_root.join(relative_parent)
    }
}

#[must_use]
pub fn video_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().to_string())
}

/// 影格檔名以序號區分，不使用時間點，偏移後重複的時間點也不會互相覆蓋
#[must_use]
pub fn frame_file_name(stem: &str, index: usize, format: ImageFormat) -> String {
    format!("{stem}_frame_{index:05}.{}", format.extension())
}
