use crate::config::ExtractionConfig;
use rand::Rng;
use rand::seq::index;
use std::path::PathBuf;

/// 從探索到的影片中選出要處理的影片
///
/// - 未設定 `limit`：全部
/// - 設定 `limit` 且不隨機：依探索順序取前 `limit` 部
/// - 設定 `limit` 且隨機：不放回均勻抽取 `min(limit, n)` 部，保留探索順序
pub fn select<R: Rng + ?Sized>(
    discovered: Vec<PathBuf>,
    config: &ExtractionConfig,
    rng: &mut R,
) -> Vec<PathBuf> {
    let Some(limit) = config.limit else {
        return discovered;
    };
    let amount = limit.min(discovered.len());

    if !config.random_sample {
        let mut selected = discovered;
        selected.truncate(amount);
        return selected;
    }

    let mut chosen = vec![false; discovered.len()];
    for i in index::sample(rng, discovered.len(), amount) {
        chosen[i] = true;
    }

    discovered
        .into_iter()
        .zip(chosen)
        .filter_map(|(path, keep)| keep.then_some(path))
        .collect()
}
