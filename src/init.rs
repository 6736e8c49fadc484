use env_logger::Env;

/// 初始化日誌
///
/// 預設等級為 `info`，`-v` 為 `debug`，`-vv` 以上為 `trace`。設定 `RUST_LOG` 時以其為準。
pub fn init(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // 重複初始化（例如測試中）時忽略
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init();
}
