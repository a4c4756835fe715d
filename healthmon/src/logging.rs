//! ロギング初期化
//!
//! 監視レポートは標準出力に出すため、ログは標準エラー出力に書き出す。
//! `RUST_LOG` が設定されていればそれを優先し、なければ
//! `HEALTHMON_LOG_LEVEL`（デフォルト: info）を使用する。

use crate::config::get_log_level;
use tracing_subscriber::EnvFilter;

/// ログフィルタを構築
pub fn build_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = get_log_level();
        EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// tracing サブスクライバを初期化
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}
