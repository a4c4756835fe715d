//! HTTP endpoint health monitor
//!
//! 設定されたHTTPエンドポイントを一定間隔でプローブし、
//! ドメイン別の稼働率を集計・出力する。

#![warn(missing_docs)]

/// 共通定義（エラー型）
pub mod common;

/// 型定義
pub mod types;

/// エンドポイントプローブ
pub mod probe;

/// ドメイン別稼働率の集計
pub mod stats;

/// ポーリングスケジューラー
pub mod monitor;

/// レポート出力
pub mod report;

/// 設定管理（設定ファイル・環境変数ヘルパー）
pub mod config;

/// ロギング初期化ユーティリティ
pub mod logging;

/// CLIインターフェース
pub mod cli;

/// Shutdown controller (signal handling)
pub mod shutdown;

pub use common::error::{ConfigError, MonitorError, ProbeError};
pub use monitor::{PollingScheduler, SchedulerState};
pub use probe::ProbeExecutor;
pub use report::{Reporter, TextReporter};
pub use shutdown::ShutdownController;
pub use stats::{AvailabilityAggregator, AvailabilitySnapshot, DomainStats};
pub use types::{EndpointSpec, HttpMethod, ProbeResult};
