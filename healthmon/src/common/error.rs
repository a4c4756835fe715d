//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! プロセスを終了させてよいのは`ConfigError`と`MonitorError`のみ。
//! `ProbeError`はスケジューラー内でDOWN判定に吸収される。

use std::path::PathBuf;
use thiserror::Error;

/// 設定ファイル読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// ファイルを開けない・読めない
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// 設定ファイルパス
        path: PathBuf,
        /// 元のI/Oエラー
        #[source]
        source: std::io::Error,
    },

    /// YAMLとして解釈できない
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// 設定ファイルパス
        path: PathBuf,
        /// 元のパースエラー
        #[source]
        source: serde_yaml::Error,
    },

    /// エンドポイントが1件も定義されていない
    #[error("Config file {0} does not define any endpoints")]
    Empty(PathBuf),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// 単一プローブのエラー
#[derive(Debug, Error)]
pub enum ProbeError {
    /// GET/POST/PUT/DELETE 以外のメソッド
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// 接続失敗・DNS失敗・タイムアウト・TLSエラー
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// 監視ループのエラー
#[derive(Debug, Error)]
pub enum MonitorError {
    /// 出力先（標準出力など）への書き込み失敗
    #[error("Failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::Empty(PathBuf::from("endpoints.yaml"));
        assert_eq!(
            error.to_string(),
            "Config file endpoints.yaml does not define any endpoints"
        );
    }

    #[test]
    fn test_config_error_io_keeps_source() {
        let error = ConfigError::Io {
            path: PathBuf::from("missing.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(error.to_string().contains("missing.yaml"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_unsupported_method_display() {
        let error = ProbeError::UnsupportedMethod("PATCH".to_string());
        assert_eq!(error.to_string(), "Unsupported HTTP method: PATCH");
        assert!(std::error::Error::source(&error).is_none());
    }

    #[test]
    fn test_monitor_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let error: MonitorError = io.into();
        assert!(matches!(error, MonitorError::Output(_)));
        assert!(error.to_string().contains("closed"));
    }
}
