//! Configuration management
//!
//! Loads the YAML endpoint list and provides helpers for reading
//! `HEALTHMON_*` environment variables.

use crate::common::error::ConfigError;
use crate::types::EndpointSpec;
use std::path::Path;
use tracing::{info, warn};

/// Get an environment variable, treating empty values as unset
///
/// # Example
/// ```
/// use healthmon::config::get_env;
///
/// let level = get_env("HEALTHMON_LOG_LEVEL");
/// ```
pub fn get_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value
pub fn get_env_or(name: &str, default: &str) -> String {
    get_env(name).unwrap_or_else(|| default.to_string())
}

/// ログレベルを取得
///
/// 環境変数 `HEALTHMON_LOG_LEVEL` から取得し、未設定の場合は `info` を返す。
pub fn get_log_level() -> String {
    get_env_or("HEALTHMON_LOG_LEVEL", "info")
}

/// 設定ファイルからエンドポイント一覧を読み込む
///
/// ファイルはエンドポイント定義のYAMLシーケンス。読み込めない・解釈
/// できない・空の場合は[`ConfigError`]を返す。サポート外のメソッドは
/// エラーにせず警告のみ出力する（プローブ時にDOWNとして扱われる）。
pub fn load_endpoints(path: impl AsRef<Path>) -> Result<Vec<EndpointSpec>, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let endpoints = parse_endpoints(&raw).map_err(|err| match err {
        ParseFailure::Yaml(source) => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Empty => ConfigError::Empty(path.to_path_buf()),
        ParseFailure::Invalid(message) => ConfigError::Validation(message),
    })?;

    info!(
        path = %path.display(),
        count = endpoints.len(),
        "Loaded endpoint configuration"
    );
    Ok(endpoints)
}

enum ParseFailure {
    Yaml(serde_yaml::Error),
    Empty,
    Invalid(String),
}

fn parse_endpoints(raw: &str) -> Result<Vec<EndpointSpec>, ParseFailure> {
    // 空ファイルはYAMLとしてはnullになるため、先に弾く
    if raw.trim().is_empty() {
        return Err(ParseFailure::Empty);
    }
    let endpoints: Vec<EndpointSpec> = serde_yaml::from_str(raw).map_err(ParseFailure::Yaml)?;
    if endpoints.is_empty() {
        return Err(ParseFailure::Empty);
    }

    for (index, endpoint) in endpoints.iter().enumerate() {
        if endpoint.name.trim().is_empty() {
            return Err(ParseFailure::Invalid(format!(
                "endpoint #{} has an empty name",
                index + 1
            )));
        }
        if endpoint.url.trim().is_empty() {
            return Err(ParseFailure::Invalid(format!(
                "endpoint '{}' has an empty url",
                endpoint.name
            )));
        }
        if !endpoint.method.is_supported() {
            warn!(
                endpoint_name = %endpoint.name,
                method = %endpoint.method,
                "Unsupported HTTP method, endpoint will always be reported DOWN"
            );
        }
    }

    Ok(endpoints)
}
