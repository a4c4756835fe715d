//! エンドポイント型定義
//!
//! 設定ファイルから読み込まれる監視対象の記述。読み込み後は不変。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// HTTPメソッド
///
/// 監視対象としてサポートするのは GET/POST/PUT/DELETE のみ。
/// それ以外の文字列は`Unsupported`として保持し、プローブ時にエラーとする。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    /// GET（デフォルト）
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// サポート外のメソッド（大文字化した元の文字列）
    Unsupported(String),
}

impl HttpMethod {
    /// メソッド名を文字列に変換
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Unsupported(raw) => raw.as_str(),
        }
    }

    /// Whether a request body is sent with this method.
    pub fn carries_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    /// サポート対象のメソッドか
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl From<&str> for HttpMethod {
    fn from(value: &str) -> Self {
        let upper = value.trim().to_ascii_uppercase();
        match upper.as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            _ => Self::Unsupported(upper),
        }
    }
}

impl From<String> for HttpMethod {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<HttpMethod> for String {
    fn from(value: HttpMethod) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// リクエストボディ
///
/// 文字列はそのまま送信し、YAMLのマップや配列はJSONとして送信する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointBody {
    /// テキストボディ
    Text(String),
    /// 構造化ボディ（JSONにシリアライズして送信）
    Json(serde_json::Value),
}

/// 監視対象エンドポイント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// 表示名
    pub name: String,
    /// リクエストURL
    pub url: String,
    /// HTTPメソッド（省略時はGET）
    #[serde(default)]
    pub method: HttpMethod,
    /// 追加ヘッダー
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// リクエストボディ（POST/PUTのみ送信）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<EndpointBody>,
}

impl EndpointSpec {
    /// GETエンドポイントを作成
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method: HttpMethod::Get,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// メソッドを設定
    pub fn with_method(mut self, method: impl Into<HttpMethod>) -> Self {
        self.method = method.into();
        self
    }

    /// ヘッダーを追加
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// ボディを設定
    pub fn with_body(mut self, body: EndpointBody) -> Self {
        self.body = Some(body);
        self
    }

    /// 集計キーとなるドメイン
    pub fn domain(&self) -> &str {
        extract_domain(&self.url)
    }
}

/// Returns the authority segment of `url`.
///
/// The segment starts after `://` (or at the beginning when there is no
/// scheme) and ends at the first `/`, `?` or `#`. Ports and userinfo are kept.
pub fn extract_domain(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    &rest[..end]
}
