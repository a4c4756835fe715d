//! エンドポイントプローブ
//!
//! 1エンドポイントに1リクエストを送信し、UP/DOWNを判定する。
//!
//! - 2xx かつ レイテンシ 500ms 未満のときのみ UP
//! - レイテンシはレスポンスボディを読み切るまでを計測する
//! - 接続失敗・DNS失敗・タイムアウト・TLSエラーは DOWN（レイテンシなし）
//! - リトライは行わない（次サイクルが唯一の回復手段）

use crate::common::error::ProbeError;
use crate::types::{EndpointBody, EndpointSpec, HttpMethod, ProbeOutcome, ProbeResult};
use reqwest::{Client, RequestBuilder};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// リクエストタイムアウト（ミリ秒）
pub const PROBE_TIMEOUT_MS: u64 = 2000;

/// UP判定のレイテンシ上限（ミリ秒、この値未満でUP）
pub const LATENCY_THRESHOLD_MS: f64 = 500.0;

/// ステータスコードとレイテンシからUP/DOWNを判定
pub fn classify(status: u16, latency_ms: f64) -> ProbeOutcome {
    ProbeOutcome {
        up: (200..300).contains(&status) && latency_ms < LATENCY_THRESHOLD_MS,
        latency_ms: Some(latency_ms),
    }
}

/// プローブ実行器
///
/// HTTPクライアントは接続プーリングのため全エンドポイントで共有する。
#[derive(Debug, Clone)]
pub struct ProbeExecutor {
    /// HTTPクライアント
    client: Client,
}

impl ProbeExecutor {
    /// 既定タイムアウト（2000ms）で作成
    pub fn new() -> Result<Self, ProbeError> {
        Self::with_timeout(Duration::from_millis(PROBE_TIMEOUT_MS))
    }

    /// タイムアウトを指定して作成
    pub fn with_timeout(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// 1回のリクエストを送信して判定する
    ///
    /// サポート外メソッドと通信エラーは`Err`で返す。
    /// 判定結果としてDOWNに吸収したい場合は[`ProbeExecutor::check`]を使う。
    pub async fn probe(&self, spec: &EndpointSpec) -> Result<ProbeOutcome, ProbeError> {
        let request = self.build_request(spec)?;

        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status().as_u16();
        // ボディ受信完了までをレイテンシに含める（途中の失敗は通信エラー）
        let body = response.bytes().await?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let outcome = classify(status, latency_ms);
        debug!(
            endpoint_name = %spec.name,
            status,
            body_bytes = body.len(),
            latency_ms,
            up = outcome.up,
            "Probe completed"
        );
        Ok(outcome)
    }

    /// プローブを実行し、エラーをDOWN判定に吸収して結果を返す
    pub async fn check(&self, spec: &EndpointSpec) -> ProbeResult {
        let outcome = match self.probe(spec).await {
            Ok(outcome) => outcome,
            Err(ProbeError::UnsupportedMethod(method)) => {
                warn!(
                    endpoint_name = %spec.name,
                    method = %method,
                    "Unsupported HTTP method, counting endpoint as DOWN"
                );
                ProbeOutcome::unreachable()
            }
            Err(ProbeError::Transport(e)) => {
                debug!(
                    endpoint_name = %spec.name,
                    url = %spec.url,
                    timeout = e.is_timeout(),
                    error = %e,
                    "Probe request failed"
                );
                ProbeOutcome::unreachable()
            }
        };
        ProbeResult::new(spec, outcome)
    }

    fn build_request(&self, spec: &EndpointSpec) -> Result<RequestBuilder, ProbeError> {
        let mut request = match &spec.method {
            HttpMethod::Get => self.client.get(&spec.url),
            HttpMethod::Post => self.client.post(&spec.url),
            HttpMethod::Put => self.client.put(&spec.url),
            HttpMethod::Delete => self.client.delete(&spec.url),
            HttpMethod::Unsupported(method) => {
                return Err(ProbeError::UnsupportedMethod(method.clone()));
            }
        };

        for (name, value) in &spec.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        if spec.method.carries_body() {
            request = match &spec.body {
                Some(EndpointBody::Text(text)) => request.body(text.clone()),
                Some(EndpointBody::Json(value)) => request.json(value),
                None => request,
            };
        }

        Ok(request)
    }
}
