//! プローブ結果型定義

use super::endpoint::EndpointSpec;
use serde::{Deserialize, Serialize};

/// 単一リクエストの判定結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// UP判定（2xx かつ レイテンシ閾値未満）
    pub up: bool,
    /// レスポンスまでのレイテンシ（ミリ秒）。通信失敗時は`None`
    pub latency_ms: Option<f64>,
}

impl ProbeOutcome {
    /// 通信失敗・サポート外メソッドなど、レスポンスを得られなかった結果
    pub fn unreachable() -> Self {
        Self {
            up: false,
            latency_ms: None,
        }
    }
}

/// エンドポイント単位のプローブ結果
///
/// 1サイクル内で生成され、集計とレポート出力に使われた後は保持されない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// エンドポイント名
    pub endpoint_name: String,
    /// 集計キーとなるドメイン
    pub domain: String,
    /// UP判定
    pub up: bool,
    /// レイテンシ（ミリ秒）
    pub latency_ms: Option<f64>,
}

impl ProbeResult {
    /// エンドポイント定義と判定結果から作成
    pub fn new(spec: &EndpointSpec, outcome: ProbeOutcome) -> Self {
        Self {
            endpoint_name: spec.name.clone(),
            domain: spec.domain().to_string(),
            up: outcome.up,
            latency_ms: outcome.latency_ms,
        }
    }

    /// "UP" / "DOWN"
    pub fn status_label(&self) -> &'static str {
        if self.up {
            "UP"
        } else {
            "DOWN"
        }
    }
}
