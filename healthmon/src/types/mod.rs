//! 型定義

/// エンドポイント型
pub mod endpoint;
/// プローブ結果型
pub mod probe;

pub use endpoint::{extract_domain, EndpointBody, EndpointSpec, HttpMethod};
pub use probe::{ProbeOutcome, ProbeResult};
