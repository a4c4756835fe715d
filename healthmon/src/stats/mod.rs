//! ドメイン別稼働率の集計
//!
//! ドメインごとの累積プローブ数・UP数を保持し、稼働率（%）を計算する。
//! カウンタは単調増加で、プロセス再起動までリセットされない。

use serde::Serialize;
use std::collections::HashMap;

/// ドメイン別カウンタ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DomainStats {
    /// 累積プローブ数
    pub total: u64,
    /// 累積UP数（常に`total`以下）
    pub up: u64,
}

impl DomainStats {
    /// 稼働率（0〜100）
    ///
    /// `round(100 * up / total)`、`total == 0`のときは0。
    /// ちょうど .5 になる場合は偶数側に丸める（12.5% → 12%）。
    pub fn availability(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let percent = (self.up as f64 / self.total as f64) * 100.0;
        percent.round_ties_even().clamp(0.0, 100.0) as u8
    }
}

/// ドメイン1件分の稼働率
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainAvailability {
    /// ドメイン
    pub domain: String,
    /// 稼働率（%）
    pub percent: u8,
}

/// 稼働率スナップショット
///
/// ドメインは初めて観測された順に並ぶ。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilitySnapshot {
    entries: Vec<DomainAvailability>,
}

impl AvailabilitySnapshot {
    /// ドメインの稼働率を取得
    pub fn get(&self, domain: &str) -> Option<u8> {
        self.entries
            .iter()
            .find(|entry| entry.domain == domain)
            .map(|entry| entry.percent)
    }

    /// 観測順のイテレータ
    pub fn iter(&self) -> impl Iterator<Item = &DomainAvailability> {
        self.entries.iter()
    }

    /// ドメイン数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// ドメインが1件もないか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 稼働率アグリゲーター
///
/// 監視1回分の実行インスタンスが所有し、スケジューラーへは参照で渡す。
#[derive(Debug, Default)]
pub struct AvailabilityAggregator {
    stats: HashMap<String, DomainStats>,
    order: Vec<String>,
}

impl AvailabilityAggregator {
    /// 空のアグリゲーターを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// プローブ結果を1件記録
    pub fn record(&mut self, domain: &str, up: bool) {
        if !self.stats.contains_key(domain) {
            self.order.push(domain.to_string());
        }
        let stats = self.stats.entry(domain.to_string()).or_default();
        stats.total += 1;
        if up {
            stats.up += 1;
        }
    }

    /// ドメインのカウンタを取得
    pub fn stats(&self, domain: &str) -> Option<DomainStats> {
        self.stats.get(domain).copied()
    }

    /// 観測済みドメイン（観測順）
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// 現在の稼働率スナップショットを計算
    pub fn snapshot(&self) -> AvailabilitySnapshot {
        let entries = self
            .order
            .iter()
            .map(|domain| DomainAvailability {
                domain: domain.clone(),
                percent: self
                    .stats
                    .get(domain)
                    .map(DomainStats::availability)
                    .unwrap_or(0),
            })
            .collect();
        AvailabilitySnapshot { entries }
    }
}
