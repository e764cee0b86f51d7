use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::UsageRecord;

/// Date key used for records whose timestamp cannot be parsed.
pub const UNKNOWN_DATE: &str = "unknown";

/// The four running token totals shared by every aggregate level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
}

/// Sums saturate: a corrupt count from one source must not abort a scan.
impl TokenTotals {
    pub fn add_record(&mut self, record: &UsageRecord) {
        self.add(&TokenTotals {
            input_tokens: record.input_tokens,
            output_tokens: record.output_tokens,
            cache_creation_tokens: record.cache_creation_tokens,
            cache_read_tokens: record.cache_read_tokens,
        });
    }

    pub fn add(&mut self, other: &TokenTotals) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.cache_creation_tokens = self
            .cache_creation_tokens
            .saturating_add(other.cache_creation_tokens);
        self.cache_read_tokens = self.cache_read_tokens.saturating_add(other.cache_read_tokens);
    }

    pub fn total(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_creation_tokens)
            .saturating_add(self.cache_read_tokens)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    #[serde(flatten)]
    pub totals: TokenTotals,
    pub message_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateStats {
    #[serde(flatten)]
    pub totals: TokenTotals,
    pub message_count: u64,
    /// Distinct session ids active on this date
    pub session_count: u64,
}

/// Aggregate view over a record set.
///
/// Invariant: summing any field over `by_model` or over `by_date` equals the
/// matching field of `totals`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    #[serde(flatten)]
    pub totals: TokenTotals,
    pub by_model: BTreeMap<String, ModelStats>,
    /// Keyed by `YYYY-MM-DD` (UTC), or [`UNKNOWN_DATE`]
    pub by_date: BTreeMap<String, DateStats>,
}

impl UsageStats {
    pub fn total_tokens(&self) -> u64 {
        self.totals.total()
    }

    pub fn message_count(&self) -> u64 {
        self.by_model.values().map(|m| m.message_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_model.is_empty()
    }

    /// Combine stats computed over disjoint record sets.
    ///
    /// Session counts are added per date, which is exact as long as the two
    /// sets never share a session id (sets from different sources never do).
    pub fn merge(&mut self, other: &UsageStats) {
        self.totals.add(&other.totals);
        for (model, stats) in &other.by_model {
            let entry = self.by_model.entry(model.clone()).or_default();
            entry.totals.add(&stats.totals);
            entry.message_count += stats.message_count;
        }
        for (date, stats) in &other.by_date {
            let entry = self.by_date.entry(date.clone()).or_default();
            entry.totals.add(&stats.totals);
            entry.message_count += stats.message_count;
            entry.session_count += stats.session_count;
        }
    }
}
