use serde::Serialize;
use tokensync_types::{DateStats, UNKNOWN_DATE, UsageStats};

/// One model's share of the total token volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelShare {
    pub model: String,
    pub total_tokens: u64,
    pub message_count: u64,
    /// 0.0 - 100.0
    pub percent: f64,
}

/// Models ordered by total tokens, largest first (ties broken by name).
pub fn top_models(stats: &UsageStats, limit: usize) -> Vec<ModelShare> {
    let grand_total = stats.total_tokens();
    let mut shares: Vec<ModelShare> = stats
        .by_model
        .iter()
        .map(|(model, s)| {
            let total_tokens = s.totals.total();
            ModelShare {
                model: model.clone(),
                total_tokens,
                message_count: s.message_count,
                percent: if grand_total == 0 {
                    0.0
                } else {
                    total_tokens as f64 * 100.0 / grand_total as f64
                },
            }
        })
        .collect();

    shares.sort_by(|a, b| {
        b.total_tokens
            .cmp(&a.total_tokens)
            .then_with(|| a.model.cmp(&b.model))
    });
    shares.truncate(limit);
    shares
}

/// Dated buckets in chronological order; the unknown bucket, if any, last.
pub fn daily_series(stats: &UsageStats) -> Vec<(&str, &DateStats)> {
    let mut series: Vec<(&str, &DateStats)> = stats
        .by_date
        .iter()
        .filter(|(date, _)| date.as_str() != UNKNOWN_DATE)
        .map(|(date, s)| (date.as_str(), s))
        .collect();
    if let Some(unknown) = stats.by_date.get(UNKNOWN_DATE) {
        series.push((UNKNOWN_DATE, unknown));
    }
    series
}
