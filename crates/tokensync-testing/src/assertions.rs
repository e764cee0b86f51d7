//! Invariant checks shared by provider and runtime tests.

use anyhow::{Result, bail};
use tokensync_types::{TokenTotals, UsageRecord, UsageStats};

fn sum<'a>(buckets: impl Iterator<Item = &'a TokenTotals>) -> TokenTotals {
    buckets.fold(TokenTotals::default(), |mut acc, t| {
        acc.add(t);
        acc
    })
}

/// Every bucket family sums to the top-level totals, field by field.
pub fn assert_stats_consistent(stats: &UsageStats) -> Result<()> {
    let by_model = sum(stats.by_model.values().map(|m| &m.totals));
    let by_date = sum(stats.by_date.values().map(|d| &d.totals));

    if by_model != stats.totals {
        bail!("model buckets {:?} != totals {:?}", by_model, stats.totals);
    }
    if by_date != stats.totals {
        bail!("date buckets {:?} != totals {:?}", by_date, stats.totals);
    }

    let model_messages: u64 = stats.by_model.values().map(|m| m.message_count).sum();
    let date_messages: u64 = stats.by_date.values().map(|d| d.message_count).sum();
    if model_messages != date_messages {
        bail!("model message count {} != date message count {}", model_messages, date_messages);
    }
    Ok(())
}

/// Record ids, sorted, for order-insensitive comparisons.
pub fn sorted_ids(records: &[UsageRecord]) -> Vec<String> {
    let mut ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
    ids.sort();
    ids
}

/// Both scans produced the same records, ignoring order.
pub fn assert_same_records(left: &[UsageRecord], right: &[UsageRecord]) -> Result<()> {
    let mut left = left.to_vec();
    let mut right = right.to_vec();
    left.sort_by(|a, b| a.id.cmp(&b.id));
    right.sort_by(|a, b| a.id.cmp(&b.id));
    if left != right {
        bail!(
            "record sets differ: {:?} vs {:?}",
            sorted_ids(&left),
            sorted_ids(&right)
        );
    }
    Ok(())
}
