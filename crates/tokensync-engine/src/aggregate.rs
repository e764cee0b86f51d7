use std::collections::{HashMap, HashSet};
use tokensync_types::{UNKNOWN_DATE, UsageRecord, UsageStats, date_key};

/// Fold state for [`aggregate`].
///
/// Holds the per-date session sets needed for distinct-session counting;
/// they are collapsed into counts by [`StatsAccumulator::finish`].
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    stats: UsageStats,
    sessions_by_date: HashMap<String, HashSet<String>>,
}

impl StatsAccumulator {
    pub fn push(mut self, record: &UsageRecord) -> Self {
        self.stats.totals.add_record(record);

        let model = self.stats.by_model.entry(record.model.clone()).or_default();
        model.totals.add_record(record);
        model.message_count += 1;

        let date = date_key(&record.timestamp).unwrap_or_else(|| UNKNOWN_DATE.to_string());
        let day = self.stats.by_date.entry(date.clone()).or_default();
        day.totals.add_record(record);
        day.message_count += 1;

        self.sessions_by_date
            .entry(date)
            .or_default()
            .insert(record.session_id.clone());

        self
    }

    pub fn finish(mut self) -> UsageStats {
        for (date, sessions) in self.sessions_by_date {
            if let Some(day) = self.stats.by_date.get_mut(&date) {
                day.session_count = sessions.len() as u64;
            }
        }
        self.stats
    }
}

/// Single-pass fold of a record set into [`UsageStats`].
pub fn aggregate<'a, I>(records: I) -> UsageStats
where
    I: IntoIterator<Item = &'a UsageRecord>,
{
    records
        .into_iter()
        .fold(StatsAccumulator::default(), StatsAccumulator::push)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(session: &str, model: &str, timestamp: &str, input: u64) -> UsageRecord {
        UsageRecord {
            id: format!("{}-{}-{}", session, model, timestamp),
            session_id: session.to_string(),
            source: "test".to_string(),
            model: model.to_string(),
            timestamp: timestamp.to_string(),
            input_tokens: input,
            output_tokens: 1,
            cache_creation_tokens: 2,
            cache_read_tokens: 3,
            reasoning_tokens: None,
            cwd: None,
        }
    }

    #[test]
    fn test_empty_input() {
        let stats = aggregate(&[]);
        assert!(stats.is_empty());
        assert_eq!(stats.total_tokens(), 0);
        assert!(stats.by_date.is_empty());
    }

    #[test]
    fn test_unknown_date_bucket_keeps_totals() {
        let records = vec![
            record("s1", "m", "not a timestamp", 10),
            record("s1", "m", "2025-01-01T00:00:00Z", 5),
        ];
        let stats = aggregate(&records);

        assert_eq!(stats.totals.input_tokens, 15);
        assert_eq!(stats.by_date[UNKNOWN_DATE].totals.input_tokens, 10);
        assert_eq!(stats.by_date["2025-01-01"].totals.input_tokens, 5);
    }

    #[test]
    fn test_sessions_counted_once_per_date() {
        let records = vec![
            record("s1", "m", "2025-01-01T01:00:00Z", 1),
            record("s1", "m", "2025-01-01T02:00:00Z", 1),
            record("s2", "m", "2025-01-01T03:00:00Z", 1),
            record("s1", "m", "2025-01-02T03:00:00Z", 1),
        ];
        let stats = aggregate(&records);

        assert_eq!(stats.by_date["2025-01-01"].session_count, 2);
        assert_eq!(stats.by_date["2025-01-01"].message_count, 3);
        assert_eq!(stats.by_date["2025-01-02"].session_count, 1);
    }
}
