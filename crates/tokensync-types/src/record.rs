use serde::{Deserialize, Serialize};

/// Token counts attached to one usage unit.
///
/// Every adapter funnels its provider-specific fields through this type so the
/// zero-usage rule lives in one place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCounts {
    pub input: u64,
    pub output: u64,
    pub cache_creation: u64,
    pub cache_read: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<u64>,
}

impl TokenCounts {
    pub fn new(input: u64, output: u64, cache_creation: u64, cache_read: u64) -> Self {
        Self {
            input,
            output,
            cache_creation,
            cache_read,
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: u64) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    /// True when the unit carries no signal at all.
    pub fn is_empty(&self) -> bool {
        self.input == 0
            && self.output == 0
            && self.cache_creation == 0
            && self.cache_read == 0
            && self.reasoning.unwrap_or(0) == 0
    }

    /// Sum of the four billed counters (reasoning is reported separately).
    pub fn total(&self) -> u64 {
        self.input
            .saturating_add(self.output)
            .saturating_add(self.cache_creation)
            .saturating_add(self.cache_read)
    }
}

/// One normalized usage event (one assistant message or turn).
///
/// Created by an adapter during a scan and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Adapter-assigned identifier, unique within its source. This is the
    /// dedup key the remote service keys on.
    pub id: String,
    pub session_id: String,
    /// Source identifier (e.g. "claude_code", "codex")
    pub source: String,
    pub model: String,
    /// ISO-8601 in UTC with millisecond precision
    pub timestamp: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
}

impl UsageRecord {
    pub fn tokens(&self) -> TokenCounts {
        TokenCounts {
            input: self.input_tokens,
            output: self.output_tokens,
            cache_creation: self.cache_creation_tokens,
            cache_read: self.cache_read_tokens,
            reasoning: self.reasoning_tokens,
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.tokens().total()
    }
}
