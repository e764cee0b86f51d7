use serde::Deserialize;

/// One line of a Claude Code session transcript. Only the fields relevant
/// to usage accounting are decoded; everything else is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClaudeLine {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub uuid: Option<String>,
    pub session_id: Option<String>,
    pub request_id: Option<String>,
    pub timestamp: Option<String>,
    pub cwd: Option<String>,
    pub message: Option<ClaudeMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaudeMessage {
    pub id: Option<String>,
    pub model: Option<String>,
    pub usage: Option<ClaudeUsage>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ClaudeUsage {
    #[serde(default)]
    pub input_tokens: Option<u64>,
    #[serde(default)]
    pub output_tokens: Option<u64>,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
}

/// Model name Claude Code writes for locally generated placeholder replies
pub(crate) const SYNTHETIC_MODEL: &str = "<synthetic>";
