//! Upload client for the remote usage service.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokensync_types::UsageRecord;
use tracing::debug;

/// Wire protocol version sent with every request
pub const PROTOCOL_VERSION: u32 = 1;

const SYNC_PATH: &str = "/api/usage/sync";

/// Failures of one upload request.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("authentication required: the sync token was rejected")]
    AuthRequired,

    #[error("sync endpoint is not available on this server")]
    EndpointUnavailable,

    #[error("server returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl SyncError {
    /// Failures that say nothing about the server's view of the data:
    /// the request may never have arrived, or the reply was unreadable.
    pub fn is_transport(&self) -> bool {
        matches!(self, SyncError::Transport(_) | SyncError::InvalidResponse(_))
    }
}

/// One record as sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    pub id: String,
    pub timestamp: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    pub reasoning_tokens: u64,
}

impl From<&UsageRecord> for WireMessage {
    fn from(record: &UsageRecord) -> Self {
        Self {
            id: record.id.clone(),
            timestamp: record.timestamp.clone(),
            model: record.model.clone(),
            input_tokens: record.input_tokens,
            output_tokens: record.output_tokens,
            cache_creation_tokens: record.cache_creation_tokens,
            cache_read_tokens: record.cache_read_tokens,
            reasoning_tokens: record.reasoning_tokens.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub version: u32,
    pub client: String,
    pub machine_id: String,
    pub synced_at: String,
    pub source: String,
    pub messages: Vec<WireMessage>,
}

impl SyncRequest {
    pub fn new(machine_id: &str, source: &str, synced_at: &str, records: &[UsageRecord]) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            client: client_name(),
            machine_id: machine_id.to_string(),
            synced_at: synced_at.to_string(),
            source: source.to_string(),
            messages: records.iter().map(WireMessage::from).collect(),
        }
    }
}

/// `tokensync/<version>`
pub fn client_name() -> String {
    format!("tokensync/{}", env!("CARGO_PKG_VERSION"))
}

/// Server-side totals returned after a sync. Every field is optional on the
/// wire so older servers still decode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteStats {
    pub total_tokens: u64,
    pub total_cost: f64,
    pub current_streak: u64,
    pub longest_streak: u64,
    pub achievements_unlocked: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncResponse {
    pub success: bool,
    /// Records the server accepted, including ids it already knew
    pub messages_received: u64,
    /// Records that were new to the server
    pub messages_synced: u64,
    pub records_processed: u64,
    pub new_records: u64,
    pub updated_records: u64,
    pub stats: RemoteStats,
    pub new_achievements: Option<Vec<serde_json::Value>>,
}

/// Thin authenticated client for `POST {api_url}/api/usage/sync`.
#[derive(Debug, Clone)]
pub struct SyncClient {
    http: Client,
    api_url: String,
}

impl SyncClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self, SyncError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(client_name())
            .build()?;
        Ok(Self::with_http_client(api_url, http))
    }

    pub fn with_http_client(api_url: impl Into<String>, http: Client) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { http, api_url }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.api_url, SYNC_PATH)
    }

    pub async fn sync(&self, token: &str, request: &SyncRequest) -> Result<SyncResponse, SyncError> {
        debug!(
            source = %request.source,
            messages = request.messages.len(),
            "uploading usage batch"
        );
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.text().await?;
                if body.trim().is_empty() {
                    return Ok(SyncResponse::default());
                }
                serde_json::from_str(&body).map_err(|e| SyncError::InvalidResponse(e.to_string()))
            }
            StatusCode::UNAUTHORIZED => Err(SyncError::AuthRequired),
            StatusCode::NOT_FOUND => Err(SyncError::EndpointUnavailable),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| status.to_string());
                Err(SyncError::Http {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
