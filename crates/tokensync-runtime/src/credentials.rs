/// Token used to authenticate uploads.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub display_name: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Source of upload credentials. Obtaining them (device login, keychain)
/// happens elsewhere; the orchestrator only asks.
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;
}

/// Fixed credentials, mainly for tests and embedding.
#[derive(Debug, Clone)]
pub struct StaticCredentials(Option<Credentials>);

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(Credentials {
            token: token.into(),
            display_name: None,
        }))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> Option<Credentials> {
        self.0.clone()
    }
}

pub const TOKEN_ENV: &str = "TOKENSYNC_TOKEN";
pub const USER_ENV: &str = "TOKENSYNC_USER";

/// Reads `TOKENSYNC_TOKEN` and `TOKENSYNC_USER` at call time.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Option<Credentials> {
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())?;
        Some(Credentials {
            token,
            display_name: std::env::var(USER_ENV).ok().filter(|u| !u.is_empty()),
        })
    }
}
