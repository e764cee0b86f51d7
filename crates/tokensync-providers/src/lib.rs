// Error types
pub mod error;

// Capability trait
pub mod traits;

// Source adapters
pub mod claude;
pub mod codex;
pub mod gemini;
pub mod opencode;
pub mod task_history;

// Shared decode machinery
pub(crate) mod builder;
pub(crate) mod fields;
pub(crate) mod incremental;

// Default locations
pub mod paths;

// Provider registry
pub mod registry;

pub use traits::UsageParser;

pub use claude::ClaudeSource;
pub use codex::CodexSource;
pub use gemini::GeminiSource;
pub use opencode::OpenCodeSource;
pub use task_history::{CLINE, KILO_CODE, ROO_CODE, TaskHistorySource, TaskHistorySpec};

// Registry
pub use registry::{
    ProviderMetadata, create_adapter, create_adapter_with_roots, get_all_providers,
    get_provider_metadata,
};

// Error types
pub use error::{Error, Result};
