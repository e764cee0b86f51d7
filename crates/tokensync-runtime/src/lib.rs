//! Workspace configuration, the remote sync client and the services that
//! tie adapters, checkpoints and uploads together.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod services;
pub mod workspace;

pub use client::{
    PROTOCOL_VERSION, RemoteStats, SyncClient, SyncError, SyncRequest, SyncResponse, WireMessage,
    client_name,
};
pub use config::{Config, DEFAULT_API_URL, DEFAULT_BATCH_SIZE, SourceConfig};
pub use credentials::{CredentialProvider, Credentials, EnvCredentials, StaticCredentials};
pub use error::{Error, Result};
pub use services::{
    ScanReport, ScanService, SourceOutcome, SourceReport, SourceScan, SyncOptions, SyncOutcome,
    SyncProgress, SyncReport, SyncService,
};
pub use workspace::Workspace;
