//! Apigate Directory - HTTP access to the credential directory.
//!
//! Implements the `CredentialDirectory` and `TokenProvider` traits from
//! `apigate-core` over the dashboard's REST API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use apigate_core::events::NoOpEventSink;
//! use apigate_core::preferences::FilePreferenceStore;
//! use apigate_core::{Environment, SwitchCoordinator};
//! use apigate_directory::{DirectoryClient, DirectoryConfig, EnvTokenProvider};
//!
//! let client = DirectoryClient::new(DirectoryConfig::from_env()?)?;
//! let coordinator = SwitchCoordinator::new(
//!     Arc::new(client),
//!     Arc::new(EnvTokenProvider::default()),
//!     Arc::new(FilePreferenceStore::new("preferences.json")),
//!     Arc::new(NoOpEventSink),
//! );
//! coordinator.refresh_services().await?;
//! let outcome = coordinator.request_switch(Environment::Live).await;
//! ```

mod client;
mod config;
mod error;
mod token;
mod types;

pub use client::DirectoryClient;
pub use config::{DirectoryConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{DirectoryError, Result};
pub use token::{EnvTokenProvider, StaticTokenProvider, SESSION_TOKEN_VAR};
