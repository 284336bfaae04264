//! Shared types, error model, and configuration for autodesc.
//!
//! This crate is the foundation depended on by all other autodesc crates.
//! It provides:
//! - [`AutoDescError`] — the unified error type
//! - Domain types ([`Slug`], [`RepoCoordinate`], [`Payload`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiConfig, AppConfig, GitHubConfig, LinksConfig, RunConfig, load_config, load_config_from,
};
pub use error::{AuthService, AutoDescError, ErrorKind, Result};
pub use types::{CONFIG_KEY, DocumentSource, Payload, RepoCoordinate, Slug};
