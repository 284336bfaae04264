//! Application configuration for autodesc.
//!
//! An optional TOML file supplies endpoint and link settings.
//! CLI flags (and the CI input variables behind them) override config file
//! values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AutoDescError, Result};
use crate::types::{DocumentSource, RepoCoordinate, Slug};

// ---------------------------------------------------------------------------
// Config structs (matching autodesc.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Modrinth API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Image link rewriting settings.
    #[serde(default)]
    pub links: LinksConfig,

    /// GitHub API settings (default-branch lookup).
    #[serde(default)]
    pub github: GitHubConfig,
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Modrinth API, without the `/v2` prefix.
    #[serde(default = "default_api_base")]
    pub base_url: String,

    /// Transport timeout for every outbound request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.modrinth.com".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[links]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Host serving raw repository files.
    #[serde(default = "default_raw_host")]
    pub raw_host: String,

    /// Branch used when the default branch cannot be looked up.
    #[serde(default = "default_fallback_branch")]
    pub fallback_branch: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            raw_host: default_raw_host(),
            fallback_branch: default_fallback_branch(),
        }
    }
}

fn default_raw_host() -> String {
    "raw.githubusercontent.com".into()
}
fn default_fallback_branch() -> String {
    "main".into()
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Base URL of the GitHub REST API.
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api_base(),
        }
    }
}

fn default_github_api_base() -> String {
    "https://api.github.com".into()
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config file + CLI inputs)
// ---------------------------------------------------------------------------

/// Everything a single run needs, built once at the CLI boundary.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Modrinth personal access token.
    pub auth_token: String,
    /// Target project.
    pub slug: Slug,
    /// Optional human label used in the User-Agent.
    pub project_name: Option<String>,
    /// README location.
    pub source: DocumentSource,
    /// GitHub token for the default-branch lookup.
    pub repo_token: Option<String>,
    /// Explicit branch override for link rewriting.
    pub branch: Option<String>,
    /// Whether relative image links are rewritten.
    pub rewrite_links: bool,
    /// Repository the README belongs to.
    pub repository: Option<RepoCoordinate>,
    /// Ref that triggered the run (e.g. `refs/heads/main`).
    pub git_ref: Option<String>,
    /// Source branch of a pull request.
    pub head_ref: Option<String>,
    /// Root of the repository checkout, for locating the document inside it.
    pub workspace: Option<PathBuf>,
    /// Build the payload but do not send it.
    pub dry_run: bool,
    pub api: ApiConfig,
    pub links: LinksConfig,
    pub github: GitHubConfig,
}

impl RunConfig {
    /// Create a run config with file/default settings and no optional inputs.
    pub fn new(
        app: &AppConfig,
        auth_token: impl Into<String>,
        slug: Slug,
        source: DocumentSource,
    ) -> Self {
        Self {
            auth_token: auth_token.into(),
            slug,
            project_name: None,
            source,
            repo_token: None,
            branch: None,
            rewrite_links: false,
            repository: None,
            git_ref: None,
            head_ref: None,
            workspace: None,
            dry_run: false,
            api: app.api.clone(),
            links: app.links.clone(),
            github: app.github.clone(),
        }
    }

    /// Reject settings that would make the run pointless.
    pub fn validate(&self) -> Result<()> {
        if self.auth_token.trim().is_empty() && !self.dry_run {
            return Err(AutoDescError::config(
                "Modrinth auth token is empty. Set the `auth-token` input.",
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(AutoDescError::config("api.timeout_secs must be greater than 0"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the application config from an optional path. Returns defaults if none is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config_from(path),
        None => {
            tracing::debug!("no config file given, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AutoDescError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        AutoDescError::config(format!("failed to parse {}: {e}", path.display()))
    })
}
