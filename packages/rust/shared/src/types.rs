//! Core domain types for autodesc runs.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::error::{AutoDescError, Result};

/// Front-matter key holding the tool's own settings (the project fields to patch).
pub const CONFIG_KEY: &str = "modrinth";

/// Payload field carrying the long-form description.
const BODY_FIELD: &str = "body";

// ---------------------------------------------------------------------------
// Slug
// ---------------------------------------------------------------------------

/// Short project identifier on Modrinth.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    /// Parse a slug from user input, accepting a full project URL.
    ///
    /// Only the trailing path segment is kept, so
    /// `https://modrinth.com/mod/example` becomes `example`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();

        let segment = match Url::parse(trimmed) {
            Ok(url) if url.has_host() => url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .unwrap_or_default()
                .to_string(),
            _ => {
                let without_suffix = trimmed
                    .split(['?', '#'])
                    .next()
                    .unwrap_or(trimmed)
                    .trim_end_matches('/');
                without_suffix
                    .rsplit('/')
                    .next()
                    .unwrap_or(without_suffix)
                    .to_string()
            }
        };

        if segment.is_empty() {
            return Err(AutoDescError::config(format!(
                "could not extract a project slug from '{input}'"
            )));
        }

        Ok(Self(segment))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// RepoCoordinate
// ---------------------------------------------------------------------------

/// A GitHub repository, as `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoCoordinate {
    pub owner: String,
    pub repo: String,
}

impl RepoCoordinate {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl std::fmt::Display for RepoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl std::str::FromStr for RepoCoordinate {
    type Err = AutoDescError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self::new(owner, repo))
            }
            _ => Err(AutoDescError::config(format!(
                "repository must look like 'owner/repo', got '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// DocumentSource
// ---------------------------------------------------------------------------

/// Where the README is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// A file in the checked-out workspace.
    Path(PathBuf),
    /// A document fetched over HTTP(S).
    Url(Url),
}

impl DocumentSource {
    /// Classify user input as a URL (http/https only) or a local path.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            if let Ok(url) = Url::parse(trimmed) {
                return Self::Url(url);
            }
        }
        Self::Path(PathBuf::from(trimmed))
    }
}

impl std::fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The JSON object sent to the project update endpoint.
///
/// The `body` field always holds the pipeline output; a `body` supplied in
/// front matter is dropped and a warning is recorded.
#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    #[serde(flatten)]
    fields: Map<String, Value>,
    #[serde(skip)]
    warnings: Vec<String>,
}

impl Payload {
    /// Assemble a payload from the settings block and the computed body.
    pub fn new(mut settings: Map<String, Value>, body: String) -> Self {
        let mut warnings = Vec::new();

        if settings.contains_key(BODY_FIELD) {
            let message = format!(
                "Ignoring `{CONFIG_KEY}.{BODY_FIELD}` in the front matter. This field should not be set. \
                 Use `{CONFIG_KEY}.description` to set the short description instead."
            );
            tracing::warn!("{message}");
            warnings.push(message);
        }

        settings.insert(BODY_FIELD.to_string(), Value::String(body));

        Self {
            fields: settings,
            warnings,
        }
    }

    /// The description body that will be submitted.
    pub fn body(&self) -> &str {
        self.fields
            .get(BODY_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// All fields that will be submitted, including `body`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Warnings recorded while assembling the payload.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Serialize to the wire format.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| AutoDescError::parse(format!("failed to serialize payload: {e}")))
    }
}
