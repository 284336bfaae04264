//! GitHub ref handling for raw image URLs.
//!
//! Decides which branch relative images should point at. The only network
//! access is the default-branch lookup, kept behind [`DefaultBranchLookup`]
//! so the resolution policy can be tested without a server.

mod branch;

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use autodesc_shared::{AuthService, AutoDescError, RepoCoordinate, Result};

pub use branch::{
    BranchInputs, BranchSource, RefKind, ResolvedBranch, classify_ref, resolve_branch,
};

/// User-Agent string for GitHub API requests.
const USER_AGENT: &str = concat!("autodesc/", env!("CARGO_PKG_VERSION"));

/// Capability to find a repository's default branch.
#[allow(async_fn_in_trait)]
pub trait DefaultBranchLookup {
    /// Look up the default branch name of `repo`.
    async fn default_branch(&self, repo: &RepoCoordinate) -> Result<String>;
}

// ---------------------------------------------------------------------------
// GitHub REST client
// ---------------------------------------------------------------------------

/// Authenticated client for `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    default_branch: String,
}

impl GitHubClient {
    /// Build a client against `api_base` (e.g. `https://api.github.com`).
    pub fn new(api_base: &str, token: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AutoDescError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }
}

impl DefaultBranchLookup for GitHubClient {
    #[instrument(skip_all, fields(repo = %repo))]
    async fn default_branch(&self, repo: &RepoCoordinate) -> Result<String> {
        let url = format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.repo);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| AutoDescError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(AutoDescError::auth(
                AuthService::GitHub,
                "GitHub rejected the repository token while looking up the default branch",
                Some(body).filter(|b| !b.is_empty()),
            ));
        }
        if !status.is_success() {
            return Err(AutoDescError::Network(format!("{url}: HTTP {status}")));
        }

        let info: RepositoryInfo = response
            .json()
            .await
            .map_err(|e| AutoDescError::parse(format!("{url}: unexpected response: {e}")))?;

        debug!(default_branch = %info.default_branch, "default branch looked up");
        Ok(info.default_branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autodesc_shared::ErrorKind;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repo() -> RepoCoordinate {
        RepoCoordinate::new("octo", "widgets")
    }

    #[tokio::test]
    async fn looks_up_default_branch() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "widgets",
                "default_branch": "develop"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GitHubClient::new(&server.uri(), "secret", 5).unwrap();
        let branch = client.default_branch(&repo()).await.unwrap();
        assert_eq!(branch, "develop");
    }

    #[tokio::test]
    async fn unauthorized_lookup_is_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"message":"Bad credentials"}"#),
            )
            .mount(&server)
            .await;

        let client = GitHubClient::new(&server.uri(), "bad", 5).unwrap();
        let err = client.default_branch(&repo()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(matches!(
            err,
            AutoDescError::Auth {
                service: AuthService::GitHub,
                ..
            }
        ));
        assert!(err.raw().unwrap().contains("Bad credentials"));
    }

    #[tokio::test]
    async fn missing_repository_is_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = GitHubClient::new(&server.uri(), "secret", 5).unwrap();
        let err = client.default_branch(&repo()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn resolution_uses_client_for_unknown_refs() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"default_branch":"trunk"}"#),
            )
            .mount(&server)
            .await;

        let client = GitHubClient::new(&server.uri(), "secret", 5).unwrap();
        let branch = resolve_branch(&BranchInputs::default(), &repo(), Some(&client), "main")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(branch.name, "trunk");
        assert_eq!(branch.source, BranchSource::DefaultBranch);
    }
}
