//! Modrinth project description publisher.
//!
//! Sends the assembled [`Payload`] as a single `PATCH /v2/project/{slug}` and
//! classifies the response. There are no retries: one failed attempt is the
//! run's failure.
//!
//! See <https://docs.modrinth.com/api/operations/patchproject/>.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument};

use autodesc_shared::{AuthService, AutoDescError, Payload, Result, Slug};

/// Client identifier appended to every User-Agent.
const CLIENT_ID: &str = concat!("autodesc/", env!("CARGO_PKG_VERSION"));

/// Placeholder value CI workflows use for an unset project name.
const UNSET_NAME: &str = "__unset";

/// Outcome of a response, before it is turned into a `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Updated,
    Unauthorized { raw: String },
    ApiError { details: String },
}

/// Decide what a response means from its status and body text.
///
/// A 401 is always an authorization failure, whatever the body holds.
/// Any other non-empty body is an API error; JSON bodies are pretty-printed.
pub fn classify_response(status: StatusCode, body: &str) -> Classification {
    if status == StatusCode::UNAUTHORIZED {
        return Classification::Unauthorized {
            raw: pretty_json(body),
        };
    }

    if !body.trim().is_empty() {
        return Classification::ApiError {
            details: pretty_json(body),
        };
    }

    if status.is_success() {
        Classification::Updated
    } else {
        Classification::ApiError {
            details: format!("HTTP {status} with an empty response body"),
        }
    }
}

/// Build the User-Agent label: the slug, or `"<name> (<slug>)"`.
pub fn user_agent(project_name: Option<&str>, slug: &Slug) -> String {
    let label = match project_name.map(str::trim) {
        Some(name) if !name.is_empty() && name != UNSET_NAME => format!("{name} ({slug})"),
        _ => slug.to_string(),
    };
    format!("{label} via {CLIENT_ID}")
}

fn pretty_json(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// Connection settings for the publisher.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// API base URL without the `/v2` prefix.
    pub api_base: String,
    /// Modrinth personal access token.
    pub auth_token: String,
    /// Optional project label for the User-Agent.
    pub project_name: Option<String>,
    /// Transport timeout.
    pub timeout_secs: u64,
}

/// Sends description updates to Modrinth.
#[derive(Debug, Clone)]
pub struct Publisher {
    client: Client,
    api_base: String,
    auth_token: String,
    project_name: Option<String>,
}

impl Publisher {
    pub fn new(opts: &PublishOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| AutoDescError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: opts.api_base.trim_end_matches('/').to_string(),
            auth_token: opts.auth_token.clone(),
            project_name: opts.project_name.clone(),
        })
    }

    /// Endpoint for a project.
    pub fn project_url(&self, slug: &Slug) -> String {
        format!("{}/v2/project/{slug}", self.api_base)
    }

    /// Submit `payload` as the new project description.
    #[instrument(skip_all, fields(slug = %slug))]
    pub async fn publish(&self, slug: &Slug, payload: &Payload) -> Result<()> {
        let url = self.project_url(slug);
        let body = payload.to_json()?;

        info!("sending request to Modrinth");
        debug!(%url, fields = payload.fields().len(), bytes = body.len(), "payload assembled");

        let response = self
            .client
            .patch(&url)
            .header(reqwest::header::AUTHORIZATION, &self.auth_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(
                reqwest::header::USER_AGENT,
                user_agent(self.project_name.as_deref(), slug),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| AutoDescError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        // Not always JSON, so read text first.
        let text = response
            .text()
            .await
            .map_err(|e| AutoDescError::Network(format!("{url}: failed to read body: {e}")))?;

        debug!(%status, body_len = text.len(), "Modrinth response");

        match classify_response(status, &text) {
            Classification::Updated => {
                info!("updated description successfully");
                Ok(())
            }
            Classification::Unauthorized { raw } => Err(AutoDescError::auth(
                AuthService::Modrinth,
                "Unauthorised access to API. Did you set the access token properly?",
                Some(raw).filter(|r| !r.is_empty()),
            )),
            Classification::ApiError { details } => {
                Err(AutoDescError::api(details.clone(), Some(details)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autodesc_shared::ErrorKind;
    use serde_json::{Map, json};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn slug() -> Slug {
        Slug::parse("https://modrinth.com/mod/example").unwrap()
    }

    fn publisher(server: &MockServer) -> Publisher {
        Publisher::new(&PublishOptions {
            api_base: server.uri(),
            auth_token: "mrp_token".into(),
            project_name: Some("Example Mod".into()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn user_agent_labels() {
        let slug = slug();
        assert_eq!(
            user_agent(None, &slug),
            format!("example via {CLIENT_ID}")
        );
        assert_eq!(
            user_agent(Some("__unset"), &slug),
            format!("example via {CLIENT_ID}")
        );
        assert_eq!(
            user_agent(Some("Example Mod"), &slug),
            format!("Example Mod (example) via {CLIENT_ID}")
        );
    }

    #[test]
    fn classification_rules() {
        assert_eq!(
            classify_response(StatusCode::NO_CONTENT, ""),
            Classification::Updated
        );
        assert!(matches!(
            classify_response(StatusCode::UNAUTHORIZED, "{\"error\":\"unauthorized\"}"),
            Classification::Unauthorized { .. }
        ));
        assert!(matches!(
            classify_response(StatusCode::OK, "{\"error\":\"invalid_input\"}"),
            Classification::ApiError { .. }
        ));
        assert!(matches!(
            classify_response(StatusCode::INTERNAL_SERVER_ERROR, ""),
            Classification::ApiError { .. }
        ));
    }

    #[test]
    fn api_error_json_is_pretty_printed() {
        let Classification::ApiError { details } =
            classify_response(StatusCode::BAD_REQUEST, r#"{"error":"invalid_input","description":"bad"}"#)
        else {
            panic!("expected ApiError");
        };
        assert!(details.contains('\n'));
        assert!(details.contains("\"error\": \"invalid_input\""));
    }

    #[test]
    fn non_json_error_body_is_kept_verbatim() {
        assert_eq!(
            classify_response(StatusCode::BAD_GATEWAY, "upstream down"),
            Classification::ApiError {
                details: "upstream down".into()
            }
        );
    }

    #[tokio::test]
    async fn publish_sends_patch_and_accepts_empty_body() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/v2/project/example"))
            .and(header("authorization", "mrp_token"))
            .and(header("content-type", "application/json"))
            .and(header(
                "user-agent",
                format!("Example Mod (example) via {CLIENT_ID}").as_str(),
            ))
            .and(body_json(json!({ "title": "Example", "body": "Hello" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut settings = Map::new();
        settings.insert("title".into(), json!("Example"));
        let payload = Payload::new(settings, "Hello".into());

        publisher(&server).publish(&slug(), &payload).await.unwrap();
    }

    #[tokio::test]
    async fn publish_unauthorized_is_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"error":"unauthorized","description":"bad token"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let payload = Payload::new(Map::new(), "Hello".into());
        let err = publisher(&server).publish(&slug(), &payload).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(matches!(
            err,
            AutoDescError::Auth {
                service: AuthService::Modrinth,
                ..
            }
        ));
        assert!(err.to_string().contains("Unauthorised access"));
        assert!(err.raw().unwrap().contains("bad token"));
    }

    #[tokio::test]
    async fn publish_error_body_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":"invalid_input","description":"title too long"}"#),
            )
            .mount(&server)
            .await;

        let payload = Payload::new(Map::new(), "Hello".into());
        let err = publisher(&server).publish(&slug(), &payload).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(err.to_string().contains("title too long"));
    }
}
