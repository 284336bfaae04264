//! End-to-end run: document → front matter → exclusions → links → publish.

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};
use url::Url;

use autodesc_github::{
    BranchInputs, BranchSource, DefaultBranchLookup, GitHubClient, resolve_branch,
};
use autodesc_markdown::{LinkBase, remove_excluded_sections, rewrite_image_links};
use autodesc_publish::{PublishOptions, Publisher};
use autodesc_shared::{DocumentSource, Payload, Result, RunConfig};

use crate::source::{load_document, repository_relative};

/// Front matter settings and body with excluded sections already removed.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub settings: Map<String, Value>,
    pub body: String,
}

/// How relative images will be rewritten.
#[derive(Debug, Clone)]
pub struct LinkPlan {
    pub base: LinkBase,
    /// Raw URL base exposed to later CI steps (repository bases only).
    pub raw_url: Option<Url>,
}

/// A payload ready to send.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub payload: Payload,
    pub raw_url: Option<Url>,
    /// Warnings to surface to the user, in the order they were raised.
    pub warnings: Vec<String>,
}

/// Result of a whole run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub prepared: Prepared,
    /// False for dry runs.
    pub published: bool,
}

/// Split the front matter and remove excluded sections.
///
/// Marker validation happens here, before any text is dropped.
pub fn clean(document: &str) -> Result<Cleaned> {
    let front_matter = autodesc_markdown::split(document)?;
    let settings = front_matter.settings()?;
    let body = remove_excluded_sections(&front_matter.body)?;

    debug!(
        settings = settings.len(),
        body_len = body.len(),
        "document cleaned"
    );

    Ok(Cleaned { settings, body })
}

/// Apply the optional link rewrite and assemble the payload.
pub fn finish(cleaned: Cleaned, link_base: Option<&LinkBase>) -> Payload {
    let body = match link_base {
        Some(base) => rewrite_image_links(&cleaned.body, base),
        None => cleaned.body,
    };
    Payload::new(cleaned.settings, body)
}

/// Decide whether and how image links are rewritten.
///
/// Returns `None` when rewriting is disabled or the branch cannot be
/// determined; the body then passes through unchanged.
pub async fn plan_links<L: DefaultBranchLookup>(
    config: &RunConfig,
    lookup: Option<&L>,
    warnings: &mut Vec<String>,
) -> Result<Option<LinkPlan>> {
    if !config.rewrite_links {
        debug!("link rewriting disabled");
        return Ok(None);
    }

    let path = match &config.source {
        DocumentSource::Url(url) => {
            return Ok(Some(LinkPlan {
                base: LinkBase::Document(url.clone()),
                raw_url: None,
            }));
        }
        DocumentSource::Path(path) => path,
    };

    let Some(repo) = &config.repository else {
        let message =
            "Link rewriting is enabled but no repository is known; images are left as written."
                .to_string();
        warn!("{message}");
        warnings.push(message);
        return Ok(None);
    };

    let inputs = BranchInputs {
        branch: config.branch.as_deref(),
        git_ref: config.git_ref.as_deref(),
        head_ref: config.head_ref.as_deref(),
    };

    let Some(branch) =
        resolve_branch(&inputs, repo, lookup, &config.links.fallback_branch).await?
    else {
        info!("no branch could be determined, skipping link rewriting");
        return Ok(None);
    };

    if branch.source == BranchSource::Fallback {
        warnings.push(format!(
            "No repository token was provided, so the default branch of {repo} could not be \
             looked up. Assuming '{}'; this may be incorrect.",
            branch.name
        ));
    }

    let relative = repository_relative(path, config.workspace.as_deref());
    let base = LinkBase::repository(&config.links.raw_host, repo, &branch.name, &relative)?;
    let raw_url = match &base {
        LinkBase::Repository { base, .. } => Some(base.clone()),
        LinkBase::Document(_) => None,
    };

    info!(branch = %branch.name, source = ?branch.source, "rewriting relative image links");

    Ok(Some(LinkPlan { base, raw_url }))
}

/// Turn a loaded document into a payload.
#[instrument(skip_all, fields(slug = %config.slug))]
pub async fn prepare<L: DefaultBranchLookup>(
    config: &RunConfig,
    document: &str,
    lookup: Option<&L>,
) -> Result<Prepared> {
    let cleaned = clean(document)?;

    let mut warnings = Vec::new();
    let plan = plan_links(config, lookup, &mut warnings).await?;

    let payload = finish(cleaned, plan.as_ref().map(|p| &p.base));
    warnings.extend(payload.warnings().iter().cloned());

    Ok(Prepared {
        payload,
        raw_url: plan.and_then(|p| p.raw_url),
        warnings,
    })
}

/// Run the full pipeline for one invocation.
#[instrument(skip_all, fields(slug = %config.slug, source = %config.source))]
pub async fn run(config: &RunConfig) -> Result<RunOutcome> {
    config.validate()?;

    let document = load_document(&config.source, config.api.timeout_secs).await?;

    let lookup = match config.repo_token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => Some(GitHubClient::new(
            &config.github.api_base,
            token,
            config.api.timeout_secs,
        )?),
        _ => None,
    };

    let prepared = prepare(config, &document, lookup.as_ref()).await?;

    if config.dry_run {
        info!(body_len = prepared.payload.body().len(), "dry run, not sending request");
        return Ok(RunOutcome {
            prepared,
            published: false,
        });
    }

    let publisher = Publisher::new(&PublishOptions {
        api_base: config.api.base_url.clone(),
        auth_token: config.auth_token.clone(),
        project_name: config.project_name.clone(),
        timeout_secs: config.api.timeout_secs,
    })?;
    publisher.publish(&config.slug, &prepared.payload).await?;

    Ok(RunOutcome {
        prepared,
        published: true,
    })
}
