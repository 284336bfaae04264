//! Branch resolution for raw image URLs.
//!
//! An explicit branch always wins. Otherwise the triggering ref decides, and
//! only refs that name nothing usable fall through to the repository's
//! default branch.

use tracing::{debug, warn};

use autodesc_shared::{RepoCoordinate, Result};

use crate::DefaultBranchLookup;

/// What kind of event produced the triggering ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefKind {
    /// `refs/pull/<n>/merge` and friends.
    PullRequest,
    /// `refs/heads/<name>`.
    Branch(String),
    /// `refs/tags/<name>`.
    Tag(String),
    /// Anything else, including an empty ref.
    Other,
}

/// Classify a `GITHUB_REF`-style reference string.
pub fn classify_ref(git_ref: &str) -> RefKind {
    if git_ref.starts_with("refs/pull/") {
        RefKind::PullRequest
    } else if let Some(name) = git_ref.strip_prefix("refs/heads/") {
        RefKind::Branch(name.to_string())
    } else if let Some(name) = git_ref.strip_prefix("refs/tags/") {
        RefKind::Tag(name.to_string())
    } else {
        RefKind::Other
    }
}

/// Where a resolved branch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSource {
    Explicit,
    PullRequest,
    Push,
    Tag,
    DefaultBranch,
    /// Hard-coded fallback used when the default branch could not be looked up.
    Fallback,
}

/// A branch (or tag) name to build raw URLs from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBranch {
    pub name: String,
    pub source: BranchSource,
}

/// Inputs that can determine the branch.
#[derive(Debug, Clone, Default)]
pub struct BranchInputs<'a> {
    /// Explicit override.
    pub branch: Option<&'a str>,
    /// Triggering ref (`GITHUB_REF`).
    pub git_ref: Option<&'a str>,
    /// Pull request source branch (`GITHUB_HEAD_REF`).
    pub head_ref: Option<&'a str>,
}

/// Resolve the branch for `repo`.
///
/// `lookup` is `None` when no credential is available; the `fallback` name is
/// used then, with a warning. Returns `Ok(None)` when the inputs name an empty
/// branch, in which case link rewriting should be skipped.
pub async fn resolve_branch<L: DefaultBranchLookup>(
    inputs: &BranchInputs<'_>,
    repo: &RepoCoordinate,
    lookup: Option<&L>,
    fallback: &str,
) -> Result<Option<ResolvedBranch>> {
    if let Some(branch) = non_empty(inputs.branch) {
        return Ok(Some(resolved(branch, BranchSource::Explicit)));
    }

    let kind = classify_ref(inputs.git_ref.unwrap_or_default());
    debug!(?kind, "classified triggering ref");

    let branch = match kind {
        RefKind::PullRequest => {
            non_empty(inputs.head_ref).map(|name| resolved(name, BranchSource::PullRequest))
        }
        RefKind::Branch(name) => {
            non_empty(Some(name.as_str())).map(|n| resolved(n, BranchSource::Push))
        }
        RefKind::Tag(name) => non_empty(Some(name.as_str())).map(|n| resolved(n, BranchSource::Tag)),
        RefKind::Other => match lookup {
            Some(lookup) => {
                let name = lookup.default_branch(repo).await?;
                non_empty(Some(name.as_str())).map(|n| resolved(n, BranchSource::DefaultBranch))
            }
            None => {
                warn!(
                    %repo,
                    fallback,
                    "no repository token available to look up the default branch, \
                     assuming '{fallback}'; this may be incorrect"
                );
                non_empty(Some(fallback)).map(|n| resolved(n, BranchSource::Fallback))
            }
        },
    };

    Ok(branch)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn resolved(name: &str, source: BranchSource) -> ResolvedBranch {
    ResolvedBranch {
        name: name.to_string(),
        source,
    }
}
