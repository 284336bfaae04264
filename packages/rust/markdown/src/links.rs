//! Relative image link rewriting.
//!
//! Markdown images with a relative path are rewritten to absolute URLs so they
//! still render once the description is hosted elsewhere. Only the path is
//! replaced; alt text and an optional title are kept as written.

use std::path::{Component, Path};
use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::{Captures, Regex};
use tracing::info;
use url::Url;

use autodesc_shared::{AutoDescError, RepoCoordinate, Result};

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // ![alt](path) or ![alt](path "title")
    Regex::new(r#"!\[([^\]]*)\]\(([^)\s]+)(\s+"[^"]*")?\)"#).expect("valid regex")
});

/// A markdown image reference found in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub alt: String,
    pub path: String,
    pub title: Option<String>,
}

impl ImageReference {
    /// Whether the path is left alone by the rewriter.
    pub fn is_absolute(&self) -> bool {
        is_absolute(&self.path)
    }
}

/// What relative paths are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkBase {
    /// Raw-file URL of a repository ref, plus the document's directory
    /// relative to the repository root.
    Repository { base: Url, document_dir: Vec<String> },
    /// URL the document itself was fetched from.
    Document(Url),
}

impl LinkBase {
    /// Base for a document checked out at `document_path` inside `repo`.
    pub fn repository(
        raw_host: &str,
        repo: &RepoCoordinate,
        branch: &str,
        document_path: &Path,
    ) -> Result<Self> {
        Ok(Self::Repository {
            base: raw_base_url(raw_host, repo, branch)?,
            document_dir: document_dir(document_path),
        })
    }

    /// The absolute URL for `path`.
    fn resolve(&self, path: &str) -> Option<String> {
        match self {
            Self::Repository { base, document_dir } => {
                let joined = join_repo_path(document_dir, path);
                Some(format!("{base}{joined}"))
            }
            Self::Document(url) => url.join(path).ok().map(String::from),
        }
    }
}

/// Raw URL base of the form `https://<raw-host>/<owner>/<repo>/<branch>/`.
///
/// The branch is encoded as a single path component, so `feature/x`
/// becomes `feature%2Fx`.
pub fn raw_base_url(raw_host: &str, repo: &RepoCoordinate, branch: &str) -> Result<Url> {
    let branch = utf8_percent_encode(branch, COMPONENT);
    let raw = format!("https://{raw_host}/{}/{}/{branch}/", repo.owner, repo.repo);
    Url::parse(&raw).map_err(|e| AutoDescError::config(format!("invalid raw URL '{raw}': {e}")))
}

/// All image references in document order.
pub fn image_references(text: &str) -> Vec<ImageReference> {
    IMAGE_RE.captures_iter(text).map(|caps| to_reference(&caps)).collect()
}

/// Rewrite every relative image path in `text` against `base`.
pub fn rewrite_image_links(text: &str, base: &LinkBase) -> String {
    IMAGE_RE
        .replace_all(text, |caps: &Captures| {
            let reference = to_reference(caps);
            if reference.is_absolute() {
                return caps[0].to_string();
            }

            let Some(resolved) = base.resolve(&reference.path) else {
                return caps[0].to_string();
            };

            info!(from = %reference.path, to = %resolved, "rewrote image link");

            let title = reference.title.as_deref().unwrap_or_default();
            format!("![{}]({resolved}{title})", reference.alt)
        })
        .into_owned()
}

fn to_reference(caps: &Captures) -> ImageReference {
    ImageReference {
        alt: caps[1].to_string(),
        path: caps[2].to_string(),
        title: caps.get(3).map(|m| m.as_str().to_string()),
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://")
        || path.starts_with("https://")
        || path.starts_with("//")
        || path.starts_with("data:")
        || path.starts_with('#')
}

/// Directory of the document, as normalised repository-relative segments.
fn document_dir(document_path: &Path) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    if let Some(parent) = document_path.parent() {
        for component in parent.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
                Component::ParentDir => {
                    segments.pop();
                }
                Component::RootDir | Component::Prefix(_) => segments.clear(),
                Component::CurDir => {}
            }
        }
    }
    segments
}

/// Join a markdown path onto the document directory, resolving `.` and `..`.
///
/// A leading `/` starts from the repository root, and `..` never climbs above it.
fn join_repo_path(document_dir: &[String], path: &str) -> String {
    let mut segments: Vec<&str> = if path.starts_with('/') {
        Vec::new()
    } else {
        document_dir.iter().map(String::as_str).collect()
    };

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoCoordinate {
        RepoCoordinate::new("o", "r")
    }

    fn base_in(dir: &str) -> LinkBase {
        LinkBase::Repository {
            base: Url::parse("https://raw.githubusercontent.com/o/r/main/").unwrap(),
            document_dir: dir
                .split('/')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    #[test]
    fn raw_base_url_encodes_branch() {
        let url = raw_base_url("raw.githubusercontent.com", &repo(), "feature/x y").unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/o/r/feature%2Fx%20y/"
        );
    }

    #[test]
    fn rewrites_relative_image_in_document_dir() {
        let result = rewrite_image_links("![x](img.png)", &base_in("docs"));
        assert_eq!(
            result,
            "![x](https://raw.githubusercontent.com/o/r/main/docs/img.png)"
        );
    }

    #[test]
    fn absolute_references_are_unchanged() {
        let input = "![x](https://example.com/img.png) ![y](http://example.com/a.gif)";
        assert_eq!(rewrite_image_links(input, &base_in("docs")), input);
    }

    #[test]
    fn protocol_relative_references_are_unchanged() {
        let input = "![logo](//cdn.example.com/logo.png)";
        assert_eq!(rewrite_image_links(input, &base_in("docs")), input);

        let base = LinkBase::Document(Url::parse("https://example.com/README.md").unwrap());
        assert_eq!(rewrite_image_links(input, &base), input);
    }

    #[test]
    fn data_uris_are_unchanged() {
        let input = "![dot](data:image/png;base64,AAAA)";
        assert_eq!(rewrite_image_links(input, &base_in("")), input);
    }

    #[test]
    fn dot_segments_are_normalised() {
        let result = rewrite_image_links("![a](./../assets/./logo.svg)", &base_in("docs/guide"));
        assert_eq!(
            result,
            "![a](https://raw.githubusercontent.com/o/r/main/docs/assets/logo.svg)"
        );
    }

    #[test]
    fn parent_segments_stop_at_repository_root() {
        let result = rewrite_image_links("![a](../../../logo.png)", &base_in("docs"));
        assert_eq!(result, "![a](https://raw.githubusercontent.com/o/r/main/logo.png)");
    }

    #[test]
    fn leading_slash_is_repository_root() {
        let result = rewrite_image_links("![a](/assets/logo.png)", &base_in("docs"));
        assert_eq!(
            result,
            "![a](https://raw.githubusercontent.com/o/r/main/assets/logo.png)"
        );
    }

    #[test]
    fn title_and_alt_are_preserved() {
        let result = rewrite_image_links(r#"![The logo](logo.png "Logo title")"#, &base_in(""));
        assert_eq!(
            result,
            r#"![The logo](https://raw.githubusercontent.com/o/r/main/logo.png "Logo title")"#
        );
    }

    #[test]
    fn plain_links_are_not_touched() {
        let input = "[docs](docs/index.md)";
        assert_eq!(rewrite_image_links(input, &base_in("")), input);
    }

    #[test]
    fn document_url_base_uses_url_join() {
        let base = LinkBase::Document(
            Url::parse("https://example.com/project/docs/README.md").unwrap(),
        );
        let result = rewrite_image_links("![a](../img/a.png)", &base);
        assert_eq!(result, "![a](https://example.com/project/img/a.png)");
    }

    #[test]
    fn repository_base_from_document_path() {
        let base = LinkBase::repository(
            "raw.githubusercontent.com",
            &repo(),
            "main",
            Path::new("./docs/README.md"),
        )
        .unwrap();
        let result = rewrite_image_links("![x](img.png)", &base);
        assert_eq!(
            result,
            "![x](https://raw.githubusercontent.com/o/r/main/docs/img.png)"
        );
    }

    #[test]
    fn root_readme_has_empty_document_dir() {
        assert!(document_dir(Path::new("README.md")).is_empty());
    }

    #[test]
    fn extracts_references() {
        let refs = image_references(r#"![a](a.png) text ![b](https://x/b.png "t")"#);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].alt, "a");
        assert!(!refs[0].is_absolute());
        assert_eq!(refs[1].title.as_deref(), Some(r#" "t""#));
        assert!(refs[1].is_absolute());
    }
}
