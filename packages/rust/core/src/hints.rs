//! User-facing failure messages.

use autodesc_shared::{AuthService, AutoDescError, DocumentSource};

/// Build the single consolidated failure message for a run.
///
/// The error text comes first, followed by tab-indented troubleshooting hints.
pub fn failure_message(err: &AutoDescError, source: &DocumentSource) -> String {
    let mut message = format!("Action failed with error: {err}.");

    if let AutoDescError::Auth { raw: Some(raw), .. } = err {
        message.push('\n');
        message.push_str(raw);
    }

    for hint in hints(err, source) {
        message.push_str("\n\t");
        message.push_str(&hint);
    }

    message.trim().to_string()
}

/// Troubleshooting hints for an error, most specific first.
pub fn hints(err: &AutoDescError, source: &DocumentSource) -> Vec<String> {
    let mut help = Vec::new();

    match err {
        AutoDescError::Io { .. } => {
            help.push("Did you add `uses: actions/checkout@v4` to your workflow?".to_string());
            help.push(format!(
                "Did you use the correct path in the config? Path specified: {source}"
            ));
        }
        AutoDescError::Auth {
            service: AuthService::Modrinth,
            ..
        } => {
            help.push(
                "Check that the `auth-token` input holds a Modrinth personal access token \
                 with permission to write projects."
                    .to_string(),
            );
        }
        AutoDescError::Auth {
            service: AuthService::GitHub,
            ..
        } => {
            help.push(
                "Check that the `repo-token` input holds a GitHub token that can read \
                 this repository, or set the `branch` input to skip the lookup."
                    .to_string(),
            );
        }
        AutoDescError::Structural { .. } => {
            help.push(
                "Every `<!-- MODRINTH_EXCLUDE_START -->` needs a matching \
                 `<!-- MODRINTH_EXCLUDE_END -->` after it."
                    .to_string(),
            );
        }
        _ => {}
    }

    help.push(
        "If you are unable to find a solution, or you believe that this is a bug, \
         you may file an issue with the autodesc maintainers."
            .to_string(),
    );

    help
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> DocumentSource {
        DocumentSource::parse("docs/README.md")
    }

    #[test]
    fn io_error_suggests_checkout() {
        let err = AutoDescError::io(
            "docs/README.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        );
        let message = failure_message(&err, &source());

        assert!(message.starts_with("Action failed with error: I/O error"));
        assert!(message.contains("\n\tDid you add `uses: actions/checkout"));
        assert!(message.contains("Path specified: docs/README.md"));
        assert!(message.ends_with("autodesc maintainers."));
    }

    #[test]
    fn auth_error_includes_raw_body() {
        let err = AutoDescError::auth(
            AuthService::Modrinth,
            "Unauthorised access to API.",
            Some("{\"error\": 1}".into()),
        );
        let message = failure_message(&err, &source());
        assert!(message.contains("{\"error\": 1}"));
        assert!(message.contains("auth-token"));
        assert!(!message.contains("repo-token"));
    }

    #[test]
    fn github_auth_error_points_at_repo_token() {
        let err = AutoDescError::auth(
            AuthService::GitHub,
            "GitHub rejected the repository token while looking up the default branch",
            None,
        );
        let message = failure_message(&err, &source());
        assert!(message.contains("repo-token"));
        assert!(!message.contains("auth-token"));
    }

    #[test]
    fn generic_error_only_has_issue_hint() {
        let err = AutoDescError::Network("timed out".into());
        let hints = hints(&err, &source());
        assert_eq!(hints.len(), 1);
    }
}
