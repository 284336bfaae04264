//! CLI definition, run config assembly, and tracing setup.

use std::path::PathBuf;

use clap::Parser;
use clap::builder::FalseyValueParser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;

use autodesc_core::{RunOutcome, failure_message};
use autodesc_shared::{AppConfig, DocumentSource, RepoCoordinate, RunConfig, Slug, load_config};

use crate::actions;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// autodesc — keep a Modrinth project description in sync with a README.
#[derive(Parser, Debug)]
#[command(
    name = "autodesc",
    version,
    about = "Publish a README as a Modrinth project description.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Modrinth personal access token.
    #[arg(long, env = "INPUT_AUTH-TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Project slug or project URL.
    #[arg(long, env = "INPUT_SLUG")]
    pub slug: String,

    /// Project name used in the User-Agent.
    #[arg(long, env = "INPUT_PROJECT-NAME")]
    pub project_name: Option<String>,

    /// Path or URL of the README.
    #[arg(long, env = "INPUT_README", default_value = "README.md")]
    pub readme: String,

    /// GitHub token for looking up the default branch.
    #[arg(long, env = "INPUT_REPO-TOKEN", hide_env_values = true)]
    pub repo_token: Option<String>,

    /// Branch that relative images should point at.
    #[arg(long, env = "INPUT_BRANCH")]
    pub branch: Option<String>,

    /// Rewrite relative image links to absolute raw URLs.
    #[arg(long, env = "INPUT_REWRITE-LINKS", value_parser = FalseyValueParser::new())]
    pub rewrite_links: bool,

    /// Repository as `owner/repo`.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Ref that triggered the run.
    #[arg(long, env = "GITHUB_REF")]
    pub git_ref: Option<String>,

    /// Pull request source branch.
    #[arg(long, env = "GITHUB_HEAD_REF")]
    pub head_ref: Option<String>,

    /// Root of the repository checkout.
    #[arg(long, env = "GITHUB_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Optional TOML config file.
    #[arg(long, env = "AUTODESC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the payload instead of sending it.
    #[arg(long, env = "INPUT_DRY-RUN", value_parser = FalseyValueParser::new())]
    pub dry_run: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "autodesc=info",
        1 => "autodesc=debug",
        _ => "autodesc=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Run config assembly
// ---------------------------------------------------------------------------

/// Treat empty CI inputs as unset.
fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Merge CLI inputs over the config file into a [`RunConfig`].
pub(crate) fn build_run_config(cli: &Cli, app: &AppConfig) -> Result<RunConfig> {
    let slug = Slug::parse(&cli.slug)?;
    let source = DocumentSource::parse(&cli.readme);

    let repository = present(cli.repository.as_deref())
        .map(|r| r.parse::<RepoCoordinate>())
        .transpose()?;

    let mut config = RunConfig::new(
        app,
        cli.auth_token.clone().unwrap_or_default(),
        slug,
        source,
    );
    config.project_name = present(cli.project_name.as_deref());
    config.repo_token = present(cli.repo_token.as_deref());
    config.branch = present(cli.branch.as_deref());
    config.rewrite_links = cli.rewrite_links;
    config.repository = repository;
    config.git_ref = present(cli.git_ref.as_deref());
    config.head_ref = present(cli.head_ref.as_deref());
    config.workspace = cli
        .workspace
        .clone()
        .or_else(|| std::env::current_dir().ok());
    config.dry_run = cli.dry_run;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let app = load_config(cli.config.as_deref())?;
    let config = build_run_config(&cli, &app)?;

    info!(
        slug = %config.slug,
        source = %config.source,
        rewrite_links = config.rewrite_links,
        dry_run = config.dry_run,
        "starting run"
    );

    match autodesc_core::run(&config).await {
        Ok(outcome) => report(&outcome),
        Err(err) => {
            let message = failure_message(&err, &config.source);
            actions::error(&message);
            Err(eyre!(message))
        }
    }
}

fn report(outcome: &RunOutcome) -> Result<()> {
    for warning in &outcome.prepared.warnings {
        actions::warning(warning);
    }

    if let Some(raw_url) = &outcome.prepared.raw_url {
        actions::set_output("raw-url", raw_url.as_str())?;
    }

    if !outcome.published {
        println!("{}", serde_json::to_string_pretty(&outcome.prepared.payload)?);
    }

    Ok(())
}
