use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use vcs_update_check::config::{CheckerConfig, log_path};
use vcs_update_check::vcs::checker::UpdateChecker;
use vcs_update_check::vcs::error::VcsError;
use vcs_update_check::vcs::types::{Credentials, Provider};

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "vcs-update-check")]
#[command(
    version,
    about = "Resolve the latest release of a GitHub, GitLab or Bitbucket repository"
)]
struct Cli {
    /// Repository URL, e.g. https://gitlab.com/group/project
    repository_url: String,

    /// Branch to check (defaults to the configured default branch)
    #[arg(short, long)]
    branch: Option<String>,

    /// Hosting provider (github, gitlab, bitbucket); detected from the URL when omitted
    #[arg(short, long)]
    provider: Option<Provider>,

    /// Access token for private repositories
    #[arg(long, env = "VCS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Branch scanned for version tags
    #[arg(long)]
    default_branch: Option<String>,

    /// Ignore the readme's "Stable tag" header
    #[arg(long)]
    no_stable_tag: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Write logs to the data directory instead of stderr
    #[arg(long)]
    log_file: bool,
}

fn init_logging(format: LogFormat, to_file: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = if to_file {
        let path = log_path();
        let dir = path.parent().context("log path has no parent directory")?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {dir:?}"))?;
        let file_name = path.file_name().context("log path has no file name")?;
        let (non_blocking, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
        (BoxMakeWriter::new(non_blocking), Some(guard))
    } else {
        (BoxMakeWriter::new(std::io::stderr), None)
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(!to_file);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(guard)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_format, cli.log_file)?;

    let mut config = match &cli.config {
        Some(path) => CheckerConfig::load(path)?,
        None => CheckerConfig::default(),
    };
    if let Some(default_branch) = cli.default_branch {
        config.default_branch = default_branch;
    }
    if cli.no_stable_tag {
        config.stable_tag = false;
    }

    let repository_url = cli.repository_url;
    let provider = cli.provider;
    let branch = cli
        .branch
        .unwrap_or_else(|| config.default_branch.clone());
    let credentials = cli.token.map(Credentials::new);
    let checker = UpdateChecker::new(&config);

    let reference = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let api = checker.client(&repository_url, provider, credentials)?;
            Ok::<_, VcsError>(checker.check_api(api.as_ref(), &branch).await)
        })?;

    println!("{}", serde_json::to_string_pretty(&reference)?);
    Ok(())
}
