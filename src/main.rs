//! Fetches the Actions dashboard of `GITHUB_REPOSITORY` once and prints it as JSON.

use std::io::{self, Write as _};

use actions_monitor::{Config, dashboard::Dashboard, github::GitHubClient};
use anyhow::Context as _;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("actions_monitor=info"));
    drop(
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_target(false)
            .with_env_filter(filter)
            .try_init(),
    );
}

fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let run_limit = config.run_limit;
    let client = GitHubClient::new(config)?;

    let dashboard = Dashboard::refresh(&client, run_limit)
        .with_context(|| format!("failed to refresh dashboard of {}", client.repository()))?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &dashboard).context("failed to write dashboard")?;
    writeln!(stdout).context("failed to write dashboard")?;
    Ok(())
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!("{err:#}");
        std::process::exit(1);
    }
}
