use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use league_sync::{
    config::{self, DEFAULT_BASE_URL},
    events::WordPressClient,
    sync::Syncer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
/// Mirrors the league schedules of the configured teams into the club
/// website's event calendar.
///
/// For every team the league pages are scraped for venue names and cancelled
/// games, the team's calendar feed is read, and the league's events on the
/// website are replaced with the result.
struct Args {
    /// WordPress username
    #[arg(long, short = 'u')]
    wp_user: String,

    /// WordPress password
    #[arg(long = "wp-password", short = 'p')]
    wp_password: String,

    /// Only scrape and parse, don't write anything to the website
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Base URL of the WordPress site
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// JSON file with the teams to sync. If missing, the built-in teams are used
    #[arg(long, value_name = "FILE")]
    teams: Option<PathBuf>,

    /// Write the parsed games and venues of every team to this JSON file
    #[arg(long, value_name = "FILE")]
    dump: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| ["sync=info", "league_sync=info"].join(",").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let teams = config::load_teams(args.teams.as_deref())?;

    let publisher = if args.dry_run {
        info!("dry run, nothing will be written");
        None
    } else {
        let base_url = config::base_url(&args.base_url)?;
        Some(WordPressClient::new(
            &base_url,
            args.wp_user.trim(),
            args.wp_password.trim(),
        )?)
    };
    let syncer = Syncer::new(publisher)?;

    // one team at a time, the first failure aborts the run
    let mut leagues = Vec::with_capacity(teams.len());
    for team in &teams {
        leagues.push(syncer.sync_team(team).await?);
    }

    if let Some(path) = args.dump {
        let json = serde_json::to_string_pretty(&leagues)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote parsed schedules");
    }

    Ok(())
}
