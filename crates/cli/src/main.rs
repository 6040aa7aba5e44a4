use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snatcher_core::{
    create_captcha_solver, load_config, validate_config, CaptchaSolver, CredentialStore,
    Credentials, HistoryStore, Orchestrator, OrchestratorConfig, SanitizedConfig, SessionManager,
    SessionStore, StaticCredentialStore,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log into the tracker, grab every new seeded torrent from the listing page.
#[derive(Debug, Parser)]
#[command(name = "snatcher", version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "SNATCHER_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Fetch and filter the listing without downloading or recording anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("snatcher {}", VERSION);

    // Load configuration
    info!("Loading configuration from {:?}", args.config);
    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration: {:?}", SanitizedConfig::from(&config));

    // The solver model is loaded once, before any network traffic.
    let solver: Arc<dyn CaptchaSolver> = Arc::from(
        create_captcha_solver(&config.captcha).context("Failed to load CAPTCHA solver")?,
    );
    info!("Using CAPTCHA solver: {}", solver.name());

    let credentials: Arc<dyn CredentialStore> = Arc::new(StaticCredentialStore::new(
        Credentials::from(&config.credentials),
    ));

    let session = SessionManager::new(
        &config.tracker,
        SessionStore::new(&config.storage.session_path),
    )
    .context("Failed to set up tracker session")?;

    let history = HistoryStore::load(&config.storage.history_path)
        .await
        .context("Failed to load download history")?;
    info!(
        "Loaded {} history entries from {:?}",
        history.len(),
        history.path()
    );

    let orchestrator_config = OrchestratorConfig::from(&config).with_dry_run(args.dry_run);
    let mut orchestrator =
        Orchestrator::new(orchestrator_config, session, credentials, solver, history);

    let summary = orchestrator.run().await.context("Run failed")?;

    info!(
        session = ?summary.session,
        listed = summary.listed,
        already_known = summary.already_known,
        unhealthy = summary.unhealthy,
        selected = summary.selected.len(),
        downloaded = summary.downloaded.len(),
        dry_run = summary.dry_run,
        elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
        "Done"
    );
    if !summary.downloaded.is_empty() {
        info!("Downloaded: {}", summary.downloaded.join(", "));
    }

    Ok(())
}
