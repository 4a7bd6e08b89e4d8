//! Gratia daemon — entry point for the API server and batch commands.

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use gratia_api::{ApiConfig, AppState};
use gratia_metrics::MetricsRefresher;
use gratia_oracle::HttpOracle;
use gratia_rail::{HttpRail, StablecoinRail};
use gratia_store::Store;
use gratia_store_lmdb::{environment::DEFAULT_MAP_SIZE, LmdbStore};
use gratia_verification::VerificationEngine;

use config::GratiaConfig;

#[derive(Parser)]
#[command(name = "gratia-daemon", about = "Gratia event pipeline daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory for LMDB storage.
    #[arg(long, env = "GRATIA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Address for the API server.
    #[arg(long, env = "GRATIA_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// Shared secret for internal endpoints.
    #[arg(long, env = "GRATIA_WEBHOOK_SECRET")]
    webhook_secret: Option<String>,

    /// HMAC key for the chain provider's signed webhook.
    #[arg(long, env = "GRATIA_CHAIN_WEBHOOK_SECRET")]
    chain_webhook_secret: Option<String>,

    /// Chain oracle base URL.
    #[arg(long, env = "GRATIA_ORACLE_URL")]
    oracle_url: Option<String>,

    /// Chain oracle API key.
    #[arg(long, env = "GRATIA_ORACLE_API_KEY")]
    oracle_api_key: Option<String>,

    /// Stablecoin rail base URL.
    #[arg(long, env = "GRATIA_RAIL_URL")]
    rail_url: Option<String>,

    /// Stablecoin rail API key.
    #[arg(long, env = "GRATIA_RAIL_API_KEY")]
    rail_api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP API server.
    Serve,
    /// Verification batch operations.
    Verify {
        #[command(subcommand)]
        action: VerifyAction,
    },
    /// Creator metrics operations.
    Metrics {
        #[command(subcommand)]
        action: MetricsAction,
    },
}

#[derive(clap::Subcommand)]
enum VerifyAction {
    /// Verify pending records against the oracle.
    Process {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Reset failed records to pending and re-verify them.
    Retry {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show per-status record counts.
    Stats,
}

#[derive(clap::Subcommand)]
enum MetricsAction {
    /// Recompute every creator's reputation snapshot.
    Refresh,
}

fn load_config(cli: &Cli) -> GratiaConfig {
    let mut config = if let Some(path) = &cli.config {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<GratiaConfig>(&contents) {
                Ok(config) => {
                    tracing::info!("loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("failed to parse config file: {e}, using defaults");
                    GratiaConfig::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "failed to read config file {}: {e}, using defaults",
                    path.display()
                );
                GratiaConfig::default()
            }
        }
    } else {
        GratiaConfig::default()
    };

    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(listen_addr) = &cli.listen_addr {
        config.listen_addr = listen_addr.clone();
    }
    if let Some(secret) = &cli.webhook_secret {
        config.webhook_secret = secret.clone();
    }
    if let Some(secret) = &cli.chain_webhook_secret {
        config.chain_webhook_secret = secret.clone();
    }
    if let Some(url) = &cli.oracle_url {
        config.oracle.base_url = url.clone();
    }
    if let Some(key) = &cli.oracle_api_key {
        config.oracle.api_key = key.clone();
    }
    if let Some(url) = &cli.rail_url {
        config.rail.base_url = url.clone();
    }
    if let Some(key) = &cli.rail_api_key {
        config.rail.api_key = key.clone();
    }
    config
}

fn open_store(config: &GratiaConfig) -> anyhow::Result<Arc<LmdbStore>> {
    let store = LmdbStore::open(&config.data_dir, DEFAULT_MAP_SIZE)
        .with_context(|| format!("opening LMDB store at {}", config.data_dir.display()))?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gratia_utils::init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli);

    match cli.command {
        Command::Serve => {
            let store = open_store(&config)?;
            let oracle = Arc::new(HttpOracle::new(&config.oracle)?);
            let rail = Arc::new(HttpRail::new(&config.rail)?);

            if let Err(e) = rail.health().await {
                tracing::warn!(error = %e, "stablecoin rail health check failed");
            }

            let state = AppState::new(
                store,
                oracle,
                rail,
                ApiConfig {
                    webhook_secret: config.webhook_secret.clone(),
                    chain_webhook_secret: config.chain_webhook_secret.clone(),
                },
            )?;

            let addr: SocketAddr = config
                .listen_addr
                .parse()
                .with_context(|| format!("invalid listen address {}", config.listen_addr))?;
            tracing::info!(
                data_dir = %config.data_dir.display(),
                %addr,
                "starting gratia API server"
            );
            gratia_api::serve(addr, Arc::new(state)).await?;
        }
        Command::Verify { action } => {
            let store: Arc<dyn Store> = open_store(&config)?;
            let oracle = Arc::new(HttpOracle::new(&config.oracle)?);
            let engine = VerificationEngine::new(store, oracle);

            match action {
                VerifyAction::Process { limit } => {
                    let outcomes = engine.process_pending(limit).await?;
                    println!("{}", serde_json::to_string_pretty(&outcomes)?);
                }
                VerifyAction::Retry { limit } => {
                    let outcomes = engine.retry_failed(limit).await?;
                    println!("{}", serde_json::to_string_pretty(&outcomes)?);
                }
                VerifyAction::Stats => {
                    let stats = engine.stats()?;
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                }
            }
        }
        Command::Metrics { action } => {
            let store: Arc<dyn Store> = open_store(&config)?;
            match action {
                MetricsAction::Refresh => {
                    let summary = MetricsRefresher::new(store).refresh()?;
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
            }
        }
    }

    Ok(())
}
