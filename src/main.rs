//! Duel Arena headless runner
//!
//! Loads the character roster and plays one bot-vs-bot battle, logging
//! events and periodic snapshots.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use duel_arena::catalog::Roster;
use duel_arena::config::Config;
use duel_arena::runner::run_match;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    info!("Starting Duel Arena");
    info!(path = %config.catalog_path.display(), "Loading roster");

    let roster = Roster::load(&config.catalog_path)?;
    info!(characters = roster.len(), "Roster loaded");

    let summary = run_match(&config, roster, shutdown_signal()).await?;
    info!(
        battle_id = %summary.battle_id,
        ticks = summary.ticks,
        winner = summary.winner.as_deref().unwrap_or("none"),
        stop = ?summary.stop,
        "Runner finished"
    );
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Resolves on Ctrl+C or SIGTERM. If a handler cannot be installed, that
/// branch never resolves and the other one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping battle");
        }
        _ = terminate => {
            info!("Received terminate signal, stopping battle");
        }
    }
}
