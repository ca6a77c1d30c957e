use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hashsync_core::{
    load_config, validate_config, CandidateSource, Config, DebridClient, HashListIndex,
    ProxyRotation, SyncRunner, TraktClient, UpgradeScanner,
};
use hashsync_server::api::create_router;
use hashsync_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("hashsync v{}", VERSION);

    // Determine config path
    let config_path = std::env::var("HASHSYNC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    let shutdown = CancellationToken::new();
    let (sync_runner, upgrade_scanner) = build_runners(&config).await?;

    let state = Arc::new(AppState::new(
        config.clone(),
        sync_runner,
        upgrade_scanner,
        shutdown.clone(),
    ));

    let scan_loop = if config.scan.interval_secs > 0 && state.upgrades_configured() {
        info!(
            "Periodic upgrade scan every {}s",
            config.scan.interval_secs
        );
        Some(tokio::spawn(periodic_scan(
            Arc::clone(&state),
            Duration::from_secs(config.scan.interval_secs),
        )))
    } else {
        if config.scan.interval_secs > 0 {
            warn!("Periodic scan requested but hash list or debrid is not configured");
        }
        None
    };

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            signal_token.cancel();
        })
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    shutdown.cancel();
    if let Some(handle) = scan_loop {
        if let Err(e) = handle.await {
            warn!("Scan loop ended abnormally: {}", e);
        }
        info!("Periodic scan stopped");
    }

    Ok(())
}

/// Wire the configured collaborators into runners.
///
/// Sync needs watchlist, hash list and debrid; scanning needs hash list and
/// debrid. Missing sections leave the corresponding runner unset.
async fn build_runners(config: &Config) -> Result<(Option<SyncRunner>, Option<UpgradeScanner>)> {
    let rotation = ProxyRotation::new(config.proxy.endpoints.clone());
    if !rotation.is_empty() {
        info!("Proxy fallback over {} endpoints", rotation.endpoints().len());
    }

    let candidates: Option<Arc<dyn CandidateSource>> = match &config.hashlist {
        Some(hashlist) => {
            let index = HashListIndex::load(&hashlist.path)
                .await
                .with_context(|| format!("Failed to load hash list {:?}", hashlist.path))?;
            info!(
                "Hash list loaded: {} entries ({} lines skipped)",
                index.len(),
                index.skipped()
            );
            Some(Arc::new(index) as Arc<dyn CandidateSource>)
        }
        None => {
            info!("Hash list not configured");
            None
        }
    };

    let debrid = match &config.debrid {
        Some(debrid_config) => {
            info!("Initializing debrid client at {}", debrid_config.url);
            Some(Arc::new(
                DebridClient::new(debrid_config.clone(), rotation.clone())
                    .context("Failed to create debrid client")?,
            ))
        }
        None => {
            info!("Debrid not configured");
            None
        }
    };

    let watchlist = match &config.watchlist {
        Some(watchlist_config) => {
            info!(
                "Initializing watchlist client for user '{}'",
                watchlist_config.username
            );
            Some(Arc::new(
                TraktClient::new(watchlist_config.clone(), rotation)
                    .context("Failed to create watchlist client")?,
            ))
        }
        None => {
            info!("Watchlist not configured");
            None
        }
    };

    let upgrade_scanner = match (&candidates, &debrid) {
        (Some(candidates), Some(debrid)) => Some(UpgradeScanner::new(
            debrid.clone(),
            Arc::clone(candidates),
            debrid.clone(),
        )),
        _ => None,
    };

    let sync_runner = match (watchlist, &candidates, &debrid) {
        (Some(watchlist), Some(candidates), Some(debrid)) => Some(SyncRunner::new(
            watchlist,
            Arc::clone(candidates),
            debrid.clone(),
        )),
        _ => None,
    };

    info!(
        "Sync {}, upgrade scan {}",
        if sync_runner.is_some() { "enabled" } else { "disabled" },
        if upgrade_scanner.is_some() { "enabled" } else { "disabled" }
    );

    Ok((sync_runner, upgrade_scanner))
}

/// Scan on a fixed interval until shutdown.
async fn periodic_scan(state: Arc<AppState>, interval: Duration) {
    let token = state.shutdown_token();
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; skip it so the first scan waits.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                if let Some(report) = state.run_upgrade_scan(state.preferences()).await {
                    info!(
                        "Periodic scan: {} checked, {} upgrades, {} submitted",
                        report.torrents_checked, report.upgrades_found, report.upgrades_submitted
                    );
                }
            }
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
