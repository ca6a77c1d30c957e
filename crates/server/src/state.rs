use std::sync::Arc;

use hashsync_core::{
    Config, Preferences, SanitizedConfig, SyncReport, SyncRunner, UpgradeReport, UpgradeScanner,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Shared application state
pub struct AppState {
    config: Config,
    sync_runner: Option<SyncRunner>,
    upgrade_scanner: Option<UpgradeScanner>,
    /// Held for the duration of a run so sync and scan never overlap.
    run_lock: Mutex<()>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        config: Config,
        sync_runner: Option<SyncRunner>,
        upgrade_scanner: Option<UpgradeScanner>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            sync_runner,
            upgrade_scanner,
            run_lock: Mutex::new(()),
            shutdown,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Preferences from config, used when a request carries none.
    pub fn preferences(&self) -> &Preferences {
        &self.config.preferences
    }

    pub fn sync_configured(&self) -> bool {
        self.sync_runner.is_some()
    }

    pub fn upgrades_configured(&self) -> bool {
        self.upgrade_scanner.is_some()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run one sync pass. `None` when sync is not configured.
    pub async fn run_sync(&self, prefs: &Preferences) -> Option<SyncReport> {
        let runner = self.sync_runner.as_ref()?;
        let _guard = self.run_lock.lock().await;
        Some(runner.run(prefs, &self.shutdown).await)
    }

    /// Run one upgrade scan. `None` when scanning is not configured.
    pub async fn run_upgrade_scan(&self, prefs: &Preferences) -> Option<UpgradeReport> {
        let scanner = self.upgrade_scanner.as_ref()?;
        let _guard = self.run_lock.lock().await;
        Some(scanner.scan(prefs, &self.shutdown).await)
    }
}
