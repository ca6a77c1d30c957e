use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::matching::Preferences;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Preferences used when a request does not carry its own.
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub debrid: Option<DebridConfig>,
    #[serde(default)]
    pub watchlist: Option<WatchlistConfig>,
    #[serde(default)]
    pub hashlist: Option<HashListConfig>,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Debrid service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebridConfig {
    /// REST base URL
    #[serde(default = "default_debrid_url")]
    pub url: String,
    /// Bearer token
    pub api_token: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_debrid_url() -> String {
    "https://api.real-debrid.com/rest/1.0".to_string()
}

/// Watchlist service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatchlistConfig {
    #[serde(default = "default_watchlist_url")]
    pub url: String,
    /// Application client id, sent as the API key header
    pub client_id: String,
    /// OAuth access token, needed for private watchlists
    #[serde(default)]
    pub access_token: Option<String>,
    /// Watchlist owner (`me` is the token's user)
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_watchlist_url() -> String {
    "https://api.trakt.tv".to_string()
}

fn default_username() -> String {
    "me".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Hash list file configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HashListConfig {
    pub path: PathBuf,
}

/// Proxy fallback configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Prefix endpoints tried in order when a direct request fails
    #[serde(default)]
    pub endpoints: Vec<String>,
}

/// Periodic upgrade scan configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Seconds between scans, 0 disables the periodic scan
    #[serde(default)]
    pub interval_secs: u64,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub preferences: Preferences,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debrid: Option<SanitizedDebridConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watchlist: Option<SanitizedWatchlistConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashlist: Option<HashListConfig>,
    pub proxy: ProxyConfig,
    pub scan: ScanConfig,
}

/// Sanitized debrid config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDebridConfig {
    pub url: String,
    pub api_token_configured: bool,
    pub timeout_secs: u32,
}

/// Sanitized watchlist config (credentials hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedWatchlistConfig {
    pub url: String,
    pub client_id_configured: bool,
    pub access_token_configured: bool,
    pub username: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            preferences: config.preferences.clone(),
            debrid: config.debrid.as_ref().map(|d| SanitizedDebridConfig {
                url: d.url.clone(),
                api_token_configured: !d.api_token.is_empty(),
                timeout_secs: d.timeout_secs,
            }),
            watchlist: config.watchlist.as_ref().map(|w| SanitizedWatchlistConfig {
                url: w.url.clone(),
                client_id_configured: !w.client_id.is_empty(),
                access_token_configured: w
                    .access_token
                    .as_ref()
                    .is_some_and(|t| !t.is_empty()),
                username: w.username.clone(),
                timeout_secs: w.timeout_secs,
            }),
            hashlist: config.hashlist.clone(),
            proxy: config.proxy.clone(),
            scan: config.scan.clone(),
        }
    }
}
