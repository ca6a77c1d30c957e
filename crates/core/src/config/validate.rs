use super::{types::Config, ConfigError};
use crate::matching::Preferences;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Upgrade match limit is positive
/// - Size cap is positive when set
/// - Credentials are present for configured services
/// - Proxy endpoints are http(s) URLs
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    validate_preferences(&config.preferences)?;

    if let Some(debrid) = &config.debrid {
        if debrid.api_token.trim().is_empty() {
            return Err(invalid("debrid.api_token cannot be empty"));
        }
    }

    if let Some(watchlist) = &config.watchlist {
        if watchlist.client_id.trim().is_empty() {
            return Err(invalid("watchlist.client_id cannot be empty"));
        }
    }

    for endpoint in &config.proxy.endpoints {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "proxy endpoint '{}' is not an http(s) URL",
                endpoint
            )));
        }
    }

    Ok(())
}

/// Validate a preference set, from config or from an API request body.
pub fn validate_preferences(prefs: &Preferences) -> Result<(), ConfigError> {
    if prefs.max_upgrade_matches == 0 {
        return Err(invalid("preferences.max_upgrade_matches must be at least 1"));
    }
    if let Some(size) = prefs.max_size {
        if !size.amount.is_finite() || size.amount <= 0.0 {
            return Err(invalid("preferences.max_size must be positive"));
        }
    }
    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DebridConfig, ProxyConfig, ServerConfig, WatchlistConfig};
    use crate::metadata::ReleaseSize;

    fn valid_config() -> Config {
        Config {
            debrid: Some(DebridConfig {
                url: "http://localhost".to_string(),
                api_token: "token".to_string(),
                timeout_secs: 30,
            }),
            watchlist: Some(WatchlistConfig {
                url: "http://localhost".to_string(),
                client_id: "client".to_string(),
                access_token: None,
                username: "me".to_string(),
                timeout_secs: 30,
            }),
            ..Config::default()
        }
    }

    fn assert_invalid(config: &Config) {
        let result = validate_config(config);
        assert!(
            matches!(result, Err(ConfigError::ValidationError(_))),
            "{:?}",
            result
        );
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                port: 0,
                ..ServerConfig::default()
            },
            ..valid_config()
        };
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_max_upgrade_matches_zero_fails() {
        let mut config = valid_config();
        config.preferences.max_upgrade_matches = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_non_positive_size_fails() {
        let mut config = valid_config();
        config.preferences.max_size = Some(ReleaseSize::gb(0.0));
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_preferences_alone() {
        assert!(validate_preferences(&Preferences::default()).is_ok());

        let prefs = Preferences {
            max_size: Some(ReleaseSize::gb(-5.0)),
            ..Preferences::default()
        };
        assert!(matches!(
            validate_preferences(&prefs),
            Err(ConfigError::ValidationError(ref m)) if m.contains("max_size")
        ));

        let prefs = Preferences {
            max_upgrade_matches: 0,
            ..Preferences::default()
        };
        assert!(validate_preferences(&prefs).is_err());
    }

    #[test]
    fn test_validate_empty_credentials_fail() {
        let mut config = valid_config();
        if let Some(debrid) = config.debrid.as_mut() {
            debrid.api_token = "  ".to_string();
        }
        assert_invalid(&config);

        let mut config = valid_config();
        if let Some(watchlist) = config.watchlist.as_mut() {
            watchlist.client_id.clear();
        }
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_proxy_endpoints() {
        let config = Config {
            proxy: ProxyConfig {
                endpoints: vec!["ftp://proxy".to_string()],
            },
            ..valid_config()
        };
        assert_invalid(&config);

        let config = Config {
            proxy: ProxyConfig {
                endpoints: vec!["https://proxy.example/?url=".to_string()],
            },
            ..valid_config()
        };
        assert!(validate_config(&config).is_ok());
    }
}
