use std::time::Duration;

use crate::expiry::DEFAULT_INTERVAL;

/// Errors raised while reading scheduler settings from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Request expiry scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryConfig {
    /// Whether the hosting process should run the scheduler at all.
    pub enabled: bool,
    /// Time between scans.
    pub interval: Duration,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl ExpiryConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default |
    /// |--------------------------------|---------|
    /// | `REQUEST_EXPIRY_ENABLED`       | `true`  |
    /// | `REQUEST_EXPIRY_INTERVAL_SECS` | `300`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("REQUEST_EXPIRY_ENABLED") {
            config.enabled = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "REQUEST_EXPIRY_ENABLED",
                        expected: "a boolean",
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup("REQUEST_EXPIRY_INTERVAL_SECS") {
            let secs: u64 = value
                .trim()
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "REQUEST_EXPIRY_INTERVAL_SECS",
                    expected: "a positive integer",
                    value: value.clone(),
                })?;
            config.interval = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
