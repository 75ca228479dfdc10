use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_GOTIFY_URL: &str = "http://localhost:8080";
pub const DEFAULT_GOTIFY_TOKEN: &str = "your-token-here";
pub const DEFAULT_LISTEN_PORT: &str = "8081";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gotify: GotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_port: String,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("0.0.0.0:{}", self.listen_port)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GotifyConfig {
    pub url: String,
    pub token: String,
    /// Upper bound on a single outbound delivery, connect through response headers.
    pub timeout: Duration,
}

// The token is a credential; keep it out of `{:?}` output.
impl std::fmt::Debug for GotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GotifyConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn load() -> crate::Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let config = Config {
            server: ServerConfig {
                listen_port: var("LISTEN_PORT", DEFAULT_LISTEN_PORT),
            },
            gotify: GotifyConfig {
                url: var("GOTIFY_URL", DEFAULT_GOTIFY_URL),
                token: var("GOTIFY_TOKEN", DEFAULT_GOTIFY_TOKEN),
                timeout: Duration::from_secs(
                    lookup("GOTIFY_TIMEOUT_SECS")
                        .and_then(|s| s.trim().parse().ok())
                        .unwrap_or(DEFAULT_TIMEOUT_SECS),
                ),
            },
        };

        config.validate()?;

        if config.gotify.token == DEFAULT_GOTIFY_TOKEN {
            tracing::warn!("GOTIFY_TOKEN is not set. Gotify will reject messages sent with the placeholder token.");
        }

        Ok(config)
    }

    fn validate(&self) -> crate::Result<()> {
        let url = Url::parse(&self.gotify.url).map_err(|e| {
            crate::Error::Config(format!("GOTIFY_URL '{}' is not a valid URL: {}", self.gotify.url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(crate::Error::Config(format!(
                "GOTIFY_URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.server.listen_port.parse::<u16>().is_err() {
            return Err(crate::Error::Config(format!(
                "LISTEN_PORT '{}' is not a valid port",
                self.server.listen_port
            )));
        }

        if self.gotify.timeout.is_zero() {
            return Err(crate::Error::Config(
                "GOTIFY_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                listen_port: DEFAULT_LISTEN_PORT.to_string(),
            },
            gotify: GotifyConfig {
                url: DEFAULT_GOTIFY_URL.to_string(),
                token: DEFAULT_GOTIFY_TOKEN.to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
        }
    }
}
