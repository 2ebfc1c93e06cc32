//! # Configuration Management
//!
//! Loads relay configuration from three layered sources:
//! - Built-in defaults (the `Default` impl below)
//! - An optional `config.toml` next to the binary
//! - Environment variables (with `APP_` prefix, plus a few well-known
//!   unprefixed ones used by deployment platforms and the Deepgram SDKs)
//!
//! The one non-negotiable value is the Deepgram credential: `validate()`
//! rejects an empty `provider.api_key`, which aborts startup. Every other
//! value has a usable default.
//!
//! ## Configuration Priority (highest to lowest):
//! 1. `DEEPGRAM_API_KEY`, `HOST`, `PORT` environment variables
//! 2. `APP_*` prefixed environment variables
//! 3. Configuration file (config.toml)
//! 4. Default values

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

use crate::transcription::deepgram::DEFAULT_BASE_URL;

/// Top-level relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
}

/// HTTP listener settings.
///
/// The default binds `0.0.0.0:8000` so the browser extension can reach the
/// relay from outside a container without extra flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Deepgram connection settings.
///
/// `api_key` is deliberately defaulted to empty and filled from the
/// environment; keeping secrets out of config.toml means the file can be
/// committed. `base_url` exists so tests can point the client at a dead
/// address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            provider: ProviderConfig {
                api_key: String::new(),
                base_url: DEFAULT_BASE_URL.to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources in priority order.
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("_"));

        // Unprefixed variables used by deployment platforms
        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        // The credential variable every Deepgram SDK reads
        if let Ok(api_key) = env::var("DEEPGRAM_API_KEY") {
            settings = settings.set_override("provider.api_key", api_key)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate the loaded configuration. A missing credential is fatal
    /// here rather than on the first request.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.provider.api_key.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "Missing DEEPGRAM_API_KEY (set it in the environment or provider.api_key in config.toml)"
            ));
        }

        if self.provider.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("Provider base URL cannot be empty"));
        }

        Ok(())
    }
}
