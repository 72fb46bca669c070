// src/config/server.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

const ENV_PATH: &str = "SERVER_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/server.toml";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request timeout for every scraped page.
    pub request_timeout_secs: u64,
    /// Pause after each instrument in a batch.
    pub throttle_ms: u64,
    pub user_agent: String,
    /// Install the Prometheus recorder and expose `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_secs: 10,
            throttle_ms: 1_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            metrics_enabled: false,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML file; missing keys keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading server config from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("parsing server config {}", path.display()))
    }

    /// Load using env var + fallbacks, then apply `HOST` / `PORT` overrides:
    /// 1) $SERVER_CONFIG_PATH
    /// 2) config/server.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("SERVER_CONFIG_PATH points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_PATH).exists() {
            Self::load_from(Path::new(DEFAULT_PATH))?
        } else {
            Self::default()
        };

        if let Ok(host) = env::var("HOST") {
            if !host.trim().is_empty() {
                cfg.host = host.trim().to_string();
            }
        }
        if let Ok(port) = env::var("PORT") {
            cfg.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port:?}"))?;
        }
        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}
