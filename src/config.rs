use crate::lookup::Platform;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path};

const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Env variable consulted when no proxy is configured
const PROXY_ENV: &str = "OPT_PROXY";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP service binds to
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Platform used when a request carries no `type`
    #[serde(default = "default_platform")]
    pub default_platform: Platform,

    /// Redirects followed per outbound request
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Proxy for every outbound request (http, https or socks5 url)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Directory with a frontend to serve next to the api
    #[serde(default)]
    pub static_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            default_platform: default_platform(),
            max_redirects: default_max_redirects(),
            proxy: None,
            static_dir: None,
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_platform() -> Platform {
    Platform::TikTok
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

impl Config {
    fn validate(&mut self) -> anyhow::Result<()> {
        if self.max_redirects == 0 {
            self.max_redirects = 1
        }

        if let Err(err) = self.listen.parse::<SocketAddr>() {
            bail!("listen must be a socket address, got {:?}: {err}", self.listen);
        }

        if self.proxy.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.proxy = None;
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listen
            .parse()
            .with_context(|| format!("invalid listen address {:?}", self.listen))
    }

    /// Configured proxy, or `OPT_PROXY` from the environment.
    pub fn proxy(&self) -> Option<String> {
        self.proxy.clone().or_else(|| {
            std::env::var(PROXY_ENV)
                .ok()
                .filter(|proxy| !proxy.is_empty())
        })
    }

    /// Load config from `path`, writing the defaults there first if the file
    /// does not exist yet.
    pub fn load_with(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        // create new if does not exist
        if !path.exists() {
            log::info!("writing default config to {}", path.display());
            Self::default().save(path)?;
        }

        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Self = serde_yml::from_str(&config_str)
            .with_context(|| format!("config {} is malformed", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let config_str = serde_yml::to_string(&self)?;
        std::fs::write(path, config_str)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }
}
