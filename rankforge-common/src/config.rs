//! Server configuration loading
//!
//! Resolution order, highest priority first:
//! 1. Command-line overrides
//! 2. Environment variables (`RANKFORGE_BIND`, `RANKFORGE_CLUSTER_POLICY`, `ENV`)
//! 3. TOML config file (`--config`, `RANKFORGE_CONFIG`, or the platform default)
//! 4. Compiled defaults

use crate::cluster::ClusterPolicy;
use crate::estimator::MetricRanges;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const ENV_CONFIG_PATH: &str = "RANKFORGE_CONFIG";
pub const ENV_BIND_ADDR: &str = "RANKFORGE_BIND";
pub const ENV_CLUSTER_POLICY: &str = "RANKFORGE_CLUSTER_POLICY";
pub const ENV_DEPLOYMENT: &str = "ENV";

/// Cross-origin settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub policy: ClusterPolicy,
}

/// Artificial pauses on the simulated-work endpoints, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub cluster_ms: u64,
    pub generate_ms: u64,
    pub create_ms: u64,
    pub research_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            cluster_ms: 2_000,
            generate_ms: 3_000,
            create_ms: 1_500,
            research_ms: 2_000,
        }
    }
}

impl DelayConfig {
    /// No pauses at all
    pub fn none() -> Self {
        Self {
            cluster_ms: 0,
            generate_ms: 0,
            create_ms: 0,
            research_ms: 0,
        }
    }

    pub fn cluster(&self) -> Duration {
        Duration::from_millis(self.cluster_ms)
    }

    pub fn generate(&self) -> Duration {
        Duration::from_millis(self.generate_ms)
    }

    pub fn create(&self) -> Duration {
        Duration::from_millis(self.create_ms)
    }

    pub fn research(&self) -> Duration {
        Duration::from_millis(self.research_ms)
    }
}

/// Complete server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Deployment name reported by the health endpoint
    pub env: String,
    pub cors: CorsConfig,
    pub clustering: ClusteringConfig,
    pub delays: DelayConfig,
    pub ranges: MetricRanges,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            env: "development".to_string(),
            cors: CorsConfig::default(),
            clustering: ClusteringConfig::default(),
            delays: DelayConfig::default(),
            ranges: MetricRanges::default(),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub env: Option<String>,
    pub cluster_policy: Option<ClusterPolicy>,
    pub no_delays: bool,
}

impl ServerConfig {
    /// Resolve configuration from every source and validate the result
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let mut config = match config_file_path(cli.config_path.as_deref()) {
            Some(ConfigFile::Explicit(path)) => load_toml_config(&path)?,
            Some(ConfigFile::Default(path)) => match load_toml_config(&path) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Ignoring default config file {}: {}", path.display(), e);
                    ServerConfig::default()
                }
            },
            None => {
                info!("No config file found, using compiled defaults");
                ServerConfig::default()
            }
        };

        config.apply_env()?;
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var(ENV_BIND_ADDR) {
            self.bind_addr = addr;
        }
        if let Ok(policy) = std::env::var(ENV_CLUSTER_POLICY) {
            self.clustering.policy = policy.parse()?;
        }
        if let Ok(env) = std::env::var(ENV_DEPLOYMENT) {
            self.env = env;
        }
        Ok(())
    }

    fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(addr) = &cli.bind_addr {
            self.bind_addr = addr.clone();
        }
        if let Some(env) = &cli.env {
            self.env = env.clone();
        }
        if let Some(policy) = cli.cluster_policy {
            self.clustering.policy = policy;
        }
        if cli.no_delays {
            self.delays = DelayConfig::none();
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if self.cors.allowed_origins.is_empty() {
            return Err(Error::Config(
                "cors.allowed_origins must list at least one origin".to_string(),
            ));
        }
        self.ranges.validate()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", self.bind_addr, e)))
    }
}

enum ConfigFile {
    /// Named by the user; must load
    Explicit(PathBuf),
    /// Platform default that happens to exist; best-effort
    Default(PathBuf),
}

fn config_file_path(cli_arg: Option<&Path>) -> Option<ConfigFile> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(ConfigFile::Explicit(path.to_path_buf()));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        return Some(ConfigFile::Explicit(PathBuf::from(path)));
    }

    // Priority 3: Platform default, only if present
    default_config_path()
        .filter(|path| path.exists())
        .map(ConfigFile::Default)
}

/// `~/.config/rankforge/config.toml` (or the platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rankforge").join("config.toml"))
}

/// Parse a TOML config file; missing keys take their defaults
pub fn load_toml_config(path: &Path) -> Result<ServerConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}
