//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use cubeline_core::{DEFAULT_PAGE_SIZE, SessionConfig};
use cubeline_northwind::SalesCube;
use serde::Deserialize;

/// Rules of the sales cube: unit price is derived from revenue and quantity
pub const DEFAULT_RULES: &str = "UNDEFVALS;\nSKIPCHECK;\n\n['UnitPrice']=['Revenue']\\['Quantity'];\n\nFEEDERS;\n['Quantity']=>['UnitPrice'];";

/// Global configuration for cubeline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub target: TargetConfig,
    pub http: HttpConfig,
    pub build: BuildConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub service_root: String,
    pub page_size: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            service_root: cubeline_northwind::SERVICE_ROOT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub service_root: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub user: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub password: Option<String>,
    /// TM1 servers commonly run with self-signed certificates
    pub accept_invalid_certs: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            service_root: "https://localhost:8010/api/v1/".to_string(),
            user: std::env::var("TM1_USER").ok(),
            password: std::env::var("TM1_PASSWORD").ok(),
            accept_invalid_certs: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Seconds
    pub connect_timeout: u64,
    /// Seconds, per request
    pub request_timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: 30,
            request_timeout: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub cube: String,
    pub products: String,
    pub customers: String,
    pub employees: String,
    pub time: String,
    pub measures: String,
    pub rules: String,
    /// Check every hierarchy before publishing
    pub validate: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        let names = SalesCube::default();
        Self {
            cube: names.name,
            products: names.products,
            customers: names.customers,
            employees: names.employees,
            time: names.time,
            measures: names.measures,
            rules: DEFAULT_RULES.to_string(),
            validate: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./cubeline.toml (current directory)
    /// 2. ~/.config/cubeline/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("cubeline.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "cubeline") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn session(&self, service_root: &str) -> SessionConfig {
        let mut session = SessionConfig::new(service_root);
        session.connect_timeout = Duration::from_secs(self.http.connect_timeout);
        session.request_timeout = Duration::from_secs(self.http.request_timeout);
        session
    }

    /// Anonymous session against the source service
    pub fn source_session(&self) -> SessionConfig {
        self.session(&self.source.service_root)
    }

    pub fn target_session(&self) -> SessionConfig {
        let mut session = self.session(&self.target.service_root);
        session.user = self.target.user.clone();
        session.password = self.target.password.clone();
        session.accept_invalid_certs = self.target.accept_invalid_certs;
        session
    }

    pub fn sales_cube(&self) -> SalesCube {
        SalesCube {
            name: self.build.cube.clone(),
            products: self.build.products.clone(),
            customers: self.build.customers.clone(),
            employees: self.build.employees.clone(),
            time: self.build.time.clone(),
            measures: self.build.measures.clone(),
        }
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch.interval_ms)
    }
}
