//! Service configuration.
//!
//! Layers, lowest to highest precedence:
//! 1. built-in defaults ([`AppConfig::default`])
//! 2. YAML file (`$ACCOUNTS_CONFIG`, else `config/accounts.yaml`; optional)
//! 3. `ACCOUNTS_*` environment variables, nested with `__`
//!    (e.g. `ACCOUNTS_SERVER__BIND_ADDR=127.0.0.1:9000`)
//! 4. `JAVA_HOME`, mapped onto `runtime_home`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_ENV: &str = "ACCOUNTS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/accounts.yaml";
pub const ENV_PREFIX: &str = "ACCOUNTS_";
pub const RUNTIME_HOME_ENV: &str = "JAVA_HOME";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub build: BuildConfig,
    /// Runtime installation directory reported by `GET /api/java-version`.
    pub runtime_home: Option<String>,
    pub contact: ContactInfo,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub version: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info,tower_http=info".to_string(),
        }
    }
}

/// Contact record served by `GET /api/getcontactinfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactInfo {
    pub message: String,
    pub contact_details: BTreeMap<String, String>,
    pub on_call_support: Vec<String>,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            message: "Welcome to microBank accounts related APIs".to_string(),
            contact_details: BTreeMap::from([
                ("name".to_string(), "Accounts Dev Team".to_string()),
                ("email".to_string(), "accounts-dev@microbank.example".to_string()),
            ]),
            on_call_support: vec!["(555) 555-1234".to_string(), "(555) 523-1345".to_string()],
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            build: BuildConfig::default(),
            runtime_home: None,
            contact: ContactInfo::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the file named by `$ACCOUNTS_CONFIG` (or the default path).
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        Self::extract(Self::figment(path))
            .with_context(|| format!("failed to load configuration from {}", path.display()))
    }

    /// Defaults, then the YAML file, then environment overrides.
    pub fn figment(path: &Path) -> Figment {
        Self::with_env(Self::defaults().merge(Yaml::file(path)))
    }

    pub fn defaults() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    fn with_env(figment: Figment) -> Figment {
        figment
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"))
            .merge(
                Env::raw()
                    .only(&[RUNTIME_HOME_ENV])
                    .map(|_| "runtime_home".into()),
            )
    }

    pub fn extract(figment: Figment) -> anyhow::Result<Self> {
        Ok(figment.extract()?)
    }
}
