// ============================
// parley-backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Path of the credential store JSON document
    pub data_file: PathBuf,
    /// Directory of static client assets
    pub public_dir: PathBuf,
    /// Log level filter
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5001".parse().unwrap(),
            data_file: PathBuf::from("USERS.json"),
            public_dir: PathBuf::from("public"),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` and `PARLEY_*` environment
    /// variables, layered over the defaults.
    pub fn load() -> Result<Self> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("PARLEY_"))
            .extract()?;

        Ok(settings)
    }

    /// Load settings from an explicit config file path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("PARLEY_"))
            .extract()?;

        Ok(settings)
    }
}
