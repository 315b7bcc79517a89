use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "torrent-codec.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file i/o: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot write default config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub peer_id_prefix: String,
    pub listen_port: u16,
    pub request_timeout: u64, // seconds
    /// Hash the `info` dictionary with sorted keys instead of its stored order.
    pub canonical_info_hash: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            peer_id_prefix: "-TC0001-".to_string(),
            listen_port: 6881,
            request_timeout: 10,
            canonical_info_hash: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Reads `path`, or writes the defaults there when it does not exist yet.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let config = Self::default();
            let toml = toml::to_string(&config)?;
            fs::write(path, toml)?;
            Ok(config)
        }
    }
}
