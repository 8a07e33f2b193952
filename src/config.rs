//! Optional coursemap.toml configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Settings a config file may supply; command-line flags win over these.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data: Option<PathBuf>,
}

impl Config {
    /// Load from an explicit path, or `./coursemap.toml` when present.
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from("coursemap.toml");
                if !default.exists() {
                    return Ok(Config::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }
}
