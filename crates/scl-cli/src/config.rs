use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use scl_gate::GateConfig;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Settings for an interactive session. Every key is optional.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub credentials_path: PathBuf,
    pub locations_path: PathBuf,
    pub export_path: PathBuf,
    pub max_login_attempts: u32,
    pub min_year: i32,
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let gate = GateConfig::default();
        Self {
            credentials_path: PathBuf::from("username_password.txt"),
            locations_path: PathBuf::from("valid_locations.txt"),
            export_path: PathBuf::from("blockchain.txt"),
            max_login_attempts: 3,
            min_year: gate.min_year,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// The config file named on the command line (or defaults), with
    /// command-line overrides applied.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(export) = &cli.export {
            config.export_path = export.clone();
        }
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }
        Ok(config)
    }

    pub fn gate(&self) -> GateConfig {
        GateConfig {
            min_year: self.min_year,
        }
    }
}
