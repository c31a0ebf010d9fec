// src/config.rs
//! Run configuration: `aidstats.toml` defaults, overridden by CLI flags.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pipeline::MAX_FILE_BYTES;

pub const CONFIG_FILE: &str = "aidstats.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_data_dir")]
    pub data: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output: PathBuf,
    /// Worker processes for the fan-out phase; 0 means one per core.
    #[serde(default)]
    pub workers: usize,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_flavor")]
    pub flavor: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            data: default_data_dir(),
            output: default_output_dir(),
            workers: 0,
            max_file_bytes: default_max_file_bytes(),
            flavor: default_flavor(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

const fn default_max_file_bytes() -> u64 {
    MAX_FILE_BYTES
}

fn default_flavor() -> String {
    "dashboard".to_string()
}

impl RunConfig {
    /// Loads `aidstats.toml` from the working directory, falling back to
    /// defaults when it is absent or unreadable.
    #[must_use]
    pub fn load() -> Self {
        match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => Self::parse(&content),
            Err(_) => RunConfig::default(),
        }
    }

    #[must_use]
    pub fn parse(content: &str) -> Self {
        toml::from_str(content).unwrap_or_default()
    }
}
