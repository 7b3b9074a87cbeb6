use anyhow::{Context, Result};
use clap::ValueEnum;
use loglens_core::Config;
use std::path::Path;

pub mod commands;

/// Config file used when `--config` is given without a value
pub const DEFAULT_CONFIG_FILE: &str = "default_config.json";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Table,
}

/// Built-in defaults, overlaid with the JSON file at `path` if one is given
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}
