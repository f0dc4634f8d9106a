//! Subcommands and the helpers they share.

pub mod config;
pub mod parse;
pub mod query;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use chek_core::ChekConfig;
use tracing::debug;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chek")
        .join("config.json")
}

/// Load the configuration from `path`, the default location, or defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<ChekConfig> {
    if let Some(path) = path {
        return Ok(ChekConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(ChekConfig::from_file(&default_path)?)
    } else {
        Ok(ChekConfig::default())
    }
}

/// Read the receipt HTML from a file, or from stdin when the path is `-`.
pub fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut html = String::new();
        std::io::stdin().read_to_string(&mut html)?;
        return Ok(html);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    Ok(fs::read_to_string(input)?)
}
