//! Config command - inspect and edit the JSON configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;
use tracing::debug;

use chek_core::{ChekConfig, ParserConfig};

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show {
        /// Print built-in defaults, ignoring any saved file
        #[arg(long)]
        defaults: bool,
    },

    /// Write a configuration file with default values
    Init {
        /// Destination (default: the user config directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,

        /// Start from the historical parser settings
        #[arg(long)]
        legacy: bool,
    },

    /// Print one value by dotted key, e.g. "parser.divider"
    Get { key: String },

    /// Change one value by dotted key; bare words are stored as strings
    Set { key: String, value: String },

    /// Print where the configuration file lives
    Path,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path.map_or_else(default_config_path, PathBuf::from);

    match args.action {
        ConfigAction::Show { defaults } => {
            let config = if defaults {
                ChekConfig::default()
            } else {
                saved_or_default(&path)?
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Init {
            output,
            force,
            legacy,
        } => init(output.unwrap_or(path), force, legacy)?,
        ConfigAction::Get { key } => {
            let tree = serde_json::to_value(saved_or_default(&path)?)?;
            let value = lookup(&tree, &key)
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigAction::Set { key, value } => set(&path, &key, &value)?,
        ConfigAction::Path => {
            println!("Configuration file: {}", path.display());
            if path.exists() {
                println!("Status: {}", style("exists").green());
            } else {
                println!("Status: {}", style("not created").yellow());
                println!("Run 'chek config init' to create it.");
            }
        }
    }

    Ok(())
}

fn saved_or_default(path: &Path) -> anyhow::Result<ChekConfig> {
    if path.exists() {
        debug!("Reading {}", path.display());
        Ok(ChekConfig::from_file(path)?)
    } else {
        Ok(ChekConfig::default())
    }
}

fn init(path: PathBuf, force: bool, legacy: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    let config = ChekConfig {
        parser: if legacy {
            ParserConfig::legacy()
        } else {
            ParserConfig::default()
        },
        ..ChekConfig::default()
    };
    write_config(&path, &config)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn set(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let new_value: Value =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut tree = serde_json::to_value(saved_or_default(path)?)?;
    let slot = lookup_mut(&mut tree, key)
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    if slot.is_object() {
        anyhow::bail!("{} is a group of settings, set its fields instead", key);
    }
    *slot = new_value.clone();

    // Round-trip through the typed config so a wrong type is rejected here
    let config: ChekConfig = serde_json::from_value(tree)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
    write_config(path, &config)?;

    println!("{} Set {} = {}", style("✓").green(), key, new_value);
    Ok(())
}

fn write_config(path: &Path, config: &ChekConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn lookup<'v>(tree: &'v Value, key: &str) -> Option<&'v Value> {
    key.split('.').try_fold(tree, |node, part| node.get(part))
}

fn lookup_mut<'v>(tree: &'v mut Value, key: &str) -> Option<&'v mut Value> {
    key.split('.').try_fold(tree, |node, part| node.get_mut(part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_dotted_keys() {
        let mut tree = serde_json::to_value(ChekConfig::default()).unwrap();

        assert_eq!(
            lookup(&tree, "parser.strict_structure"),
            Some(&Value::Bool(true))
        );
        assert!(lookup(&tree, "parser.missing").is_none());
        assert!(lookup(&tree, "output.pretty_json.deeper").is_none());

        *lookup_mut(&mut tree, "output.show_diagnostics").unwrap() = Value::Bool(true);
        let config: ChekConfig = serde_json::from_value(tree).unwrap();
        assert!(config.output.show_diagnostics);
    }
}
