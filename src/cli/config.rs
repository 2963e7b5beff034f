use std::path::{Path, PathBuf};

use specdelta::Config;
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
/// Show or modify workspace configuration
///
/// Configuration is stored in .specdelta/config.toml.
///
/// Available configuration keys:
///   `specs_dir`            Directory of baseline specifications (default: specs)
///   `changes_dir`          Directory of delta documents (default: changes)
///   `check_applicability`  Refuse to apply inapplicable deltas (default: true)
pub struct Command {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show all configuration values
    Show,

    /// Get a specific configuration value
    Get {
        /// Configuration key to retrieve
        key: String,
    },

    /// Set a configuration value
    ///
    /// Examples:
    ///   specdelta config set `specs_dir` docs/specs
    ///   specdelta config set `check_applicability` false
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },
}

const KEYS: &str = "specs_dir\n  changes_dir\n  check_applicability";

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = Config::path_in(root);

        match self.command {
            ConfigCommand::Show => Self::show_config(&config_path),
            ConfigCommand::Get { key } => Self::get_config(&config_path, &key),
            ConfigCommand::Set { key, value } => Self::set_config(&config_path, &key, &value),
        }
    }

    fn load(config_path: &Path) -> anyhow::Result<Config> {
        if config_path.exists() {
            Config::load(config_path).map_err(|e| anyhow::anyhow!("{e}"))
        } else {
            Ok(Config::default())
        }
    }

    fn show_config(config_path: &Path) -> anyhow::Result<()> {
        let config = Self::load(config_path)?;

        println!("Configuration:");
        println!("  specs_dir: {}", config.specs_dir().display());
        println!("  changes_dir: {}", config.changes_dir().display());
        println!(
            "  check_applicability: {} ({})",
            config.check_applicability,
            if config.check_applicability {
                "inapplicable deltas are refused".muted()
            } else {
                "missing targets are skipped".muted()
            }
        );
        Ok(())
    }

    fn get_config(config_path: &Path, key: &str) -> anyhow::Result<()> {
        let config = Self::load(config_path)?;

        match key {
            "specs_dir" => println!("{}", config.specs_dir().display()),
            "changes_dir" => println!("{}", config.changes_dir().display()),
            "check_applicability" => println!("{}", config.check_applicability),
            _ => {
                anyhow::bail!("Unknown configuration key: '{key}'\n\nAvailable keys:\n  {KEYS}");
            }
        }
        Ok(())
    }

    fn set_config(config_path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
        let mut config = Self::load(config_path)?;

        match key {
            "specs_dir" => config.set_specs_dir(PathBuf::from(value)),
            "changes_dir" => config.set_changes_dir(PathBuf::from(value)),
            "check_applicability" => {
                config.check_applicability = value
                    .parse::<bool>()
                    .map_err(|_| anyhow::anyhow!("Value must be 'true' or 'false'"))?;
            }
            _ => {
                anyhow::bail!("Unknown configuration key: '{key}'\n\nAvailable keys:\n  {KEYS}");
            }
        }

        config
            .save(config_path)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        println!("{}", format!("Set {key} = {value}").passed());
        Ok(())
    }
}
