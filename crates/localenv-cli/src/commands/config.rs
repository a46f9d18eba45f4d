//! Configuration management commands.

use std::path::{Path, PathBuf};

use clap::Args;
use localenv_core::config::{Config, ConfigBuilder};
use localenv_core::paths;
use localenv_store::crypto;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show configuration (secret key redacted)
    Show,

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,

    /// Write a new config file with a freshly generated secret key
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,

        /// Base path for the store (defaults to ~/.localenv/data)
        #[arg(long)]
        store_path: Option<PathBuf>,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => paths::config_file()?,
    };

    match args.command {
        ConfigCommand::Show => {
            let mut config = Config::load_or_default(Some(&path))?;
            config.apply_env()?;
            let json = serde_json::to_string_pretty(&config.redacted())?;
            println!("{}", json);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Validate => {
            let mut config = Config::load_or_default(Some(&path))?;
            config.apply_env()?;
            config.validate()?;
            println!("Configuration is valid.");
        }

        ConfigCommand::Init { force, store_path } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }

            let store_path = match store_path {
                Some(p) => p,
                None => paths::data_dir()?,
            };
            let config = ConfigBuilder::new()
                .store_path(store_path)
                .secret_key(crypto::generate_secret_key())
                .build();
            config.save(&path)?;

            println!("Created config file: {}", path.display());
            println!("  Keep it safe: secrets cannot be read back without its secret_key.");
        }
    }

    Ok(())
}
