//! localenv command-line interface.

pub mod commands;
pub mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use localenv_core::config::{Config, LogFormat, LogLevel, LoggingConfig};
use localenv_core::Passphrase;
use localenv_store::LocalStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::CommandError;

/// localenv - encrypted local store for named configuration values
#[derive(Parser)]
#[command(name = "localenv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "LOCALENV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base path the store file is kept under
    #[arg(long, env = "LOCALENV_STORE_PATH")]
    pub store_path: Option<PathBuf>,

    /// Passphrase secrets are encrypted with
    #[arg(long, env = "LOCALENV_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Priority attached to resolved values
    #[arg(long, env = "LOCALENV_PRIORITY")]
    pub priority: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Set an environment variable
    Set {
        name: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Set an environment secret (prompts for the value if omitted)
    SetSecret {
        name: String,
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
    },

    /// Print a variable's value (secrets are never printed)
    Get { name: String },

    /// Remove a variable or secret
    Unset { name: String },

    /// List variable and secret names
    List,

    /// Show what the given names resolve to, with priority
    Resolve {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Call a store method with raw string arguments
    Call {
        method: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// List the store methods accepted by `call`
    Methods,

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level, raised by each
/// `-v`. Logs go to stderr so command output stays clean on stdout.
pub fn init_logging(logging: &LoggingConfig, verbose: u8) {
    let level = effective_level(logging.level, verbose);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("localenv={level}").into());

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// The more verbose of the configured level and the one `-v` asks for.
fn effective_level(configured: LogLevel, verbose: u8) -> LogLevel {
    let requested = match verbose {
        0 => return configured,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    configured.min(requested)
}

/// Store settings given on the command line, layered over the config file.
struct StoreOverrides {
    config: Option<PathBuf>,
    store_path: Option<PathBuf>,
    secret_key: Option<String>,
    priority: Option<u32>,
}

impl StoreOverrides {
    /// Load the config file, apply env and flag overrides, and open the store.
    async fn open(self) -> anyhow::Result<LocalStore> {
        let mut config = Config::load_or_default(self.config.as_deref())?;
        config.apply_env()?;

        if let Some(path) = self.store_path {
            config.store.path = Some(path);
        }
        if let Some(key) = self.secret_key {
            config.store.secret_key = Some(Passphrase::new(key));
        }
        if let Some(priority) = self.priority {
            config.store.priority = priority;
        }
        if config.store.path.is_none() {
            config.store.path = Some(config.store_path_or_default()?);
        }

        if !config.store.enabled {
            anyhow::bail!("The store is disabled in the configuration");
        }
        config.validate()?;

        Ok(LocalStore::from_config(&config.store).await?)
    }
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        config,
        store_path,
        secret_key,
        priority,
        command,
        ..
    } = cli;
    let overrides = StoreOverrides {
        config,
        store_path,
        secret_key,
        priority,
    };

    let (method, args) = match command {
        Commands::Version => {
            println!("localenv {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Methods => {
            println!("{}", commands::methods::usage());
            return Ok(());
        }
        Commands::Config(args) => {
            return commands::config::run(args, overrides.config.as_deref()).await;
        }
        Commands::Set { name, value } => ("set".to_string(), vec![name, value]),
        Commands::SetSecret { name, value } => {
            let value = match value {
                Some(v) => v,
                None => rpassword::prompt_password(format!("Enter value for '{name}': "))
                    .map_err(|e| anyhow::anyhow!("Failed to read secret: {}", e))?,
            };
            ("set-secret".to_string(), vec![name, value])
        }
        Commands::Get { name } => ("get".to_string(), vec![name]),
        Commands::Unset { name } => ("unset".to_string(), vec![name]),
        Commands::List => ("list".to_string(), Vec::new()),
        Commands::Resolve { names } => ("resolve".to_string(), names),
        Commands::Call { method, args } => (method, args),
    };

    let store = overrides.open().await?;
    let output = commands::methods::dispatch(&store, &method, &args).await?;
    println!("{}", output);
    Ok(())
}
