//! localenv CLI entry point.

use clap::Parser;
use localenv_cli::{init_logging, run, Cli};
use localenv_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logging settings come from the config file; a broken file is reported
    // by the command itself, so fall back to defaults here.
    let logging = Config::load_or_default(cli.config.as_deref())
        .and_then(|mut config| config.apply_env().map(|_| config))
        .map(|config| config.logging)
        .unwrap_or_default();
    init_logging(&logging, cli.verbose);

    // Run the command
    run(cli).await
}
