//! # localenv-core
//!
//! Shared functionality for the localenv crates:
//!
//! - **Configuration**: loading, validation, and saving of the config file
//! - **Paths**: resolution of the localenv base directory and config file
//! - **Environment**: typed access to `LOCALENV_*` overrides
//! - **Passphrase**: a zeroizing, never-printed string for key material

pub mod config;
pub mod env;
pub mod error;
pub mod passphrase;
pub mod paths;

pub use config::Config;
pub use error::ConfigError;
pub use passphrase::Passphrase;
