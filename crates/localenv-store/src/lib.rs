//! Encrypted, persisted store for named configuration values.
//!
//! Values live in memory as plaintext. Values marked secret are encrypted
//! with AES-256-GCM before they reach disk and are redacted in everything
//! handed to a notifier.

pub mod codec;
pub mod crypto;
pub mod error;
pub mod notify;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use notify::{BroadcastNotifier, Notifier};
pub use store::{EnvSource, LocalStore, ENV_BUNDLE_ID, STORE_ID};
pub use types::{EnvBundle, EnvListing, EnvValue, Entry, ResolvedEnv, REDACTED};
