//! Data types held by the store, handed to callers, and written to disk.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Value shown in place of a secret outside the store.
pub const REDACTED: &str = "*******";

/// One named value held in memory.
///
/// The plaintext lives here only; it is zeroed on drop and `Debug` never
/// prints it for secret entries. An entry never has an empty value.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Entry {
    value: String,
    #[zeroize(skip)]
    secret: bool,
}

impl Entry {
    pub fn new(value: impl Into<String>, secret: bool) -> Self {
        Self {
            value: value.into(),
            secret,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// The value as it may leave the store: redacted when secret.
    pub fn redacted(&self) -> EnvValue {
        EnvValue {
            value: if self.secret {
                REDACTED.to_string()
            } else {
                self.value.clone()
            },
            secret: self.secret,
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.secret { REDACTED } else { self.value.as_str() };
        f.debug_struct("Entry")
            .field("value", &value)
            .field("secret", &self.secret)
            .finish()
    }
}

/// One item of a redacted snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvValue {
    pub value: String,
    pub secret: bool,
}

/// One item returned by `resolve`, tagged with the store's priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEnv {
    pub value: String,
    pub secret: bool,
    pub priority: u32,
}

/// All present names, split by secret flag and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvListing {
    pub vars: Vec<String>,
    pub secrets: Vec<String>,
}

/// Durable form of one entry: ciphertext token when secret, plaintext otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub value: String,
    pub secret: bool,
}

/// Durable form of the whole store, the single object in the store file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default)]
    pub env: BTreeMap<String, StoredEntry>,
}

/// Payload pushed to a notifier after each mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvBundle {
    #[serde(rename = "bundleID")]
    pub bundle_id: String,
    pub env: BTreeMap<String, EnvValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_debug_redacts_secret() {
        let entry = Entry::new("hunter2", true);
        let debug = format!("{:?}", entry);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains(REDACTED));
    }

    #[test]
    fn test_entry_debug_shows_plain_value() {
        let entry = Entry::new("localhost", false);
        assert!(format!("{:?}", entry).contains("localhost"));
    }

    #[test]
    fn test_redacted_view() {
        assert_eq!(
            Entry::new("s3cr3t", true).redacted(),
            EnvValue {
                value: REDACTED.to_string(),
                secret: true
            }
        );
        assert_eq!(Entry::new("plain", false).redacted().value, "plain");
    }

    #[test]
    fn test_stored_config_layout() {
        let mut stored = StoredConfig::default();
        stored.env.insert(
            "DB_HOST".to_string(),
            StoredEntry {
                value: "localhost".to_string(),
                secret: false,
            },
        );
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["env"]["DB_HOST"]["value"], "localhost");
        assert_eq!(json["env"]["DB_HOST"]["secret"], false);
    }

    #[test]
    fn test_stored_config_missing_env_field() {
        let stored: StoredConfig = serde_json::from_str("{}").unwrap();
        assert!(stored.env.is_empty());
    }

    #[test]
    fn test_bundle_id_field_name() {
        let bundle = EnvBundle {
            bundle_id: "env".to_string(),
            env: BTreeMap::new(),
        };
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["bundleID"], "env");
    }
}
