//! Conversion between the in-memory mapping and its durable form.
//!
//! Plain entries are written verbatim. Secret entries are encrypted afresh
//! on every export and decrypted on import. Import is lenient per entry: a
//! secret that fails to decrypt is dropped and reported, the rest still load.

use std::collections::BTreeMap;

use localenv_core::Passphrase;
use tracing::warn;

use crate::crypto;
use crate::error::Result;
use crate::types::{Entry, StoredConfig, StoredEntry};

/// Result of [`import`]: the entries that loaded, plus the names that did not.
#[derive(Debug, Default)]
pub struct Imported {
    pub entries: BTreeMap<String, Entry>,
    pub rejected: Vec<String>,
}

/// Build the durable form of `entries`.
pub fn export(passphrase: &Passphrase, entries: &BTreeMap<String, Entry>) -> Result<StoredConfig> {
    let mut env = BTreeMap::new();
    for (name, entry) in entries {
        let value = if entry.is_secret() {
            crypto::encrypt_secret(passphrase, entry.value())?
        } else {
            entry.value().to_string()
        };
        env.insert(
            name.clone(),
            StoredEntry {
                value,
                secret: entry.is_secret(),
            },
        );
    }
    Ok(StoredConfig { env })
}

/// Rebuild the in-memory mapping from its durable form.
///
/// Entries with an empty name or an empty (decrypted) value are skipped
/// silently; secrets that fail to decrypt are skipped with a warning and
/// listed in [`Imported::rejected`].
pub fn import(passphrase: &Passphrase, stored: StoredConfig) -> Imported {
    let mut imported = Imported::default();

    for (name, stored_entry) in stored.env {
        if name.is_empty() {
            continue;
        }

        let value = if stored_entry.secret {
            match crypto::decrypt_secret(passphrase, &stored_entry.value) {
                Ok(value) => value,
                Err(e) => {
                    warn!(name = %name, "dropping secret that could not be decrypted: {e}");
                    imported.rejected.push(name);
                    continue;
                }
            }
        } else {
            stored_entry.value
        };

        if !value.is_empty() {
            imported
                .entries
                .insert(name, Entry::new(value, stored_entry.secret));
        }
    }

    imported
}
