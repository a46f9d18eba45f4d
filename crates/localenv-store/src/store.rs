//! The store: one authoritative, persisted mapping of names to entries.
//!
//! All state sits behind a single `RwLock`. Reads share it. A mutation holds
//! the write side for the whole path (mutate, export, write, notify), so the
//! file on disk and the notifications always follow call order.
//!
//! The store file lives at `{base_path}/local/config.json`. It is replaced
//! atomically: the new content goes to a uniquely named 0600 temporary file
//! in the same directory, is synced, and is then renamed over the old one,
//! after which the directory itself is synced.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use localenv_core::config::StoreConfig;
use localenv_core::Passphrase;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::codec;
use crate::error::{Result, StoreError};
use crate::notify::Notifier;
use crate::types::{EnvBundle, EnvListing, EnvValue, Entry, ResolvedEnv, StoredConfig};

/// Identifier of this store; names the directory under the base path.
pub const STORE_ID: &str = "local";

/// Bundle identifier attached to snapshots pushed to the notifier.
pub const ENV_BUNDLE_ID: &str = "env";

const STORE_FILE: &str = "config.json";

/// A source of named values for an outer layer that merges several sources.
///
/// Unknown names are left out of the result; the priority on each value is
/// what the outer layer uses to pick between sources.
#[async_trait]
pub trait EnvSource: Send + Sync {
    async fn resolve(&self, names: &[String]) -> BTreeMap<String, ResolvedEnv>;
}

/// File-backed store of named values with encrypted secrets.
pub struct LocalStore {
    file: PathBuf,
    passphrase: Passphrase,
    priority: u32,
    entries: RwLock<BTreeMap<String, Entry>>,
    notifier: RwLock<Option<Arc<dyn Notifier>>>,
}

impl LocalStore {
    /// Open the store under `base_path`, loading the existing file if any.
    ///
    /// A missing file is an empty store. A file that cannot be parsed is an
    /// error. Secrets that fail to decrypt are dropped with a warning.
    pub async fn open(
        base_path: impl Into<PathBuf>,
        passphrase: impl Into<Passphrase>,
        priority: u32,
    ) -> Result<Self> {
        let base_path = base_path.into();
        let passphrase = passphrase.into();

        if base_path.as_os_str().is_empty() {
            return Err(StoreError::Validation("base path must not be empty".to_string()));
        }
        if passphrase.is_blank() {
            return Err(StoreError::Validation("passphrase must not be empty".to_string()));
        }

        let file = base_path.join(STORE_ID).join(STORE_FILE);
        let stored = read_store_file(&file).await?;
        let imported = codec::import(&passphrase, stored);

        if !imported.rejected.is_empty() {
            warn!(
                path = %file.display(),
                dropped = ?imported.rejected,
                "some secrets could not be decrypted and were not loaded"
            );
        }
        debug!(path = %file.display(), entries = imported.entries.len(), "opened store");

        Ok(Self {
            file,
            passphrase,
            priority,
            entries: RwLock::new(imported.entries),
            notifier: RwLock::new(None),
        })
    }

    /// Open the store described by a config section.
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        let path = config
            .path
            .clone()
            .ok_or_else(|| StoreError::Validation("store path is not configured".to_string()))?;
        let passphrase = config
            .secret_key
            .clone()
            .ok_or_else(|| StoreError::Validation("secret key is not configured".to_string()))?;
        Self::open(path, passphrase, config.priority).await
    }

    /// Path of the store file.
    pub fn store_file(&self) -> &Path {
        &self.file
    }

    /// Priority attached to resolved values.
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Attach a notifier, replacing any previous one.
    pub async fn attach_notifier(&self, notifier: Arc<dyn Notifier>) {
        *self.notifier.write().await = Some(notifier);
    }

    /// Detach the current notifier, if any.
    pub async fn detach_notifier(&self) {
        *self.notifier.write().await = None;
    }

    /// Set `name` to `value`. An empty value removes the entry.
    ///
    /// Any previous entry is replaced whatever its secret flag. If writing
    /// the file fails the error is returned, but the in-memory change stays:
    /// the value is then set in memory without being durable.
    pub async fn set(&self, name: &str, value: &str, secret: bool) -> Result<()> {
        if name.is_empty() {
            return Err(StoreError::Validation("missing name".to_string()));
        }

        let mut entries = self.entries.write().await;
        if value.is_empty() {
            entries.remove(name);
            debug!(name, "removed entry");
        } else {
            entries.insert(name.to_string(), Entry::new(value, secret));
            debug!(name, secret, "set entry");
        }

        if let Err(e) = self.persist(&entries).await {
            error!(name, path = %self.file.display(), "change kept in memory but not persisted: {e}");
            return Err(e);
        }

        self.notify_with(&entries).await;
        Ok(())
    }

    /// Remove `name`. Removing an absent name is a no-op that still persists.
    pub async fn unset(&self, name: &str) -> Result<()> {
        self.set(name, "", false).await
    }

    /// Current value and secret flag of `name`; `("", false)` when absent.
    pub async fn get(&self, name: &str) -> (String, bool) {
        let entries = self.entries.read().await;
        entries
            .get(name)
            .map(|entry| (entry.value().to_string(), entry.is_secret()))
            .unwrap_or_default()
    }

    /// All present names, split into plain variables and secrets, sorted.
    pub async fn list(&self) -> EnvListing {
        let entries = self.entries.read().await;
        let mut listing = EnvListing::default();
        for (name, entry) in entries.iter() {
            if entry.is_secret() {
                listing.secrets.push(name.clone());
            } else {
                listing.vars.push(name.clone());
            }
        }
        listing
    }

    /// Values for the requested names that are present; others are omitted.
    pub async fn resolve<S: AsRef<str>>(&self, names: &[S]) -> BTreeMap<String, ResolvedEnv> {
        let entries = self.entries.read().await;
        names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                entries.get(name).map(|entry| {
                    (
                        name.to_string(),
                        ResolvedEnv {
                            value: entry.value().to_string(),
                            secret: entry.is_secret(),
                            priority: self.priority,
                        },
                    )
                })
            })
            .collect()
    }

    /// Every entry with secret values replaced by the redaction marker.
    pub async fn snapshot(&self) -> BTreeMap<String, EnvValue> {
        let entries = self.entries.read().await;
        redact(&entries)
    }

    /// Push the current snapshot to the attached notifier, if any.
    pub async fn notify(&self) {
        let entries = self.entries.read().await;
        self.notify_with(&entries).await;
    }

    /// Number of entries held.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn persist(&self, entries: &BTreeMap<String, Entry>) -> Result<()> {
        let stored = codec::export(&self.passphrase, entries)?;
        let data = serde_json::to_vec_pretty(&stored)?;
        write_store_file(&self.file, &data).await?;
        debug!(path = %self.file.display(), entries = entries.len(), "wrote store file");
        Ok(())
    }

    async fn notify_with(&self, entries: &BTreeMap<String, Entry>) {
        let notifier = self.notifier.read().await.clone();
        if let Some(notifier) = notifier {
            notifier.notify(&EnvBundle {
                bundle_id: ENV_BUNDLE_ID.to_string(),
                env: redact(entries),
            });
        }
    }
}

#[async_trait]
impl EnvSource for LocalStore {
    async fn resolve(&self, names: &[String]) -> BTreeMap<String, ResolvedEnv> {
        LocalStore::resolve(self, names).await
    }
}

fn redact(entries: &BTreeMap<String, Entry>) -> BTreeMap<String, EnvValue> {
    entries
        .iter()
        .map(|(name, entry)| (name.clone(), entry.redacted()))
        .collect()
}

async fn read_store_file(path: &Path) -> Result<StoredConfig> {
    let content = match fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoredConfig::default()),
        Err(e) => {
            return Err(StoreError::persistence(
                format!("cannot read store file {}", path.display()),
                e,
            ))
        }
    };

    if content.is_empty() {
        return Ok(StoredConfig::default());
    }
    Ok(serde_json::from_slice(&content)?)
}

/// Replace `path` with `data`, never leaving a partially written file there.
///
/// Each call writes to its own temporary file, so writers in other processes
/// sharing the directory never interleave bytes in one file.
async fn write_store_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        ensure_dir(dir).await.map_err(|e| {
            StoreError::persistence(format!("cannot create store directory {}", dir.display()), e)
        })?;
    }

    replace_file(path, &temp_path_for(path), data)
        .await
        .map_err(|e| StoreError::persistence(format!("cannot write store file {}", path.display()), e))
}

/// `.{file}.{pid}.{random}.tmp` next to `path`.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let unique = format!(
        ".{file_name}.{}.{:016x}.tmp",
        std::process::id(),
        rand::random::<u64>()
    );
    path.with_file_name(unique)
}

async fn replace_file(path: &Path, tmp_path: &Path, data: &[u8]) -> std::io::Result<()> {
    let written = match write_owner_only(tmp_path, data).await {
        Ok(()) => fs::rename(tmp_path, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        let _ = fs::remove_file(tmp_path).await;
        return Err(e);
    }

    if let Some(dir) = path.parent() {
        sync_dir(dir).await?;
    }
    Ok(())
}

async fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700)).await?;
    }

    Ok(())
}

/// Create `path` (which must not exist) as 0600 before any byte is written.
async fn write_owner_only(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}

/// Flush the directory entry so a completed rename survives a crash.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
