//! Notification boundary.
//!
//! After every mutation the store hands a redacted [`EnvBundle`] to the
//! attached [`Notifier`]. Delivery is fire-and-forget: a notifier deals with
//! its own failures and never reports them back to the store.

use tokio::sync::broadcast;
use tracing::{debug, error};

use crate::types::EnvBundle;

/// Receives redacted snapshots of the store.
pub trait Notifier: Send + Sync {
    fn notify(&self, bundle: &EnvBundle);
}

/// Publishes each bundle as a JSON string on a broadcast channel.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<String>,
}

impl BroadcastNotifier {
    /// Create a notifier whose channel buffers up to `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to bundles published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, bundle: &EnvBundle) {
        let payload = match serde_json::to_string(bundle) {
            Ok(payload) => payload,
            Err(e) => {
                error!(bundle_id = %bundle.bundle_id, "error building env bundle: {e}");
                return;
            }
        };

        if self.tx.send(payload).is_err() {
            debug!(bundle_id = %bundle.bundle_id, "no subscribers for env bundle");
        }
    }
}
