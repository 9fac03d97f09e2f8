//! Background persistence writer
//!
//! Store mutations call `Persister::schedule` with a snapshot of the
//! changed collection and return immediately. A single writer task saves
//! snapshots in the order they were scheduled, so the last mutation of a
//! collection is always the last write for its key. `flush` waits until
//! everything scheduled so far has been written.

use super::kv::KeyValueStore;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

enum PersistCommand {
    Write {
        key: String,
        value: serde_json::Value,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle used by the store to schedule writes
#[derive(Clone)]
pub struct Persister {
    tx: mpsc::UnboundedSender<PersistCommand>,
}

impl Persister {
    /// Start the writer task. Must be called from within a Tokio runtime.
    pub fn spawn(kv: KeyValueStore) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PersistCommand>();

        tokio::spawn(async move {
            tracing::info!("Starting persistence writer");

            while let Some(command) = rx.recv().await {
                match command {
                    PersistCommand::Write { key, value } => {
                        kv.save(&key, &value).await;
                        tracing::debug!("Persisted {}", key);
                    }
                    PersistCommand::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }

            tracing::info!("Persistence writer stopped");
        });

        Self { tx }
    }

    /// A handle that drops every write. For stores that must not persist.
    pub fn disabled() -> Self {
        let (tx, _) = mpsc::unbounded_channel();
        Self { tx }
    }

    /// Snapshot `value` and queue it for saving under `key`
    pub fn schedule<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to snapshot {} for persistence: {}", key, e);
                return;
            }
        };

        let command = PersistCommand::Write {
            key: key.to_string(),
            value,
        };
        if self.tx.send(command).is_err() {
            tracing::debug!("Persistence writer not running, dropped write for {}", key);
        }
    }

    /// Wait until every previously scheduled write has been attempted
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(ack)).is_err() {
            return;
        }
        let _ = done.await;
    }
}
