//! Debounced persistence with a crash-safe local backup.
//!
//! Saves are debounced on the order of seconds (a separate, much slower cadence
//! than reflow). Two ordering rules hold regardless of network timing:
//!
//! - A local backup write happens synchronously, in the same tick as the edit,
//!   before any network save is attempted — a crash mid-save cannot lose the
//!   latest edit.
//! - A save completion carrying server-side state is discarded when a newer
//!   local edit timestamp exists; late-arriving acks never roll the in-memory
//!   document back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::content::ResumeContent;
use crate::errors::EngineError;

/// A persisted resume document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub id: Uuid,
    pub content: ResumeContent,
    /// Timestamp of the edit this revision captures.
    pub updated_at: DateTime<Utc>,
}

/// The remote document store. The engine never talks to a database or object
/// store directly; hosts inject whatever backend they use behind this seam.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self, key: Uuid) -> Result<Option<ResumeDocument>, EngineError>;
    /// Persists the document and returns the stored copy as acknowledged by
    /// the server.
    async fn save(&self, doc: &ResumeDocument) -> Result<ResumeDocument, EngineError>;
}

/// Injected local backup store with `get`/`set`/`expire` semantics, owned by
/// the hosting process (browser local storage, a file, an in-memory map).
/// Writes must complete within the calling tick.
pub trait BackupStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn expire(&self, key: &str);
}

fn backup_key(id: Uuid) -> String {
    format!("folio:backup:{id}")
}

/// Debounced autosave coordinator for one document.
#[derive(Clone)]
pub struct Autosaver {
    inner: Arc<AutosaverInner>,
}

struct AutosaverInner {
    store: Arc<dyn DocumentStore>,
    backup: Arc<dyn BackupStore>,
    debounce: Duration,
    /// Token issued per scheduled save; a save only runs if it still carries
    /// the newest token when its quiet period ends.
    save_seq: AtomicU64,
    state: Mutex<SaveState>,
}

#[derive(Default)]
struct SaveState {
    current: Option<ResumeDocument>,
    /// Timestamp of the newest local edit; acks older than this are stale.
    last_edit: Option<DateTime<Utc>>,
}

impl Autosaver {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        backup: Arc<dyn BackupStore>,
        debounce_ms: u64,
    ) -> Self {
        Autosaver {
            inner: Arc::new(AutosaverInner {
                store,
                backup,
                debounce: Duration::from_millis(debounce_ms),
                save_seq: AtomicU64::new(0),
                state: Mutex::new(SaveState::default()),
            }),
        }
    }

    /// The in-memory document, as of the latest edit or applied ack.
    pub fn current(&self) -> Option<ResumeDocument> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    /// Records a local edit: backs it up synchronously, then (re)schedules the
    /// debounced network save. Must be called from within a Tokio runtime.
    pub fn mark_dirty(&self, doc: ResumeDocument) {
        {
            let mut state = self
                .inner
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            state.last_edit = Some(doc.updated_at);
            state.current = Some(doc.clone());
        }

        // Backup lands before the network save is even scheduled.
        match serde_json::to_string(&doc) {
            Ok(json) => self.inner.backup.set(&backup_key(doc.id), json),
            Err(e) => warn!(error = %e, "failed to serialize document for local backup"),
        }

        let seq = self.inner.save_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            sleep(inner.debounce).await;
            if seq != inner.save_seq.load(Ordering::SeqCst) {
                debug!(seq, "save superseded before it started");
                return;
            }
            if let Err(e) = inner.run_save().await {
                // The synchronous backup still holds the latest edit.
                warn!(error = %e, "autosave failed; local backup retained");
            }
        });
    }

    /// Loads the document, preferring a newer local backup over the server
    /// copy (crash recovery).
    pub async fn restore(&self, key: Uuid) -> Result<Option<ResumeDocument>, EngineError> {
        let remote = self.inner.store.load(key).await?;
        let local = self
            .inner
            .backup
            .get(&backup_key(key))
            .and_then(|json| serde_json::from_str::<ResumeDocument>(&json).ok());

        let chosen = match (remote, local) {
            (Some(r), Some(l)) if l.updated_at > r.updated_at => {
                warn!(id = %key, "local backup newer than server copy; recovering it");
                Some(l)
            }
            (remote, local) => remote.or(local),
        };

        if let Some(doc) = &chosen {
            let mut state = self
                .inner
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            state.current = Some(doc.clone());
            state.last_edit = Some(doc.updated_at);
        }
        Ok(chosen)
    }
}

impl AutosaverInner {
    async fn run_save(&self) -> Result<(), EngineError> {
        let Some(doc) = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
        else {
            return Ok(());
        };

        let saved_at = doc.updated_at;
        let server_copy = self.store.save(&doc).await?;

        if self.apply_rehydration(saved_at, server_copy) {
            // Once the server holds this revision the backup is redundant.
            self.backup.expire(&backup_key(doc.id));
        }
        Ok(())
    }

    /// Applies a completed save's server copy to the in-memory state, unless a
    /// newer local edit arrived while the save was in flight.
    fn apply_rehydration(&self, saved_at: DateTime<Utc>, server_copy: ResumeDocument) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.last_edit.map_or(false, |edit| edit > saved_at) {
            debug!(
                %saved_at,
                "discarding stale save rehydration; a newer local edit exists"
            );
            return false;
        }
        state.current = Some(server_copy);
        true
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
