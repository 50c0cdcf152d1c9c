//! Durable score submission queue with single-flight delivery.
//!
//! A [`ScoreQueue`] owns an ordered list of pending [`QueueEntry`] values,
//! mirrors it to a [`QueueStorage`] backend after every mutation, and
//! delivers entries oldest-first through a [`ScoreTransport`]. Delivery
//! failures are never surfaced to the caller: an entry stays queued until a
//! delivery attempt for it is acknowledged.
//!
//! Flush passes are triggered by [`ScoreQueue::add_score`], by the
//! background [`worker`], and by the worker's connectivity hook. Only one
//! pass runs at a time; concurrent requests return [`FlushOutcome::Skipped`].

pub mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::models::entry::{EntryId, QueueEntry, QueueStatus, ScorePayload};
use crate::persistence::QueueStorage;
use crate::transport::ScoreTransport;
use crate::AppError;

/// Key the queue snapshot is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "pending_scores";

/// Construction options for a [`ScoreQueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueOptions {
    /// Storage key of the persisted snapshot.
    pub storage_key: String,
    /// Spawn a flush pass right after each enqueue.
    pub flush_on_add: bool,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.into(),
            flush_on_add: true,
        }
    }
}

/// Counters for one completed flush pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Entries a delivery request was issued for.
    pub attempted: usize,
    /// Entries acknowledged and removed.
    pub delivered: usize,
    /// Entries left queued after a failed attempt.
    pub failed: usize,
}

/// Result of a [`ScoreQueue::flush`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Another pass was already running, or there was nothing to send.
    Skipped,
    /// A pass ran over the entries present when it started.
    Completed(FlushReport),
}

/// Pending score submissions bound to one storage backend and one transport.
pub struct ScoreQueue {
    entries: Mutex<Vec<QueueEntry>>,
    flushing: AtomicBool,
    idle: Notify,
    storage: Arc<dyn QueueStorage>,
    transport: Arc<dyn ScoreTransport>,
    options: QueueOptions,
}

impl ScoreQueue {
    /// Open a queue, restoring any snapshot persisted under
    /// `options.storage_key`.
    ///
    /// An unreadable or corrupt snapshot is logged and replaced by an empty
    /// queue.
    #[must_use]
    pub fn open(
        storage: Arc<dyn QueueStorage>,
        transport: Arc<dyn ScoreTransport>,
        options: QueueOptions,
    ) -> Arc<Self> {
        let entries = load_snapshot(storage.as_ref(), &options.storage_key);
        info!(
            pending = entries.len(),
            key = %options.storage_key,
            "score queue opened"
        );

        Arc::new(Self {
            entries: Mutex::new(entries),
            flushing: AtomicBool::new(false),
            idle: Notify::new(),
            storage,
            transport,
            options,
        })
    }

    /// Enqueue a score and return its identifier without waiting for
    /// delivery.
    ///
    /// The entry is persisted before this returns. When `flush_on_add` is
    /// set, a flush pass is spawned onto the current Tokio runtime; outside
    /// a runtime the entry waits for the next trigger.
    pub fn add_score(
        self: &Arc<Self>,
        name: impl Into<String>,
        email: Option<String>,
        score: i64,
    ) -> EntryId {
        let entry = QueueEntry::new(name.into(), email, score);
        let id = entry.id;
        {
            let mut entries = self.lock_entries();
            entries.push(entry);
            self.persist(&entries);
            debug!(entry_id = %id, pending = entries.len(), "score enqueued");
        }

        if self.options.flush_on_add {
            self.spawn_flush();
        }
        id
    }

    /// Remove the entry with `id`, if present, and persist.
    pub fn remove_score(&self, id: EntryId) {
        let mut entries = self.lock_entries();
        let Some(index) = entries.iter().position(|entry| entry.id == id) else {
            return;
        };
        entries.remove(index);
        self.persist(&entries);
    }

    /// Attempt delivery of every entry present when the pass starts,
    /// oldest first, one request at a time.
    ///
    /// Each entry's attempt counter is incremented and persisted before its
    /// request is issued. Acknowledged entries are removed; failed ones stay
    /// queued and the pass moves on to the next entry.
    pub async fn flush(&self) -> FlushOutcome {
        let Some(_guard) = FlushGuard::acquire(&self.flushing, &self.idle) else {
            debug!("flush already in progress");
            return FlushOutcome::Skipped;
        };

        let ids: Vec<EntryId> = self.lock_entries().iter().map(|entry| entry.id).collect();
        if ids.is_empty() {
            return FlushOutcome::Skipped;
        }

        let mut report = FlushReport::default();
        for id in ids {
            let Some((payload, attempts)) = self.begin_attempt(id) else {
                // Removed while an earlier request was in flight.
                continue;
            };
            report.attempted += 1;

            match self.transport.deliver(&payload).await {
                Ok(()) => {
                    info!(entry_id = %id, attempts, "score delivered");
                    self.remove_score(id);
                    report.delivered += 1;
                }
                Err(err) => {
                    warn!(entry_id = %id, attempts, %err, "score delivery failed, will retry");
                    self.persist(&self.lock_entries());
                    report.failed += 1;
                }
            }
        }

        info!(
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            pending = self.pending_count(),
            "flush pass complete"
        );
        FlushOutcome::Completed(report)
    }

    /// Number of entries awaiting delivery.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock_entries().len()
    }

    /// Read-only projection of every pending entry.
    #[must_use]
    pub fn status(&self) -> QueueStatus {
        let entries = self.lock_entries();
        QueueStatus {
            pending: entries.len(),
            entries: entries.iter().map(QueueEntry::summary).collect(),
        }
    }

    /// Copy of the pending entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<QueueEntry> {
        self.lock_entries().clone()
    }

    /// Whether a flush pass is currently running.
    #[must_use]
    pub fn is_flushing(&self) -> bool {
        self.flushing.load(Ordering::SeqCst)
    }

    /// Wait until no flush pass is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a pass ending in between
            // still wakes us.
            notified.as_mut().enable();
            if !self.is_flushing() {
                return;
            }
            notified.await;
        }
    }

    /// Options this queue was opened with.
    #[must_use]
    pub fn options(&self) -> &QueueOptions {
        &self.options
    }

    fn spawn_flush(self: &Arc<Self>) {
        let Ok(handle) = Handle::try_current() else {
            debug!("no async runtime; enqueued score waits for the next flush");
            return;
        };
        let queue = Arc::clone(self);
        handle.spawn(
            async move {
                let _ = queue.flush().await;
            }
            .instrument(info_span!("score_flush", trigger = "enqueue")),
        );
    }

    /// Record an attempt for `id` and return what to send, or `None` if the
    /// entry is gone.
    fn begin_attempt(&self, id: EntryId) -> Option<(ScorePayload, u32)> {
        let mut entries = self.lock_entries();
        let entry = entries.iter_mut().find(|entry| entry.id == id)?;
        entry.attempts = entry.attempts.saturating_add(1);
        let attempt = (entry.payload(), entry.attempts);
        self.persist(&entries);
        Some(attempt)
    }

    /// Rewrite the whole snapshot. Failures are logged; the in-memory queue
    /// stays authoritative.
    fn persist(&self, entries: &[QueueEntry]) {
        let result = serde_json::to_string(entries)
            .map_err(AppError::from)
            .and_then(|raw| self.storage.store(&self.options.storage_key, &raw));
        if let Err(err) = result {
            error!(%err, pending = entries.len(), "failed to persist score queue");
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, Vec<QueueEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the single-flight flag for the duration of a pass.
struct FlushGuard<'a> {
    flushing: &'a AtomicBool,
    idle: &'a Notify,
}

impl<'a> FlushGuard<'a> {
    fn acquire(flushing: &'a AtomicBool, idle: &'a Notify) -> Option<Self> {
        flushing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flushing, idle })
    }
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.flushing.store(false, Ordering::SeqCst);
        self.idle.notify_waiters();
    }
}

fn load_snapshot(storage: &dyn QueueStorage, key: &str) -> Vec<QueueEntry> {
    let raw = match storage.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(%err, "persisted score queue unreadable, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Option<Vec<QueueEntry>>>(&raw) {
        Ok(entries) => entries.unwrap_or_default(),
        Err(err) => {
            warn!(%err, "persisted score queue is corrupt, starting empty");
            Vec::new()
        }
    }
}
