//! Queue entry model and its read-only projections.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a queued score submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One pending score submission awaiting delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueEntry {
    /// Identifier generated at enqueue time.
    pub id: EntryId,
    /// Player display name.
    pub name: String,
    /// Optional contact address.
    pub email: Option<String>,
    /// Final game score.
    pub score: i64,
    /// Creation time, informational only.
    pub timestamp: DateTime<Utc>,
    /// Delivery attempts made so far.
    pub attempts: u32,
}

impl QueueEntry {
    /// Construct a new entry with a generated identifier and zero attempts.
    #[must_use]
    pub fn new(name: String, email: Option<String>, score: i64) -> Self {
        Self {
            id: EntryId::new(),
            name,
            email,
            score,
            timestamp: Utc::now(),
            attempts: 0,
        }
    }

    /// Body sent to the scoring endpoint for this entry.
    #[must_use]
    pub fn payload(&self) -> ScorePayload {
        ScorePayload {
            name: self.name.clone(),
            email: self.email.clone(),
            score: self.score,
        }
    }

    /// Diagnostic view of this entry.
    #[must_use]
    pub fn summary(&self) -> EntrySummary {
        EntrySummary {
            name: self.name.clone(),
            score: self.score,
            attempts: self.attempts,
            timestamp: self.timestamp,
        }
    }
}

/// JSON body of a delivery request: `{name, email, score}`.
///
/// `email` serializes as `null` when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScorePayload {
    /// Player display name.
    pub name: String,
    /// Optional contact address.
    pub email: Option<String>,
    /// Final game score.
    pub score: i64,
}

/// Read-only projection of a pending entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntrySummary {
    /// Player display name.
    pub name: String,
    /// Final game score.
    pub score: i64,
    /// Delivery attempts made so far.
    pub attempts: u32,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the whole queue for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueStatus {
    /// Number of entries awaiting delivery.
    pub pending: usize,
    /// Pending entries, oldest first.
    pub entries: Vec<EntrySummary>,
}
