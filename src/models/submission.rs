//! Validation of player-supplied score submissions.
//!
//! The queue itself never validates; callers run submissions through
//! [`ScoreSubmission::new`] first so that only requests the scoring endpoint
//! will accept are enqueued.

use crate::{AppError, Result};

/// Maximum length of a player name, in characters.
pub const MAX_NAME_CHARS: usize = 50;

/// Maximum length of a contact address, in characters.
pub const MAX_EMAIL_CHARS: usize = 100;

/// A normalized score submission ready to be enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSubmission {
    /// Trimmed player name, at most [`MAX_NAME_CHARS`] characters.
    pub name: String,
    /// Trimmed contact address, at most [`MAX_EMAIL_CHARS`] characters.
    pub email: Option<String>,
    /// Final game score.
    pub score: i64,
}

impl ScoreSubmission {
    /// Validate and normalize raw submission input.
    ///
    /// Names are trimmed and truncated; a blank email counts as absent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the name is blank or the email is
    /// present but has no `@`.
    pub fn new(name: &str, email: Option<&str>, score: i64) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name is required".into()));
        }

        let email = match email.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) if !value.contains('@') => {
                return Err(AppError::Validation(format!("invalid email: {value}")));
            }
            Some(value) => Some(truncate_chars(value, MAX_EMAIL_CHARS)),
            None => None,
        };

        Ok(Self {
            name: truncate_chars(name, MAX_NAME_CHARS),
            email,
            score,
        })
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
