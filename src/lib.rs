#![forbid(unsafe_code)]

//! Durable score submission queue with background retry delivery.
//!
//! Scores are persisted the moment they are enqueued and delivered to a
//! remote scoring endpoint oldest-first, retrying until each one is
//! acknowledged. See [`queue::ScoreQueue`].

pub mod config;
pub mod errors;
pub mod models;
pub mod persistence;
pub mod queue;
pub mod transport;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
pub use queue::{FlushOutcome, FlushReport, QueueOptions, ScoreQueue};
