//! Delivery of score payloads to the scoring endpoint.
//!
//! The [`ScoreTransport`] trait decouples the queue from the network so the
//! queue can be driven by the real HTTP client or by scripted transports in
//! tests.

pub mod http;

pub use http::HttpTransport;

use std::future::Future;
use std::pin::Pin;

use crate::models::entry::ScorePayload;
use crate::Result;

/// Boxed future returned by [`ScoreTransport::deliver`].
pub type DeliveryFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Sends one score payload and reports whether it was acknowledged.
pub trait ScoreTransport: Send + Sync {
    /// Deliver `payload` to the scoring endpoint.
    ///
    /// Resolves to `Ok(())` only when the endpoint acknowledged the payload.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Delivery`](crate::AppError::Delivery) on a
    /// non-success response or a transport-level failure.
    fn deliver<'a>(&'a self, payload: &'a ScorePayload) -> DeliveryFuture<'a>;
}
