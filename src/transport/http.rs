//! HTTP transport posting JSON to the scoring endpoint.

use reqwest::{Client, Url};
use tracing::debug;

use super::{DeliveryFuture, ScoreTransport};
use crate::models::entry::ScorePayload;
use crate::{AppError, Result};

/// Posts `{name, email, score}` as JSON; any 2xx response is success.
///
/// No request timeout is configured; failures surface from the underlying
/// connection.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `endpoint` is not a valid URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|err| AppError::Config(format!("endpoint invalid: {err}")))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
        })
    }

    /// Endpoint this transport posts to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, payload: &ScorePayload) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        debug!(%status, "scoring endpoint responded");
        if status.is_success() {
            Ok(())
        } else {
            Err(AppError::Delivery(format!(
                "scoring endpoint returned {status}"
            )))
        }
    }
}

impl ScoreTransport for HttpTransport {
    fn deliver<'a>(&'a self, payload: &'a ScorePayload) -> DeliveryFuture<'a> {
        Box::pin(self.post(payload))
    }
}
