//! HTTP client for the pipeline API.
//!
//! Best-effort relay: one attempt per call, no retry queue, no state between
//! calls. The API authenticates with an `x-api-key` header and reports
//! failures as `{"error": "..."}` bodies, which are surfaced verbatim so the
//! user sees exactly what the server said.

use crate::models::{ApiError, BatchCreated, BatchPayload, CandidateLead, LeadCreated};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("No API key set. Run `leadscout connect <key>` to add one.")]
    MissingKey,
    /// The server answered with a non-success status; the message is the
    /// server's own when it sent one.
    #[error("{message}")]
    Server {
        status: StatusCode,
        message: String,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client for submitting leads. Cheap to clone (shares the connection pool).
#[derive(Debug, Clone, Default)]
pub struct ImportClient {
    http: Client,
}

impl ImportClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// `POST {base}/api/leads`: create a single lead.
    pub async fn submit_one(
        &self,
        base: &str,
        api_key: &str,
        lead: &CandidateLead,
    ) -> Result<LeadCreated, ImportError> {
        debug!(name = %lead.name, "submitting single lead");
        let response = self
            .http
            .post(format!("{base}/api/leads"))
            .header(API_KEY_HEADER, api_key)
            .json(lead)
            .send()
            .await?;
        Self::parse(response, "Failed to send lead").await
    }

    /// `POST {base}/api/leads/batch`: create many leads in one call.
    pub async fn submit_batch(
        &self,
        base: &str,
        api_key: &str,
        payload: &BatchPayload,
    ) -> Result<BatchCreated, ImportError> {
        debug!(count = payload.leads.len(), "submitting lead batch");
        let response = self
            .http
            .post(format!("{base}/api/leads/batch"))
            .header(API_KEY_HEADER, api_key)
            .json(payload)
            .send()
            .await?;
        Self::parse(response, "Failed to send leads").await
    }

    /// Decode a success body, or convert a non-success status into a
    /// failure carrying the server's `{error}` message when present.
    async fn parse<T: DeserializeOwned>(
        response: Response,
        fallback: &str,
    ) -> Result<T, ImportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<ApiError>().await {
            Ok(body) => body.error,
            Err(_) => fallback.to_string(),
        };
        Err(ImportError::Server { status, message })
    }
}
