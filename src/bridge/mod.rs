//! Asynchronous request/response bridge between the page-side controller and
//! the relay task.
//!
//! The relay is the only holder of durable credentials and the only side
//! allowed to talk to the backend, so the controller never calls it
//! directly: every interaction is a message with an explicit success/error
//! envelope. Sends are single-attempt with no retry queue; a failed
//! action is terminal and surfaced to the user.

use crate::models::{BatchPayload, CandidateLead};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

/// Messages the relay understands. Wire shape is `{type, payload?}` with
/// SCREAMING_CASE type tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum BridgeMessage {
    #[serde(rename = "SEND_LEAD")]
    SendLead(CandidateLead),
    #[serde(rename = "SEND_LEADS_BATCH")]
    SendLeadsBatch(BatchPayload),
    #[serde(rename = "SAVE_API_KEY")]
    SaveApiKey { key: String },
    #[serde(rename = "GET_API_KEY")]
    GetApiKey,
    #[serde(rename = "SAVE_API_BASE")]
    SaveApiBase { url: String },
    #[serde(rename = "GET_API_BASE")]
    GetApiBase,
}

/// Uniform response envelope: `{success, result?, error?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    #[must_use]
    pub fn ok(result: serde_json::Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    #[must_use]
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }
}

/// The two failure channels a send can hit, kept distinct because the user
/// remediation differs.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The relay side of the channel is gone: the session was torn down
    /// under us, the analogue of an extension reload invalidating its
    /// execution context.
    #[error("session was reloaded. Please refresh the page and try again")]
    Invalidated,
    /// The relay accepted the message but never answered.
    #[error("relay error. Please refresh the page and try again")]
    NoResponse,
}

/// One in-flight request: the message plus the slot for its response.
#[derive(Debug)]
pub struct BridgeRequest {
    pub message: BridgeMessage,
    pub respond: oneshot::Sender<BridgeResponse>,
}

/// Controller-side handle. Cheap to clone; all clones feed the same relay.
#[derive(Debug, Clone)]
pub struct Bridge {
    tx: mpsc::Sender<BridgeRequest>,
}

/// Create a connected bridge. The receiver half is handed to the relay task.
#[must_use]
pub fn channel(capacity: usize) -> (Bridge, mpsc::Receiver<BridgeRequest>) {
    let (tx, rx) = mpsc::channel(capacity);
    (Bridge { tx }, rx)
}

impl Bridge {
    /// Send one message and wait for its envelope. Single attempt, no retry.
    pub async fn send(&self, message: BridgeMessage) -> Result<BridgeResponse, BridgeError> {
        let (respond, rx) = oneshot::channel();
        self.tx
            .send(BridgeRequest { message, respond })
            .await
            .map_err(|_| BridgeError::Invalidated)?;
        rx.await.map_err(|_| BridgeError::NoResponse)
    }
}
