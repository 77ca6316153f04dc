//! The relay task: the bridge's far side.
//!
//! Owns the persisted connection config and the HTTP client, the way the
//! original extension's background process owns the credential store and is
//! the only context allowed to make cross-origin requests. Stateless across
//! requests except for that config.

pub mod client;
pub mod config_store;

pub use client::{ImportClient, ImportError};
pub use config_store::{ConfigStore, DEFAULT_SERVER_BASE};

use crate::bridge::{BridgeMessage, BridgeRequest, BridgeResponse};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Message handler state.
pub struct Relay {
    store: ConfigStore,
    client: ImportClient,
}

impl Relay {
    #[must_use]
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            client: ImportClient::new(),
        }
    }

    /// Spawn the relay loop; it runs until every [`crate::bridge::Bridge`]
    /// handle is dropped.
    pub fn spawn(mut self, mut rx: mpsc::Receiver<BridgeRequest>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let response = self.handle(request.message).await;
                // A dropped responder means the caller gave up; nothing to do.
                let _ = request.respond.send(response);
            }
            info!("relay shutting down: all bridge handles dropped");
        })
    }

    async fn handle(&mut self, message: BridgeMessage) -> BridgeResponse {
        // The CLI may have changed the key or server from another terminal;
        // pick that up before acting. A failed reload keeps the last good
        // config rather than failing the request.
        if let Err(e) = self.store.reload() {
            warn!("could not reload connection config: {e:#}");
        }

        match message {
            BridgeMessage::SendLead(lead) => {
                let name = lead.name.clone();
                match self.submit_one(&lead).await {
                    Ok(created) => {
                        info!(%name, "lead imported");
                        BridgeResponse::ok(json!({ "lead": created.lead }))
                    }
                    Err(e) => {
                        warn!(%name, "lead import failed: {e}");
                        BridgeResponse::err(e.to_string())
                    }
                }
            }
            BridgeMessage::SendLeadsBatch(payload) => {
                let requested = payload.leads.len();
                match self.submit_batch(&payload).await {
                    Ok(created) => {
                        info!(requested, imported = created.count, "batch imported");
                        BridgeResponse::ok(json!({ "count": created.count }))
                    }
                    Err(e) => {
                        warn!(requested, "batch import failed: {e}");
                        BridgeResponse::err(e.to_string())
                    }
                }
            }
            BridgeMessage::SaveApiKey { key } => match self.store.set_api_key(&key) {
                Ok(()) => BridgeResponse::ok(json!({})),
                Err(e) => BridgeResponse::err(e.to_string()),
            },
            BridgeMessage::GetApiKey => {
                BridgeResponse::ok(json!({ "key": self.store.api_key() }))
            }
            BridgeMessage::SaveApiBase { url } => match self.store.set_server_base(&url) {
                Ok(()) => BridgeResponse::ok(json!({})),
                Err(e) => BridgeResponse::err(e.to_string()),
            },
            BridgeMessage::GetApiBase => {
                BridgeResponse::ok(json!({ "url": self.store.server_base_url() }))
            }
        }
    }

    async fn submit_one(
        &self,
        lead: &crate::models::CandidateLead,
    ) -> Result<crate::models::LeadCreated, ImportError> {
        let key = self.store.api_key().ok_or(ImportError::MissingKey)?;
        self.client
            .submit_one(self.store.server_base_url(), key, lead)
            .await
    }

    async fn submit_batch(
        &self,
        payload: &crate::models::BatchPayload,
    ) -> Result<crate::models::BatchCreated, ImportError> {
        let key = self.store.api_key().ok_or(ImportError::MissingKey)?;
        self.client
            .submit_batch(self.store.server_base_url(), key, payload)
            .await
    }
}
