//! Leadscout: a browser-side lead capture tool for CRM pipelines.
//!
//! Drives a real Chromium session the user browses in, injects import
//! controls on supported social pages, mines commenter names and profile
//! links out of comment threads, and submits the selected leads to the CRM
//! server over its import API.

pub mod bridge;
pub mod browser;
pub mod classifier;
pub mod cli;
pub mod controller;
pub mod extractor;
pub mod inject;
pub mod locator;
pub mod models;
pub mod panel;
pub mod profile_url;
pub mod relay;

pub use bridge::{Bridge, BridgeError, BridgeMessage, BridgeResponse};
pub use classifier::{PageKind, classify};
pub use extractor::extract;
pub use models::{BatchPayload, CandidateLead, Platform};
pub use panel::{MasterState, SelectionState};
pub use relay::{ConfigStore, ImportClient, ImportError, Relay};
