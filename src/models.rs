//! Core data types shared between the page-side controller and the relay.
//!
//! Everything here serializes to the wire shapes the pipeline API expects
//! (camelCase field names, lowercase platform tags).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source network a lead was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
}

impl Platform {
    /// Infer the platform from a URL host, if recognizable.
    #[must_use]
    pub fn from_host(host: &str) -> Option<Self> {
        if host.contains("instagram.com") {
            Some(Self::Instagram)
        } else if host.contains("facebook.com") {
            Some(Self::Facebook)
        } else {
            None
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Facebook => write!(f, "facebook"),
            Self::Instagram => write!(f, "instagram"),
        }
    }
}

/// An unconfirmed, extraction-time lead pending user review.
///
/// Candidate leads live only as long as the current page session: they are
/// produced by the extractor, held by the selection panel, and either
/// submitted as create payloads or discarded when the panel closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateLead {
    pub name: String,
    /// Normalized absolute URL identifying the source-platform account.
    pub profile_url: String,
    pub platform: Platform,
    /// Best-effort avatar image URL; absence is valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Body for `POST {base}/api/leads/batch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    pub leads: Vec<CandidateLead>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<String>,
}

/// Success body of `POST {base}/api/leads` (201).
#[derive(Debug, Clone, Deserialize)]
pub struct LeadCreated {
    pub success: bool,
    pub lead: serde_json::Value,
}

/// Success body of `POST {base}/api/leads/batch` (201).
#[derive(Debug, Clone, Deserialize)]
pub struct BatchCreated {
    pub success: bool,
    pub count: usize,
    #[serde(default)]
    pub leads: serde_json::Value,
}

/// Error body the API returns on 4xx/5xx: `{"error": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Platform::Facebook).unwrap(),
            "\"facebook\""
        );
        assert_eq!(
            serde_json::to_string(&Platform::Instagram).unwrap(),
            "\"instagram\""
        );
    }

    #[test]
    fn platform_from_host() {
        assert_eq!(
            Platform::from_host("www.facebook.com"),
            Some(Platform::Facebook)
        );
        assert_eq!(
            Platform::from_host("www.instagram.com"),
            Some(Platform::Instagram)
        );
        assert_eq!(Platform::from_host("example.com"), None);
    }

    #[test]
    fn candidate_lead_wire_shape() {
        let lead = CandidateLead {
            name: "Jane Doe".to_string(),
            profile_url: "https://www.facebook.com/jane.doe123".to_string(),
            platform: Platform::Facebook,
            avatar_url: None,
        };
        let json = serde_json::to_value(&lead).unwrap();
        assert_eq!(json["name"], "Jane Doe");
        assert_eq!(json["profileUrl"], "https://www.facebook.com/jane.doe123");
        assert_eq!(json["platform"], "facebook");
        // Absent avatar is omitted, not null
        assert!(json.get("avatarUrl").is_none());
    }

    #[test]
    fn batch_payload_includes_stage_when_set() {
        let payload = BatchPayload {
            leads: vec![],
            stage_id: Some("stage-1".to_string()),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["stageId"], "stage-1");
    }
}
