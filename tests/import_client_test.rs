//! Wire-level tests for the import client against a mock pipeline server.

use leadscout::models::{BatchPayload, CandidateLead, Platform};
use leadscout::relay::{ImportClient, ImportError};

fn lead(name: &str, path: &str) -> CandidateLead {
    CandidateLead {
        name: name.to_string(),
        profile_url: format!("https://www.facebook.com{path}"),
        platform: Platform::Facebook,
        avatar_url: None,
    }
}

#[tokio::test]
async fn test_submit_one_posts_lead_with_api_key_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/leads")
        .match_header("x-api-key", "pk_test")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "name": "Jane Doe",
            "profileUrl": "https://www.facebook.com/jane.doe",
            "platform": "facebook",
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"lead":{"id":"lead_1","name":"Jane Doe"}}"#)
        .create_async()
        .await;

    let client = ImportClient::new();
    let created = client
        .submit_one(&server.url(), "pk_test", &lead("Jane Doe", "/jane.doe"))
        .await
        .expect("submission should succeed");

    assert!(created.success);
    assert_eq!(created.lead["id"], "lead_1");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_body_is_surfaced_verbatim() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/leads")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"Invalid API key"}"#)
        .create_async()
        .await;

    let client = ImportClient::new();
    let err = client
        .submit_one(&server.url(), "pk_expired", &lead("Jane Doe", "/jane.doe"))
        .await
        .expect_err("401 should be an error");

    match err {
        ImportError::Server { status, message } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("expected Server error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_falls_back_to_generic_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/leads")
        .with_status(500)
        .with_body("<html>upstream exploded</html>")
        .create_async()
        .await;

    let client = ImportClient::new();
    let err = client
        .submit_one(&server.url(), "pk_test", &lead("Jane Doe", "/jane.doe"))
        .await
        .expect_err("500 should be an error");

    match err {
        ImportError::Server { message, .. } => assert_eq!(message, "Failed to send lead"),
        other => panic!("expected Server error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_batch_posts_all_leads_and_reads_count() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/leads/batch")
        .match_header("x-api-key", "pk_test")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "leads": [
                {"name": "Jane Doe"},
                {"name": "Sam Smith"},
            ],
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"count":2,"leads":[{"id":"l1"},{"id":"l2"}]}"#)
        .create_async()
        .await;

    let payload = BatchPayload {
        leads: vec![lead("Jane Doe", "/jane.doe"), lead("Sam Smith", "/sam.smith")],
        stage_id: None,
    };

    let client = ImportClient::new();
    let created = client
        .submit_batch(&server.url(), "pk_test", &payload)
        .await
        .expect("batch should succeed");

    assert!(created.success);
    assert_eq!(created.count, 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_batch_rejection_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/leads/batch")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"No leads provided."}"#)
        .create_async()
        .await;

    let payload = BatchPayload {
        leads: Vec::new(),
        stage_id: None,
    };

    let client = ImportClient::new();
    let err = client
        .submit_batch(&server.url(), "pk_test", &payload)
        .await
        .expect_err("empty batch should be rejected");

    match err {
        ImportError::Server { status, message } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "No leads provided.");
        }
        other => panic!("expected Server error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_stage_id_is_included_when_set() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/leads/batch")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "stageId": "stage_42",
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"count":1,"leads":[]}"#)
        .create_async()
        .await;

    let payload = BatchPayload {
        leads: vec![lead("Jane Doe", "/jane.doe")],
        stage_id: Some("stage_42".to_string()),
    };

    let client = ImportClient::new();
    client
        .submit_batch(&server.url(), "pk_test", &payload)
        .await
        .expect("batch should succeed");
    mock.assert_async().await;
}
