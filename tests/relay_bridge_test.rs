//! End-to-end bridge tests: messages go in one side, the relay task answers
//! from the other, with a mock pipeline server behind it.

use leadscout::bridge::{self, BridgeError, BridgeMessage};
use leadscout::models::{BatchPayload, CandidateLead, Platform};
use leadscout::relay::{ConfigStore, Relay};

fn lead(name: &str) -> CandidateLead {
    CandidateLead {
        name: name.to_string(),
        profile_url: "https://www.facebook.com/jane.doe".to_string(),
        platform: Platform::Facebook,
        avatar_url: None,
    }
}

fn connected_store(dir: &tempfile::TempDir, server_url: &str) -> ConfigStore {
    let mut store = ConfigStore::open(dir.path().join("config.json")).unwrap();
    store.set_api_key("pk_e2e").unwrap();
    store.set_server_base(server_url).unwrap();
    store
}

#[tokio::test]
async fn test_send_lead_roundtrip() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/leads")
        .match_header("x-api-key", "pk_e2e")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"lead":{"id":"lead_9"}}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (bridge, rx) = bridge::channel(4);
    let relay = Relay::new(connected_store(&dir, &server.url())).spawn(rx);

    let response = bridge
        .send(BridgeMessage::SendLead(lead("Jane Doe")))
        .await
        .expect("bridge should answer");

    assert!(response.success);
    let result = response.result.expect("success carries a result");
    assert_eq!(result["lead"]["id"], "lead_9");
    mock.assert_async().await;
    relay.abort();
}

#[tokio::test]
async fn test_batch_roundtrip_reports_count() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/leads/batch")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"count":3,"leads":[]}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (bridge, rx) = bridge::channel(4);
    let relay = Relay::new(connected_store(&dir, &server.url())).spawn(rx);

    let payload = BatchPayload {
        leads: vec![lead("A B"), lead("C D"), lead("E F")],
        stage_id: None,
    };
    let response = bridge
        .send(BridgeMessage::SendLeadsBatch(payload))
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.result.unwrap()["count"], 3);
    relay.abort();
}

#[tokio::test]
async fn test_missing_key_fails_without_touching_the_server() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::open(dir.path().join("config.json")).unwrap();
    let (bridge, rx) = bridge::channel(4);
    let relay = Relay::new(store).spawn(rx);

    let response = bridge
        .send(BridgeMessage::SendLead(lead("Jane Doe")))
        .await
        .unwrap();

    assert!(!response.success);
    let message = response.error.expect("failure carries a message");
    assert!(message.contains("No API key set"), "got: {message}");
    relay.abort();
}

#[tokio::test]
async fn test_key_and_base_can_be_managed_over_the_bridge() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::open(dir.path().join("config.json")).unwrap();
    let (bridge, rx) = bridge::channel(4);
    let relay = Relay::new(store).spawn(rx);

    let response = bridge
        .send(BridgeMessage::SaveApiKey {
            key: "pk_fresh".to_string(),
        })
        .await
        .unwrap();
    assert!(response.success);

    let response = bridge.send(BridgeMessage::GetApiKey).await.unwrap();
    assert!(response.success);
    assert_eq!(response.result.unwrap()["key"], "pk_fresh");

    // Malformed keys are refused and reported, not stored.
    let response = bridge
        .send(BridgeMessage::SaveApiKey {
            key: "not-a-key".to_string(),
        })
        .await
        .unwrap();
    assert!(!response.success);

    let response = bridge.send(BridgeMessage::GetApiKey).await.unwrap();
    assert_eq!(response.result.unwrap()["key"], "pk_fresh");
    relay.abort();
}

#[tokio::test]
async fn test_key_saved_from_another_terminal_is_used_mid_session() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/leads")
        .match_header("x-api-key", "pk_late")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"lead":{"id":"lead_1"}}"#)
        .create_async()
        .await;

    // The session starts with a server URL but no key.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut store = ConfigStore::open(&path).unwrap();
    store.set_server_base(&server.url()).unwrap();
    let (bridge, rx) = bridge::channel(4);
    let relay = Relay::new(store).spawn(rx);

    // `leadscout connect` writes the key from another terminal.
    let mut cli_store = ConfigStore::open(&path).unwrap();
    cli_store.set_api_key("pk_late").unwrap();

    let response = bridge
        .send(BridgeMessage::SendLead(lead("Jane Doe")))
        .await
        .unwrap();
    assert!(response.success, "error: {:?}", response.error);
    mock.assert_async().await;
    relay.abort();
}

#[tokio::test]
async fn test_dead_relay_reads_as_invalidated_session() {
    let (bridge, rx) = bridge::channel(4);
    drop(rx);

    let err = bridge
        .send(BridgeMessage::GetApiKey)
        .await
        .expect_err("closed channel should error");

    assert!(matches!(err, BridgeError::Invalidated));
    assert!(err.to_string().contains("reloaded"));
}
