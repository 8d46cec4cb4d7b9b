//! Envelope execution against a scripted engine: one uniform result shape
//! for every failure origin, and no network traffic for malformed input.

use marionette::envelope::ErrorCode;
use marionette::{EngineClient, OperationEnvelope, OperationKind};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> EngineClient {
    EngineClient::new(&server.uri()).unwrap()
}

fn valid_query_value() -> Value {
    json!({
        "id": "corr-1",
        "target": { "address": "chan-1" },
        "op": { "kind": "query", "capability": "app.notes", "operation": "list" },
        "args": { "limit": 10 }
    })
}

#[tokio::test]
async fn malformed_envelopes_fail_fast_with_zero_network_calls() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let malformed = vec![
        json!("not an object"),
        json!({ "op": { "kind": "query" } }),
        json!({ "target": { "address": "chan-1" } }),
        json!({ "target": { "address": "chan-1" }, "op": { "kind": "mutate" } }),
        json!({
            "target": { "address": "chan-1" },
            "op": { "kind": "query", "capability": "app.notes" }
        }),
        json!({
            "target": { "address": "chan-1" },
            "op": { "kind": "event", "type": "create_actor" }
        }),
        json!({
            "target": { "address": "chan-1" },
            "op": { "kind": "query", "capability": "app.notes", "operation": "list" },
            "args": [1, 2]
        }),
        json!({
            "target": { "address": "chan-1" },
            "op": { "kind": "query", "capability": "app.notes", "operation": "list" },
            "args": null
        }),
    ];

    for raw in malformed {
        let result = client.execute_value(&raw).await;
        assert!(!result.success, "expected failure for {raw}");
        assert_eq!(result.error_code, Some(ErrorCode::InvalidRequest));
        assert!(result.error_message.is_some());
        assert!(result.metadata.transport_status.is_none());
    }

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "validation must precede any network call");
}

#[tokio::test]
async fn query_routes_to_query_path_and_carries_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/c/chan-1/query/app.notes/list"))
        .and(body_json(json!({ "limit": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "things": ["a", "b"] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.execute_value(&valid_query_value()).await;

    assert!(result.success);
    assert_eq!(result.correlation_id, "corr-1");
    assert_eq!(result.data, Some(json!({ "things": ["a", "b"] })));
    assert_eq!(result.metadata.kind, Some(OperationKind::Query));
    assert_eq!(result.metadata.capability.as_deref(), Some("app.notes"));
    assert_eq!(result.metadata.operation.as_deref(), Some("list"));
    assert_eq!(result.metadata.transport_status, Some(200));
}

#[tokio::test]
async fn event_routes_to_event_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/c/chan-1/event/workspace/create_actor"))
        .and(body_json(json!({ "name": "Backpack" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let envelope = OperationEnvelope::event("chan-1", "workspace", "create_actor")
        .with_arguments(
            json!({ "name": "Backpack" })
                .as_object()
                .cloned()
                .unwrap(),
        );
    let result = client.execute(envelope).await;

    assert!(result.success);
    assert_eq!(result.metadata.kind, Some(OperationKind::Event));
    assert_eq!(result.metadata.domain.as_deref(), Some("workspace"));
    assert_eq!(result.metadata.event_type.as_deref(), Some("create_actor"));
}

#[tokio::test]
async fn non_2xx_response_yields_http_error_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/c/chan-1/query/app.notes/list"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "reason": "overloaded" })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.execute_value(&valid_query_value()).await;

    assert!(!result.success);
    assert_eq!(result.error_code, Some(ErrorCode::HttpError));
    assert_eq!(result.metadata.transport_status, Some(503));
    assert_eq!(result.error_details, Some(json!({ "reason": "overloaded" })));
}

#[tokio::test]
async fn network_failure_yields_network_error_without_panicking() {
    // Nothing listens on this port; the connect fails immediately.
    let client = EngineClient::new("http://127.0.0.1:1").unwrap();
    let result = client.execute_value(&valid_query_value()).await;

    assert!(!result.success);
    assert_eq!(result.error_code, Some(ErrorCode::NetworkError));
    assert!(result.metadata.transport_status.is_none());
    assert_eq!(result.correlation_id, "corr-1");
}

#[tokio::test]
async fn correlation_id_is_generated_when_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/c/chan-1/query/app.notes/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .execute(OperationEnvelope::query("chan-1", "app.notes", "list"))
        .await;

    assert!(result.success);
    assert!(!result.correlation_id.is_empty());
}

#[tokio::test]
async fn embedded_error_is_not_unwrapped_by_the_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/c/chan-1/query/app.notes/list"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": "no such notebook" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.execute_value(&valid_query_value()).await;

    // Transport succeeded, so this layer reports success; the embedded
    // application error is exposed only through the explicit helper.
    assert!(result.success);
    assert_eq!(result.embedded_error(), Some(&json!("no such notebook")));
}
