use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use colloquy::client::ChatClient;
use colloquy::config::GenerationOptions;
use colloquy::session::{Message, MessageRole};

const MODEL: &str = "test-org/test-model";
const KEY: &str = "hf_testkey12345";

fn history() -> Vec<Message> {
    vec![
        Message::new(MessageRole::User, "Hi"),
        Message::new(MessageRole::Assistant, "Hello"),
        Message::new(MessageRole::User, "How are you?"),
    ]
}

fn options() -> GenerationOptions {
    GenerationOptions::default()
}

/// Happy path: bearer auth, fixed parameters, serialized history, trimmed reply
#[tokio::test]
async fn test_send_message_success_sends_expected_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .and(body_partial_json(json!({
            "inputs": "Human: Hi\n\nAssistant: Hello\n\nHuman: How are you?\n\nAssistant:",
            "parameters": {
                "max_new_tokens": 512,
                "return_full_text": false,
                "do_sample": true
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "  Doing well!  "}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();
    let reply = client
        .send_message(&history(), KEY, MODEL, &options())
        .await
        .unwrap();

    assert_eq!(reply, "Doing well!");
    assert!(!client.has_active_request());
}

#[tokio::test]
async fn test_send_message_429_maps_to_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();
    let err = client
        .send_message(&history(), KEY, MODEL, &options())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "rate_limit");
    assert_eq!(err.retry_after(), Some(60));
}

#[tokio::test]
async fn test_send_message_503_maps_to_model_loading_with_estimate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": "Model test-org/test-model is currently loading",
            "estimated_time": 15
        })))
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();
    let err = client
        .send_message(&history(), KEY, MODEL, &options())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "model_loading");
    assert_eq!(err.retry_after(), Some(15));
}

#[tokio::test]
async fn test_send_message_503_without_estimate_uses_default() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();
    let err = client
        .send_message(&history(), KEY, MODEL, &options())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "model_loading");
    assert_eq!(err.retry_after(), Some(20));
}

#[tokio::test]
async fn test_send_message_401_maps_to_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();
    let err = client
        .send_message(&history(), KEY, MODEL, &options())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "api_key");
    assert_eq!(err.retry_after(), None);
}

#[tokio::test]
async fn test_send_message_blank_generated_text_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "   "}])),
        )
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();
    let err = client
        .send_message(&history(), KEY, MODEL, &options())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "empty_response");
}

#[tokio::test]
async fn test_send_message_empty_array_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();
    let err = client
        .send_message(&history(), KEY, MODEL, &options())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "empty_response");
}

#[tokio::test]
async fn test_send_message_unexpected_status_keeps_remote_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();
    let err = client
        .send_message(&history(), KEY, MODEL, &options())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "unknown");
    assert_eq!(err.to_string(), "boom");
}

#[tokio::test]
async fn test_send_message_connection_refused_is_network_error() {
    // Nothing listens on this port.
    let client = ChatClient::with_base_url("http://127.0.0.1:1").unwrap();
    let err = client
        .send_message(&history(), KEY, MODEL, &options())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "network");
}

/// A second send supersedes the first: the first resolves as cancelled,
/// only the second's reply survives.
#[tokio::test]
async fn test_second_send_cancels_first() {
    let server = MockServer::start().await;

    // The first request stalls long enough to still be in flight when
    // the second arrives.
    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"generated_text": "first"}]))
                .set_delay(Duration::from_secs(10)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "second"}])))
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();

    let first_client = client.clone();
    let first_history = history();
    let first = tokio::spawn(async move {
        first_client
            .send_message(&first_history, KEY, MODEL, &options())
            .await
    });

    // Let the first request reach the server before superseding it.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(client.has_active_request());

    let second = client
        .send_message(&history(), KEY, MODEL, &options())
        .await
        .unwrap();
    assert_eq!(second, "second");

    let first = first.await.unwrap().unwrap_err();
    assert_eq!(first.kind(), "timeout");
    assert!(!client.has_active_request());
}

#[tokio::test]
async fn test_cancel_current_request_aborts_in_flight_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"generated_text": "late"}]))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();

    let in_flight = client.clone();
    let in_flight_history = history();
    let handle = tokio::spawn(async move {
        in_flight
            .send_message(&in_flight_history, KEY, MODEL, &options())
            .await
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    client.cancel_current_request();
    // Cancelling again is a no-op.
    client.cancel_current_request();

    let err = handle.await.unwrap().unwrap_err();
    assert_eq!(err.kind(), "timeout");
    assert!(!client.has_active_request());
}

#[tokio::test]
async fn test_generate_title_strips_quotes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .and(body_partial_json(json!({
            "parameters": {"max_new_tokens": 20, "temperature": 0.5}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"generated_text": "\"Quantum Basics\""}])),
        )
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();
    let title = client
        .generate_title("What is entanglement?", "It links particle states.", KEY, MODEL)
        .await;

    assert_eq!(title.as_deref(), Some("Quantum Basics"));
}

#[tokio::test]
async fn test_generate_title_swallows_failures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();
    let title = client.generate_title("Hi", "Hello", KEY, MODEL).await;
    assert_eq!(title, None);
}

#[tokio::test]
async fn test_generate_title_does_not_occupy_the_single_flight_slot() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{MODEL}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "A Title"}])),
        )
        .mount(&server)
        .await;

    let client = ChatClient::with_base_url(server.uri()).unwrap();
    let title = client.generate_title("Hi", "Hello", KEY, MODEL).await;
    assert_eq!(title.as_deref(), Some("A Title"));
    assert!(!client.has_active_request());
}
