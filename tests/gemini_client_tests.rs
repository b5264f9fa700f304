// Gemini client tests against a mock server
// Author: kelexine (https://github.com/kelexine)

use label_helper::config::{ApiKey, GeminiConfig};
use label_helper::error::LabelError;
use label_helper::gemini::{GeminiClient, LabelInterpreter};
use label_helper::vision::NormalizedImage;
use mockito::Matcher;
use serde_json::json;

const PATH: &str = "/v1/models/gemini-1.5-flash:generateContent";

fn client_for(server: &mockito::ServerGuard) -> GeminiClient {
    let config = GeminiConfig {
        api_base_url: format!("{}/v1", server.url()),
        api_key: ApiKey::new("test-key"),
        timeout_seconds: 5,
        ..GeminiConfig::default()
    };
    GeminiClient::new(&config).unwrap()
}

fn image() -> NormalizedImage {
    NormalizedImage {
        bytes: b"\xFF\xD8\xFFfake".to_vec(),
        mime_type: "image/jpeg".to_string(),
        dimensions: Some((1, 1)),
    }
}

#[tokio::test]
async fn test_interpret_sends_prompt_and_inline_image() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::Json(json!({
            "contents": [
                { "parts": [
                    { "text": "read the label" },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/ZmFrZQ==" } }
                ]}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"類型：食品"}],"role":"model"},"finishReason":"STOP"}]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let text = client.interpret(&image(), "read the label").await.unwrap();

    assert_eq!(text, "類型：食品");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_200_carries_status_and_raw_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body(r#"{"error":"rate limited"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.interpret(&image(), "p").await.unwrap_err();

    match &err {
        LabelError::InterpreterRequestFailed { status, body } => {
            assert_eq!(*status, 429);
            assert_eq!(body, r#"{"error":"rate limited"}"#);
        }
        other => panic!("expected InterpreterRequestFailed, got {:?}", other),
    }
    assert!(err.to_string().contains("429"));
    assert!(err.to_string().contains("rate limited"));
}

#[tokio::test]
async fn test_non_200_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("unavailable")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(client.interpret(&image(), "p").await.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_200_with_unexpected_shape_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates":[]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.interpret(&image(), "p").await.unwrap_err();
    assert!(matches!(err, LabelError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_200_with_non_json_body_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.interpret(&image(), "p").await.unwrap_err();
    assert!(matches!(err, LabelError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unreachable_host() {
    let config = GeminiConfig {
        // Port 9 (discard) on localhost is reliably closed in test environments
        api_base_url: "http://127.0.0.1:9/v1".to_string(),
        api_key: ApiKey::new("secret-key-value"),
        timeout_seconds: 2,
        ..GeminiConfig::default()
    };
    let client = GeminiClient::new(&config).unwrap();

    let err = client.interpret(&image(), "p").await.unwrap_err();
    assert!(matches!(err, LabelError::InterpreterUnreachable(_)));
    assert!(!err.to_string().contains("secret-key-value"));
}
