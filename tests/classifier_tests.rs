//! Unit and mock HTTP tests for GestureClient.
//!
//! These tests cover:
//! - Client creation and configuration
//! - Request formatting against a mock server
//! - The never-fails contract: every failure mode yields GestureLabel::None

use handbloom::classifier::{ClassifyError, GestureClient, GEMINI_API_KEY_ENV};
use handbloom::gesture::GestureLabel;

const TEST_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

// === Client Creation Tests ===

#[test]
fn test_with_api_key_creates_client() {
    let client = GestureClient::with_api_key("test-api-key".to_string()).unwrap();
    assert!(client.has_api_key());
}

#[test]
fn test_with_api_key_empty_returns_error() {
    let result = GestureClient::with_api_key("".to_string());
    assert!(matches!(result, Err(ClassifyError::MissingApiKey)));
}

#[test]
fn test_with_base_url_creates_client() {
    let client =
        GestureClient::with_base_url("test-key".to_string(), "https://custom.api".to_string())
            .unwrap();
    assert_eq!(client.base_url(), "https://custom.api");
}

#[test]
fn test_from_env_without_key_still_builds() {
    let original = std::env::var(GEMINI_API_KEY_ENV).ok();
    std::env::remove_var(GEMINI_API_KEY_ENV);

    let client = GestureClient::from_env().unwrap();
    assert!(!client.has_api_key());

    if let Some(val) = original {
        std::env::set_var(GEMINI_API_KEY_ENV, val);
    }
}

// === Never-Fails Contract Tests ===

#[tokio::test]
async fn test_missing_api_key_classifies_as_none() {
    let original = std::env::var(GEMINI_API_KEY_ENV).ok();
    std::env::remove_var(GEMINI_API_KEY_ENV);

    let client = GestureClient::from_env().unwrap();
    let label = client.classify(TEST_JPEG).await;
    assert_eq!(label, GestureLabel::None);

    if let Some(val) = original {
        std::env::set_var(GEMINI_API_KEY_ENV, val);
    }
}

#[tokio::test]
async fn test_unreachable_server_classifies_as_none() {
    // Nothing listens on this port; the transport error must be absorbed.
    let client =
        GestureClient::with_base_url("test-key".to_string(), "http://127.0.0.1:1".to_string())
            .unwrap();
    let label = client.classify(TEST_JPEG).await;
    assert_eq!(label, GestureLabel::None);
}

// === Mock HTTP Server Tests ===

mod mock_http_tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn text_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": text}]
                }
            }]
        })
    }

    async fn client_for(server: &MockServer) -> GestureClient {
        GestureClient::with_base_url("test-api-key".to_string(), server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_classify_parses_plain_label() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(query_param("key", "test-api-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(text_response("OPEN")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        assert_eq!(client.classify(TEST_JPEG).await, GestureLabel::Open);
    }

    #[tokio::test]
    async fn test_classify_strips_code_fence() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(text_response("```\nFIST\n```")),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        assert_eq!(client.classify(TEST_JPEG).await, GestureLabel::Fist);
    }

    #[tokio::test]
    async fn test_classify_sends_prompt_and_image_parts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "contents": [{
                    "parts": [
                        {},
                        {"inlineData": {"mimeType": "image/jpeg"}}
                    ]
                }]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(text_response("NONE")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        assert_eq!(client.classify(TEST_JPEG).await, GestureLabel::None);
    }

    #[tokio::test]
    async fn test_unrecognized_text_classifies_as_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_response("I can see a hand waving")),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        assert_eq!(client.classify(TEST_JPEG).await, GestureLabel::None);
    }

    #[tokio::test]
    async fn test_empty_candidates_classifies_as_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        assert_eq!(client.classify(TEST_JPEG).await, GestureLabel::None);
    }

    #[tokio::test]
    async fn test_http_500_classifies_as_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        assert_eq!(client.classify(TEST_JPEG).await, GestureLabel::None);
    }

    #[tokio::test]
    async fn test_http_429_classifies_as_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        assert_eq!(client.classify(TEST_JPEG).await, GestureLabel::None);
    }

    #[tokio::test]
    async fn test_malformed_json_classifies_as_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server).await;
        assert_eq!(client.classify(TEST_JPEG).await, GestureLabel::None);
    }
}
