use serde_json::json;
use steamsage::llm_interaction::GeminiClient;
use steamsage::summary::{fetch_ai_chat_response, fetch_ai_suggestions, fetch_ai_summary, parse_summary};
use steamsage::{ChatMessage, Config, Role, SageError, SummaryResponse};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup(server: &MockServer) -> (GeminiClient, Config) {
    let config = Config::new("test-key")
        .with_gemini_url(server.uri())
        .with_models("summary-model", "chat-model");
    (GeminiClient::new(&config), config)
}

fn gemini_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}, "finishReason": "STOP"}]
    }))
}

fn summaries() -> Vec<SummaryResponse> {
    vec![SummaryResponse {
        title: "Hades".to_string(),
        summary: "A tight roguelike".to_string(),
        positive: vec!["combat".to_string()],
        negative: vec!["repetitive".to_string()],
        error: None,
    }]
}

#[test_log::test(tokio::test)]
async fn test_summary_request_and_slice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/summary-model:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_string_contains("Hades"))
        .respond_with(gemini_reply(
            "Sure! ```json{\"title\":\"Hades\",\"summary\":\"Loved\",\"positive\":[\"art\"],\"negative\":[]}```",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let (ai, config) = setup(&server);
    let raw = fetch_ai_summary(&ai, &config, "review one\nreview two", "Hades")
        .await
        .unwrap();

    assert_eq!(
        raw,
        r#"{"title":"Hades","summary":"Loved","positive":["art"],"negative":[]}"#
    );
    let summary = parse_summary(&raw, "Hades").unwrap();
    assert_eq!(summary.positive, vec!["art"]);
}

#[tokio::test]
async fn test_summary_without_braces_is_left_to_the_caller() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_reply("I cannot help with that."))
        .mount(&server)
        .await;

    let (ai, config) = setup(&server);
    let raw = fetch_ai_summary(&ai, &config, "text", "X").await.unwrap();
    assert_eq!(raw, "");
    assert!(matches!(parse_summary(&raw, "X"), Err(SageError::Format(_))));
}

#[tokio::test]
async fn test_empty_model_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let (ai, config) = setup(&server);
    let err = fetch_ai_summary(&ai, &config, "text", "X").await.unwrap_err();
    assert_eq!(err, SageError::EmptyOutput);

    let err = fetch_ai_chat_response(&ai, &config, &[], &summaries())
        .await
        .unwrap_err();
    assert_eq!(err, SageError::EmptyOutput);
}

#[tokio::test]
async fn test_whitespace_only_chat_reply_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/chat-model:generateContent"))
        .respond_with(gemini_reply(" \n\t "))
        .mount(&server)
        .await;

    let (ai, config) = setup(&server);
    let history = vec![ChatMessage::new(Role::User, "Anything?")];
    let reply = fetch_ai_chat_response(&ai, &config, &history, &summaries())
        .await
        .unwrap();
    assert_eq!(reply, "");
}

#[tokio::test]
async fn test_model_http_failure_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let (ai, config) = setup(&server);
    let err = fetch_ai_summary(&ai, &config, "text", "X").await.unwrap_err();
    assert!(matches!(err, SageError::Transport(_)));
}

#[tokio::test]
async fn test_chat_uses_chat_model_and_replays_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/chat-model:generateContent"))
        .and(body_string_contains("user: Is it hard?"))
        .and(body_string_contains("assistant: Somewhat."))
        .and(body_string_contains("user: Worth it?"))
        .respond_with(gemini_reply("\n  Yes, absolutely.  \n"))
        .expect(1)
        .mount(&server)
        .await;

    let (ai, config) = setup(&server);
    let history = vec![
        ChatMessage::new(Role::User, "Is it hard?"),
        ChatMessage::new(Role::Assistant, "Somewhat."),
        ChatMessage::new(Role::User, "Worth it?"),
    ];
    let reply = fetch_ai_chat_response(&ai, &config, &history, &summaries())
        .await
        .unwrap();
    assert_eq!(reply, "Yes, absolutely.");
}

#[tokio::test]
async fn test_suggestions_accept_three() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/summary-model:generateContent"))
        .respond_with(gemini_reply(
            "```json\n[\"Is combat fun?\", \"How long is it?\", \"Any co-op?\"]\n```",
        ))
        .mount(&server)
        .await;

    let (ai, config) = setup(&server);
    let suggestions = fetch_ai_suggestions(&ai, &config, &summaries()).await.unwrap();
    assert_eq!(suggestions, vec!["Is combat fun?", "How long is it?", "Any co-op?"]);
}

#[tokio::test]
async fn test_suggestions_reject_two() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_reply("[\"Only one?\", \"And two?\"]"))
        .mount(&server)
        .await;

    let (ai, config) = setup(&server);
    let err = fetch_ai_suggestions(&ai, &config, &summaries()).await.unwrap_err();
    assert!(matches!(err, SageError::Format(_)));
}
