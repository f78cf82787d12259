//! Completion requests against a mock OpenAI-compatible server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clihelper::config::Credential;
use clihelper::{App, CliError, Prompt, RawInput, Settings};

fn app_for(server_uri: &str) -> App {
    let settings = Settings {
        api_base: server_uri.to_string(),
        ..Settings::default()
    };
    App::new(settings).unwrap().without_history()
}

fn prompt(app: &App, piped: &str, hint: &[&str]) -> Prompt {
    let hint: Vec<String> = hint.iter().map(|w| w.to_string()).collect();
    app.prepare(&app.snapshot(RawInput::new(piped, &hint))).unwrap()
}

fn key() -> Credential {
    Credential::new("test-key").unwrap()
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content, "refusal": null },
            "finish_reason": "stop",
            "logprobs": null
        }],
        "usage": { "prompt_tokens": 40, "completion_tokens": 12, "total_tokens": 52 }
    })
}

#[tokio::test]
async fn test_successful_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "  The -R flag means recursive.\n$ ls -R  ",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server.uri());
    let prompt = prompt(&app, "ls: invalid option -- 'recursively'", &[]);
    let response = app.ask(&prompt, &key()).await.unwrap();

    assert_eq!(response.text, "The -R flag means recursive.\n$ ls -R");
    assert_eq!(response.model, "gpt-4o-mini");
}

#[tokio::test]
async fn test_outbound_body_is_redacted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Check the key.")))
        .mount(&server)
        .await;

    let app = app_for(&server.uri());
    let prompt = prompt(&app, "api_key=sk-ABC123", &["debug", "connection"]);
    app.ask(&prompt, &key()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("sk-ABC123"));
    assert!(body.contains("[REDACTED]"));
    assert!(body.contains("debug connection"));

    let parsed: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(parsed["model"], "gpt-4o-mini");
    assert_eq!(parsed["max_completion_tokens"], 300);
    assert_eq!(parsed["messages"][0]["role"], "system");
    assert_eq!(parsed["messages"][1]["role"], "user");
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server.uri());
    let prompt = prompt(&app, "", &["how", "to", "tar"]);
    let err = app.ask(&prompt, &key()).await.unwrap_err();

    match err {
        CliError::RemoteError(message) => assert!(message.contains("upstream exploded")),
        other => panic!("expected RemoteError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_api_error_message_is_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server.uri());
    let prompt = prompt(&app, "", &["hello"]);
    let err = app.ask(&prompt, &key()).await.unwrap_err();

    assert_eq!(err.exit_code(), 5);
    assert!(matches!(err, CliError::RemoteError(ref m) if m == "Incorrect API key provided"));
}

#[tokio::test]
async fn test_empty_reply_is_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .mount(&server)
        .await;

    let app = app_for(&server.uri());
    let prompt = prompt(&app, "", &["hello"]);
    let err = app.ask(&prompt, &key()).await.unwrap_err();

    assert!(matches!(err, CliError::RemoteError(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_network_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let app = app_for(&uri);
    let prompt = prompt(&app, "", &["hello"]);
    let err = app.ask(&prompt, &key()).await.unwrap_err();

    assert!(matches!(err, CliError::NetworkFailure(_)));
    assert_eq!(err.exit_code(), 4);
}
