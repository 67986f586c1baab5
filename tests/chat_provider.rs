//! Drives the chat-completions adapter against a local stand-in for the upstream API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use galek_prompt::config::PromptSource;
use galek_prompt::providers::{ChatVision, Resilient, RetryPolicy};
use galek_prompt::{AnalyzeError, ImageUpload, VisionProvider};
use serde_json::{json, Value};

#[derive(Clone)]
struct Upstream {
    calls: Arc<AtomicUsize>,
    failures: usize,
    failure_status: StatusCode,
    reply: String,
    seen: Arc<std::sync::Mutex<Vec<Value>>>,
}

async fn chat_completions(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let call = upstream.calls.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    upstream
        .seen
        .lock()
        .unwrap()
        .push(json!({ "auth": auth, "body": body }));

    if call < upstream.failures {
        return (
            upstream.failure_status,
            Json(json!({ "error": { "message": "try later" } })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": upstream.reply },
                "finish_reason": "stop"
            }]
        })),
    )
}

async fn spawn_upstream(upstream: Upstream) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(upstream);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}/v1")
}

fn upstream(failures: usize, failure_status: StatusCode, reply: &str) -> Upstream {
    Upstream {
        calls: Arc::new(AtomicUsize::new(0)),
        failures,
        failure_status,
        reply: reply.to_string(),
        seen: Arc::new(std::sync::Mutex::new(Vec::new())),
    }
}

fn upload() -> ImageUpload {
    ImageUpload::from_data_uri(Some("data:image/jpeg;base64,aGVsbG8=")).unwrap()
}

const REPLY: &str = "```json\n{\"type\": \"Photo\", \"style\": \"Street photography\", \
\"lighting\": \"Neon night lighting\", \"composition\": \"Low angle medium shot\", \
\"colors\": \"Magenta and cyan\", \"mood\": \"Energetic\", \"realism\": \"Photorealistic\", \
\"environmentDescription\": \"Rainy city street\", \
\"prompt\": \"A neon-lit street portrait of [USER FACE]\"}\n```";

#[tokio::test]
async fn test_openai_adapter_parses_reply() {
    let upstream = upstream(0, StatusCode::OK, REPLY);
    let base_url = spawn_upstream(upstream.clone()).await;

    let provider = ChatVision::openai(
        reqwest::Client::new(),
        &base_url,
        "sk-test",
        "gpt-4o-mini",
        PromptSource::Template,
    );
    let report = provider.analyze(&upload()).await.unwrap();

    assert_eq!(report.analysis.style, "Street photography");
    assert_eq!(report.analysis.lighting, "Neon night lighting");
    assert_eq!(
        report.analysis.environment_description.as_deref(),
        Some("Rainy city street")
    );
    // Template mode ignores any prompt the model volunteers.
    assert_eq!(report.draft_prompt, None);

    let seen = upstream.seen.lock().unwrap();
    assert_eq!(seen[0]["auth"], "Bearer sk-test");
    assert_eq!(seen[0]["body"]["model"], "gpt-4o-mini");
    assert_eq!(
        seen[0]["body"]["messages"][1]["content"][1]["image_url"]["url"],
        "data:image/jpeg;base64,aGVsbG8="
    );
}

#[tokio::test]
async fn test_model_prompt_source_keeps_draft() {
    let base_url = spawn_upstream(upstream(0, StatusCode::OK, REPLY)).await;

    let provider = ChatVision::openai(
        reqwest::Client::new(),
        &base_url,
        "sk-test",
        "gpt-4o-mini",
        PromptSource::Model,
    );
    let report = provider.analyze(&upload()).await.unwrap();

    assert_eq!(
        report.draft_prompt.as_deref(),
        Some("A neon-lit street portrait of [USER FACE]")
    );
}

#[tokio::test]
async fn test_retries_server_errors_then_succeeds() {
    let upstream = upstream(2, StatusCode::SERVICE_UNAVAILABLE, REPLY);
    let base_url = spawn_upstream(upstream.clone()).await;

    let inner = ChatVision::openai(
        reqwest::Client::new(),
        &base_url,
        "sk-test",
        "gpt-4o-mini",
        PromptSource::Template,
    );
    let provider = Resilient::new(
        Arc::new(inner),
        RetryPolicy {
            attempts: 3,
            base_delay: Duration::from_millis(5),
        },
        Duration::from_secs(5),
    );

    let report = provider.analyze(&upload()).await.unwrap();
    assert_eq!(report.analysis.kind, "Photo");
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_auth_failure_is_not_retried() {
    let upstream = upstream(10, StatusCode::UNAUTHORIZED, REPLY);
    let base_url = spawn_upstream(upstream.clone()).await;

    let inner = ChatVision::openai(
        reqwest::Client::new(),
        &base_url,
        "bad-key",
        "gpt-4o-mini",
        PromptSource::Template,
    );
    let provider = Resilient::new(
        Arc::new(inner),
        RetryPolicy {
            attempts: 3,
            base_delay: Duration::from_millis(5),
        },
        Duration::from_secs(5),
    );

    let err = provider.analyze(&upload()).await.unwrap_err();
    assert!(matches!(err, AnalyzeError::Status { status: 401, .. }));
    assert_eq!(
        err.user_message(provider.name()),
        "OpenAI API key is invalid. Please check your credentials."
    );
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_prose_reply_is_a_parse_error() {
    let base_url = spawn_upstream(upstream(0, StatusCode::OK, "Sorry, I can't help with that.")).await;

    let provider = ChatVision::openai(
        reqwest::Client::new(),
        &base_url,
        "sk-test",
        "gpt-4o-mini",
        PromptSource::Template,
    );
    let err = provider.analyze(&upload()).await.unwrap_err();

    assert!(matches!(err, AnalyzeError::InvalidJson(_)));
}

#[tokio::test]
async fn test_empty_reply_is_reported() {
    let base_url = spawn_upstream(upstream(0, StatusCode::OK, "   ")).await;

    let provider = ChatVision::openai(
        reqwest::Client::new(),
        &base_url,
        "sk-test",
        "gpt-4o-mini",
        PromptSource::Template,
    );
    let err = provider.analyze(&upload()).await.unwrap_err();

    assert!(matches!(err, AnalyzeError::EmptyResponse));
}
