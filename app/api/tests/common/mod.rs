#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body;
use axum::body::Body;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use groq::chat::Chat;
use pr_context_api::ApiState;
use pr_context_api::analyze::analyzer::Analyzer;
use pr_context_api::analyze::analyzer::RetryPolicy;
use pr_context_api::config::Settings;
use serde_json::Value;
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const CONTEXT_JSON: &str = r#"{
  "summary": "3 files modified with 120 total line changes, focusing on session init",
  "purpose": "Fixes #42 where sessions start without an id",
  "testing_focus": ["Open chat in an untitled file"],
  "potential_risks": ["sessionId is nullable during init"],
  "affected_areas": ["src/session.rs - session lifecycle"],
  "review_priority": "MEDIUM - 120 lines across 3 files",
  "estimated_review_time": "10-20min",
  "key_changes": ["src/session.rs: async init"]
}"#;

#[derive(Clone)]
pub struct MockGroq {
    pub url: String,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Value>>>,
}

struct MockReply {
    status: StatusCode,
    content: String,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockGroq {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> String {
        let requests = self.requests.lock().unwrap();
        let request = requests.last().expect("no request received");
        request["messages"][1]["content"].as_str().unwrap().to_string()
    }
}

async fn completion(State(reply): State<Arc<MockReply>>, Json(request): Json<Value>) -> Response {
    reply.calls.fetch_add(1, Ordering::SeqCst);
    reply.requests.lock().unwrap().push(request);
    if reply.status != StatusCode::OK {
        return (reply.status, reply.content.clone()).into_response();
    }
    Json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": reply.content}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 100, "completion_tokens": 50, "total_tokens": 150}
    }))
    .into_response()
}

/// Serve a fake chat completion endpoint that always answers with `content`.
pub async fn mock_groq(status: StatusCode, content: &str) -> MockGroq {
    let calls = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(vec![]));
    let reply = Arc::new(MockReply {
        status,
        content: content.to_string(),
        calls: Arc::clone(&calls),
        requests: Arc::clone(&requests),
    });
    let router = Router::new()
        .route("/openai/v1/chat/completions", post(completion))
        .with_state(reply);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    MockGroq {
        url: format!("http://{address}/openai/v1/chat/completions"),
        calls,
        requests,
    }
}

pub fn settings(vars: &[(&str, &str)]) -> Settings {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Settings::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

pub fn app(settings: Settings) -> Router {
    let mut state = ApiState::new(settings);
    if state.settings.groq_configured() {
        let chat = Chat::new(
            state.settings.groq_api_url.clone(),
            state.settings.groq_api_key.clone(),
            state.settings.groq_model.clone(),
        );
        let retry = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        };
        state.analyzer = Some(Arc::new(Analyzer::new(chat).with_retry(retry)));
    }
    framework::web::server::with_defaults(pr_context_api::app(state))
}

pub fn app_with_groq(groq: &MockGroq, extra: &[(&str, &str)]) -> Router {
    let mut vars = vec![("GROQ_API_KEY", "gsk_test"), ("GROQ_API_URL", groq.url.as_str())];
    vars.extend_from_slice(extra);
    app(settings(&vars))
}

pub fn pr_payload(file_count: usize, commit_count: usize) -> Value {
    let files: Vec<Value> = (0..file_count)
        .map(|i| json!({"filename": format!("src/module{i}.rs"), "status": "modified", "additions": 30, "deletions": 10}))
        .collect();
    let commits: Vec<Value> = (0..commit_count)
        .map(|i| json!({"sha": format!("{i:040}"), "message": format!("commit {i}"), "author": "dev"}))
        .collect();
    json!({
        "title": "Fix session init",
        "description": "Fixes #42",
        "files": files,
        "commits": commits,
        "base_branch": "main",
        "head_branch": "fix/session"
    })
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, headers, body)
}
