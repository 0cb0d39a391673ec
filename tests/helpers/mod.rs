//! Test helper utilities: a scriptable fake of the Murf and Gemini APIs and
//! a helper to run the real router against it.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use learn_audibly::app_state::AppState;
use learn_audibly::config::AppConfig;
use learn_audibly::routes;

pub const MURF_KEY: &str = "test-murf-key";
pub const DUB_KEY: &str = "test-dub-key";
pub const GEMINI_KEY: &str = "test-gemini-key";

/// One request received by the fake upstream.
#[derive(Debug, Clone)]
pub struct Call {
    pub api_key: Option<String>,
    pub path_param: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct UpstreamState {
    replies: Mutex<HashMap<&'static str, VecDeque<(StatusCode, Value)>>>,
    calls: Mutex<HashMap<&'static str, Vec<Call>>>,
}

impl UpstreamState {
    /// Next scripted reply; the last one repeats once the script runs out.
    fn next_reply(&self, route: &'static str) -> (StatusCode, Json<Value>) {
        let mut replies = self.replies.lock().unwrap();
        let queue = replies.entry(route).or_default();
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        let (status, body) = reply.unwrap_or((
            StatusCode::NOT_FOUND,
            json!({ "error_message": "no reply scripted" }),
        ));
        (status, Json(body))
    }

    fn record(&self, route: &'static str, call: Call) {
        self.calls.lock().unwrap().entry(route).or_default().push(call);
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Fake Murf + Gemini server on an ephemeral local port.
pub struct Upstream {
    state: Arc<UpstreamState>,
    pub base_url: String,
}

impl Upstream {
    pub async fn start() -> Self {
        let state = Arc::new(UpstreamState::default());

        let router = Router::new()
            .route("/v1/speech/generate", post(speech))
            .route("/v1/text/translate", post(translate))
            .route("/v1beta/models/{action}", post(gemini))
            .route("/v1/murfdub/jobs/create", post(dub_create))
            .route("/v1/murfdub/jobs/{job_id}/status", get(dub_status))
            .with_state(state.clone());

        let base_url = serve(router).await;
        Self { state, base_url }
    }

    /// Queue a reply for `route` (`speech`, `translate`, `gemini`, `dub_create`, `dub_status`).
    pub fn reply(&self, route: &'static str, status: u16, body: Value) {
        self.state
            .replies
            .lock()
            .unwrap()
            .entry(route)
            .or_default()
            .push_back((StatusCode::from_u16(status).unwrap(), body));
    }

    pub fn calls(&self, route: &'static str) -> Vec<Call> {
        self.state
            .calls
            .lock()
            .unwrap()
            .get(route)
            .cloned()
            .unwrap_or_default()
    }
}

async fn speech(
    State(state): State<Arc<UpstreamState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record(
        "speech",
        Call {
            api_key: header(&headers, "api-key"),
            path_param: None,
            body,
        },
    );
    state.next_reply("speech")
}

async fn translate(
    State(state): State<Arc<UpstreamState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record(
        "translate",
        Call {
            api_key: header(&headers, "api-key"),
            path_param: None,
            body,
        },
    );
    state.next_reply("translate")
}

async fn gemini(
    State(state): State<Arc<UpstreamState>>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record(
        "gemini",
        Call {
            api_key: header(&headers, "x-goog-api-key"),
            path_param: Some(action),
            body,
        },
    );
    state.next_reply("gemini")
}

async fn dub_create(
    State(state): State<Arc<UpstreamState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut fields = serde_json::Map::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.unwrap();
            fields.insert(
                name,
                json!({ "file_name": file_name, "size": bytes.len() }),
            );
        } else {
            let text = field.text().await.unwrap();
            fields.insert(name, Value::String(text));
        }
    }

    state.record(
        "dub_create",
        Call {
            api_key: header(&headers, "api-key"),
            path_param: None,
            body: Value::Object(fields),
        },
    );
    state.next_reply("dub_create")
}

async fn dub_status(
    State(state): State<Arc<UpstreamState>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.record(
        "dub_status",
        Call {
            api_key: header(&headers, "api-key"),
            path_param: Some(job_id),
            body: Value::Null,
        },
    );
    state.next_reply("dub_status")
}

/// Serve `router` on 127.0.0.1 with an ephemeral port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Configuration pointing every upstream at `upstream_url`, with instant polling.
pub fn test_config(upstream_url: &str) -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        murf_api_key: MURF_KEY.to_string(),
        murf_dub_api_key: DUB_KEY.to_string(),
        gemini_api_key: GEMINI_KEY.to_string(),
        murf_base_url: upstream_url.to_string(),
        gemini_base_url: upstream_url.to_string(),
        gemini_model: "gemini-1.5-flash-latest".to_string(),
        request_timeout_secs: 5,
        dub_poll_interval_secs: 0,
        dub_max_poll_attempts: 3,
        max_upload_bytes: 10 * 1024 * 1024,
    }
}

/// Start the fake upstream and the application wired to it.
pub async fn start() -> (Upstream, String) {
    start_with(|_| {}).await
}

/// Like [`start`], with a hook to adjust the configuration first.
pub async fn start_with(configure: impl FnOnce(&mut AppConfig)) -> (Upstream, String) {
    let upstream = Upstream::start().await;
    let mut config = test_config(&upstream.base_url);
    configure(&mut config);
    let state = AppState::from_config(config).unwrap();
    let app_url = serve(routes::router(state)).await;
    (upstream, app_url)
}

/// The one-page PDF fixture whose only text is "Hello from LearnAudibly".
pub fn hello_pdf() -> Vec<u8> {
    include_bytes!("../fixtures/hello.pdf").to_vec()
}
