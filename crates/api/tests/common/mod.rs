use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use dramagen_api::config::ServerConfig;
use dramagen_api::routes;
use dramagen_api::state::AppState;
use dramagen_core::error::CoreError;
use dramagen_core::image_generation::PollPolicy;
use dramagen_core::providers::{GenerateOptions, TextGenerator};
use dramagen_db::adapters::{PgImageQueue, PgPoseStore, PgScriptSource, PgTaskLedger};
use dramagen_pipeline::{Collaborators, PipelineConfig, PoseOrchestrator, TaskRunner};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_max_connections: 5,
    }
}

/// Pipeline settings with a fast poll so image tasks settle within a test.
pub fn test_pipeline_config() -> PipelineConfig {
    PipelineConfig {
        max_concurrent_tasks: 4,
        poll: PollPolicy {
            interval: Duration::from_millis(20),
            max_attempts: 250,
            backoff_factor: 1.0,
            max_interval: Duration::from_millis(20),
        },
        ..PipelineConfig::default()
    }
}

/// Text model double that answers every call with the same reply.
pub struct CannedText {
    reply: Result<String, String>,
    calls: Mutex<Vec<String>>,
}

impl CannedText {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for CannedText {
    async fn generate(
        &self,
        prompt: &str,
        _system_prompt: Option<&str>,
        _options: &GenerateOptions,
    ) -> Result<String, CoreError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(CoreError::Upstream)
    }
}

/// Build the full application router with all middleware layers.
///
/// Mirrors `main.rs`; the text model answers with an empty pose list.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, CannedText::replying("[]"))
}

/// Same as [`build_test_app`] with a chosen text model.
pub fn build_test_app_with(pool: PgPool, text: Arc<dyn TextGenerator>) -> Router {
    let pipeline_config = test_pipeline_config();
    let image_queue = Arc::new(PgImageQueue::new(pool.clone()));
    let deps = Collaborators {
        ledger: Arc::new(PgTaskLedger::new(pool.clone())),
        poses: Arc::new(PgPoseStore::new(pool.clone())),
        scripts: Arc::new(PgScriptSource::new(pool.clone())),
        text,
        image_submitter: image_queue.clone(),
        image_statuses: image_queue,
    };
    let runner = TaskRunner::new(pipeline_config.max_concurrent_tasks);
    let orchestrator = PoseOrchestrator::new(deps, &pipeline_config, runner);

    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        orchestrator: Arc::new(orchestrator),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn send_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::PUT, uri, body).await
}

/// Poll `/api/v1/tasks/{id}` until the task is completed or failed.
pub async fn wait_for_task(app: &Router, task_id: &str) -> serde_json::Value {
    for _ in 0..500 {
        let response = get(app.clone(), &format!("/api/v1/tasks/{task_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let task = body_json(response).await["data"].clone();
        if task["status"] == "completed" || task["status"] == "failed" {
            return task;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("task {task_id} did not finish");
}
