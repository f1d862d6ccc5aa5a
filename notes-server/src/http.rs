//! Notes HTTP REST API
//!
//! Axum-based HTTP server exposing CRUD over the note collection.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a pure
//! inner function. The inner functions take the shared state directly and are
//! testable without axum dispatch machinery.
//!
//! Endpoints:
//! - GET    /health     — liveness check, independent of the notes service
//! - GET    /notes      — list all notes in insertion order
//! - POST   /notes      — create a note
//! - GET    /notes/:id  — fetch one note
//! - PUT    /notes/:id  — replace title (and content, if given)
//! - DELETE /notes/:id  — delete a note

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use notes_core::{NotePayload, NotesConfig, NotesError, NotesService};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state for all HTTP handlers.
///
/// The mutex serializes every mutation together with its file rewrite.
pub struct HttpState {
    pub notes: Mutex<NotesService>,
    pub config: NotesConfig,
}

impl HttpState {
    pub fn new(service: NotesService, config: NotesConfig) -> Self {
        Self {
            notes: Mutex::new(service),
            config,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, NotesService>, ApiError> {
        self.notes.lock().map_err(|_| {
            ApiError::Internal("notes state lock poisoned".to_string())
        })
    }
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    let cors_origins = state.config.http.cors_allowed_origins.clone();

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/notes", get(list_handler).post(create_handler))
        .route(
            "/notes/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_origins.is_empty() {
        router
    } else {
        router.layer(build_cors_layer(&cors_origins))
    }
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let mut parsed = Vec::new();
    for origin in origins {
        match HeaderValue::from_str(origin) {
            Ok(value) => parsed.push(value),
            Err(err) => tracing::warn!("ignoring invalid CORS origin '{origin}': {err}"),
        }
    }

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_origin(parsed)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = state.config.http.bind_addr();
    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Notes HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

/// Standard HTTP error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Boundary error: the only place notes errors become status codes.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m) | Self::NotFound(m) => m.as_str(),
            Self::Internal(_) => "Internal server error",
        }
    }
}

impl From<NotesError> for ApiError {
    fn from(err: NotesError) -> Self {
        match err {
            NotesError::Validation(_) => Self::BadRequest(err.to_string()),
            NotesError::NotFound(_) => Self::NotFound(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!("Unhandled request failure: {}", detail);
        }
        let body = ErrorResponse {
            message: self.message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// ============================================================================
// Inner (directly testable) functions
// ============================================================================

/// Inner health — pure, never touches the notes service.
pub fn health_inner(environment: &str) -> serde_json::Value {
    serde_json::json!({
        "status": "ok",
        "message": "Notes API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": environment,
    })
}

/// Parse a path id; anything but an unsigned integer is a 400.
pub fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>()
        .map_err(|_| ApiError::BadRequest("Invalid note id".to_string()))
}

/// Decode a request body. An empty body, or one not declared as JSON, reads as
/// `null` (a payload without a title); only malformed JSON is rejected.
pub fn parse_body(headers: &HeaderMap, body: &[u8]) -> Result<serde_json::Value, ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let mime = ct.split(';').next().unwrap_or("").trim();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false);

    if !is_json || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Null);
    }

    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}

pub fn list_inner(state: &HttpState) -> Result<serde_json::Value, ApiError> {
    let notes = state.lock()?;
    to_json(notes.list())
}

pub fn get_inner(state: &HttpState, raw_id: &str) -> Result<serde_json::Value, ApiError> {
    let id = parse_id(raw_id)?;
    let note = state.lock()?.get_by_id(id)?;
    to_json(&note)
}

pub fn create_inner(
    state: &HttpState,
    body: &serde_json::Value,
) -> Result<(StatusCode, serde_json::Value), ApiError> {
    let payload = NotePayload::from_value(body);
    let note = state.lock()?.create(&payload)?;
    Ok((StatusCode::CREATED, to_json(&note)?))
}

pub fn update_inner(
    state: &HttpState,
    raw_id: &str,
    body: &serde_json::Value,
) -> Result<serde_json::Value, ApiError> {
    let id = parse_id(raw_id)?;
    let payload = NotePayload::from_value(body);
    let note = state.lock()?.update(id, &payload)?;
    to_json(&note)
}

pub fn delete_inner(state: &HttpState, raw_id: &str) -> Result<StatusCode, ApiError> {
    let id = parse_id(raw_id)?;
    state.lock()?.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(health_inner(&state.config.service.environment)),
    )
}

pub async fn list_handler(
    State(state): State<Arc<HttpState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    list_inner(&state).map(Json)
}

pub async fn get_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    get_inner(&state, &id).map(Json)
}

pub async fn create_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let body = parse_body(&headers, &body)?;
    let (status, note) = create_inner(&state, &body)?;
    Ok((status, Json(note)))
}

pub async fn update_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Bad ids are reported before body problems.
    parse_id(&id)?;
    let body = parse_body(&headers, &body)?;
    update_inner(&state, &id, &body).map(Json)
}

pub async fn delete_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_inner(&state, &id)
}

pub async fn fallback_handler() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

// ============================================================================
// Unit Tests — call inner functions directly
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use notes_core::JsonFileStore;
    use serde_json::json;

    fn make_state() -> (tempfile::TempDir, HttpState) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("notes.json"));
        let state = HttpState::new(NotesService::open(store), NotesConfig::default());
        (dir, state)
    }

    // ========================================================================
    // TEST 1: health_inner is pure and returns the expected fields
    // ========================================================================
    #[test]
    fn test_health_inner_fields() {
        let body = health_inner("staging");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Notes API is running");
        assert_eq!(body["environment"], "staging");
        assert!(body["timestamp"].is_string());
    }

    // ========================================================================
    // TEST 2: parse_id accepts integers only
    // ========================================================================
    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("17").unwrap(), 17);
        for bad in ["abc", "1.5", "-3", "", "12abc"] {
            let err = parse_id(bad).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "id {:?}", bad);
        }
    }

    // ========================================================================
    // TEST 3: NotesError maps onto the right status codes
    // ========================================================================
    #[test]
    fn test_error_mapping() {
        let v: ApiError = NotesError::validation("Title is required").into();
        assert_eq!(v.status(), StatusCode::BAD_REQUEST);
        assert_eq!(v.message(), "Title is required");

        let nf: ApiError = NotesError::NotFound(9).into();
        assert_eq!(nf.status(), StatusCode::NOT_FOUND);
        assert_eq!(nf.message(), "Note with id 9 not found");

        let io: ApiError = NotesError::Io(std::io::Error::other("disk")).into();
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io.message(), "Internal server error");
    }

    // ========================================================================
    // TEST 4: create_inner returns 201 with the stored note
    // ========================================================================
    #[test]
    fn test_create_inner() {
        let (_dir, state) = make_state();
        let (status, body) =
            create_inner(&state, &json!({"title": "Hello", "content": "World"})).unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 1);
        assert_eq!(body["title"], "Hello");
        assert_eq!(body["content"], "World");
    }

    // ========================================================================
    // TEST 5: create_inner without a title is a 400
    // ========================================================================
    #[test]
    fn test_create_inner_missing_title() {
        let (_dir, state) = make_state();
        let err = create_inner(&state, &json!({"content": "orphan"})).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(list_inner(&state).unwrap(), json!([]));
    }

    // ========================================================================
    // TEST 6: get/update/delete with a bad id never reach the service
    // ========================================================================
    #[test]
    fn test_bad_id_rejected() {
        let (_dir, state) = make_state();
        assert_eq!(get_inner(&state, "x").unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            update_inner(&state, "x", &json!({"title": "t"})).unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(delete_inner(&state, "x").unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    // ========================================================================
    // TEST 7: full inner lifecycle
    // ========================================================================
    #[test]
    fn test_inner_lifecycle() {
        let (_dir, state) = make_state();
        create_inner(&state, &json!({"title": "A"})).unwrap();
        create_inner(&state, &json!({"title": "B"})).unwrap();

        let updated = update_inner(&state, "1", &json!({"title": "A2"})).unwrap();
        assert_eq!(updated["title"], "A2");

        assert_eq!(delete_inner(&state, "2").unwrap(), StatusCode::NO_CONTENT);
        assert_eq!(
            get_inner(&state, "2").unwrap_err().status(),
            StatusCode::NOT_FOUND
        );

        let list = list_inner(&state).unwrap();
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["id"], 1);
    }

    // ========================================================================
    // TEST 8: parse_body treats empty or non-JSON bodies as null
    // ========================================================================
    #[test]
    fn test_parse_body() {
        let mut json_headers = HeaderMap::new();
        json_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );

        assert_eq!(parse_body(&HeaderMap::new(), b"").unwrap(), serde_json::Value::Null);
        assert_eq!(
            parse_body(&HeaderMap::new(), b"{\"title\": \"x\"}").unwrap(),
            serde_json::Value::Null
        );
        assert_eq!(parse_body(&json_headers, b"  \n").unwrap(), serde_json::Value::Null);
        assert_eq!(
            parse_body(&json_headers, b"{\"title\": \"x\"}").unwrap(),
            json!({"title": "x"})
        );

        let err = parse_body(&json_headers, b"{\"title\": ").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
