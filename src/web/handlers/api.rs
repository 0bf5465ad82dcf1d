use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::backend::BackendError;
use crate::session::HistoryEntry;
use crate::web::state::AppState;

/// Cookie carrying the opaque session id. The session only scopes the
/// query history, so the cookie gets no expiry and dies with the browser.
pub const SESSION_COOKIE: &str = "t2s_session";

// Query types

#[derive(Debug, Deserialize)]
pub struct GenerateApiRequest {
    pub text: String,
    pub backend_url: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateApiResponse {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub error: String,
}

// System status

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub session_count: usize,
    pub generation_count: usize,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, kind: &'static str, error: String) -> ApiError {
    (status, Json(ErrorBody { kind, error }))
}

fn map_backend_error(err: BackendError) -> ApiError {
    let (status, kind) = match &err {
        BackendError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "invalid_url"),
        BackendError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
        BackendError::ConnectionError(_) => (StatusCode::BAD_GATEWAY, "connection"),
        BackendError::ResponseError { .. } => (StatusCode::BAD_GATEWAY, "backend"),
        BackendError::InvalidResponse(_) => (StatusCode::BAD_GATEWAY, "invalid_response"),
    };
    api_error(status, kind, err.to_string())
}

fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .map(str::to_string)
}

// API Implementations

// SQL generation
pub async fn generate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<GenerateApiRequest>,
) -> Result<Response, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "empty_input",
            "Please enter some text to generate a SQL query.".to_string(),
        ));
    }

    debug!("Generate request: {}", payload.text);

    let query = state
        .generator
        .generate(&payload.text, &payload.backend_url)
        .await
        .map_err(|e| {
            error!("Generation failed: {}", e);
            map_backend_error(e)
        })?;

    // History is only touched on success, so a failed submission leaves the
    // session exactly as it was.
    let (session_id, minted) = match session_from_headers(&headers) {
        Some(id) => (id, false),
        None => (state.sessions.new_session_id().await, true),
    };
    state
        .sessions
        .append(&session_id, payload.text, query.clone())
        .await;

    info!("Generated SQL for session {}", session_id);

    let mut response = Json(GenerateApiResponse { query }).into_response();
    if minted {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, session_id
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    Ok(response)
}

// Session history, oldest first
pub async fn history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Vec<HistoryEntry>> {
    match session_from_headers(&headers) {
        Some(session_id) => Json(state.sessions.entries(&session_id).await),
        None => Json(Vec::new()),
    }
}

// System status
pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let now = chrono::Utc::now();
    let uptime = now.signed_duration_since(state.startup_time).num_seconds();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        session_count: state.sessions.session_count().await,
        generation_count: state.sessions.entry_count().await,
    })
}
