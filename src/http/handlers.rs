use super::state::AppState;
use crate::capture::{CaptureError, CapturePreview};
use crate::questions::{QuestionError, QuestionRequest};
use crate::session::{Intent, Navigation, SessionError};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Either an explicit question list or a candidate profile to generate one from
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreateSessionRequest {
    Questions { questions: Vec<String> },
    Generate(QuestionRequest),
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub target: NavigateTarget,
}

/// `"next"`, `"previous"`, or a zero-based question index
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NavigateTarget {
    Index(usize),
    Named(NamedTarget),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedTarget {
    Next,
    Previous,
}

impl From<NavigateTarget> for Navigation {
    fn from(target: NavigateTarget) -> Self {
        match target {
            NavigateTarget::Index(ordinal) => Navigation::To(ordinal),
            NavigateTarget::Named(NamedTarget::Next) => Navigation::Next,
            NavigateTarget::Named(NamedTarget::Previous) => Navigation::Previous,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DevicePermissionRequest {
    pub granted: bool,
}

#[derive(Debug, Serialize)]
pub struct ChunkAccepted {
    pub bytes: usize,
    pub preview: CapturePreview,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn not_found(session_id: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Session {} not found", session_id),
    )
}

fn session_error_status(e: &SessionError) -> StatusCode {
    match e {
        SessionError::EmptyQuestionList | SessionError::QuestionOutOfRange { .. } => {
            StatusCode::BAD_REQUEST
        }
        SessionError::QuestionBusyOrAnswered { .. }
        | SessionError::NoRecordingPresent { .. }
        | SessionError::NotRecording
        | SessionError::IncompleteSession { .. }
        | SessionError::SessionFinished => StatusCode::CONFLICT,
        SessionError::SessionClosed => StatusCode::GONE,
        SessionError::Capture(CaptureError::PermissionDenied) => StatusCode::FORBIDDEN,
        SessionError::Capture(CaptureError::DeviceUnavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        SessionError::Capture(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn question_error_status(e: &QuestionError) -> StatusCode {
    match e {
        QuestionError::MissingField(_) => StatusCode::BAD_REQUEST,
        QuestionError::Request(_) | QuestionError::Status(_) | QuestionError::EmptyResponse => {
            StatusCode::BAD_GATEWAY
        }
    }
}

async fn apply_intent(state: &AppState, session_id: &str, intent: Intent) -> Response {
    let Some(entry) = state.session(session_id).await else {
        return not_found(session_id);
    };

    match entry.handle.apply(intent).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => {
            warn!("{:?} rejected for session {}: {}", intent, session_id, e);
            error_response(session_error_status(&e), e)
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions
/// Start a new interview session
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let questions = match req {
        CreateSessionRequest::Questions { questions } => questions,
        CreateSessionRequest::Generate(request) => match state.questions.generate(&request).await {
            Ok(questions) => questions,
            Err(e) => {
                error!("Failed to generate questions: {}", e);
                return error_response(question_error_status(&e), e);
            }
        },
    };

    let entry = match state.create_session(questions).await {
        Ok(entry) => entry,
        Err(e) => {
            error!("Failed to create session: {}", e);
            return error_response(session_error_status(&e), e);
        }
    };

    match entry.handle.snapshot().await {
        Ok(snapshot) => {
            info!("Interview session created: {}", snapshot.session_id);
            (StatusCode::CREATED, Json(snapshot)).into_response()
        }
        Err(e) => error_response(session_error_status(&e), e),
    }
}

/// GET /sessions/:session_id
/// Current snapshot of a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let Some(entry) = state.session(&session_id).await else {
        return not_found(&session_id);
    };

    match entry.handle.snapshot().await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => error_response(session_error_status(&e), e),
    }
}

/// DELETE /sessions/:session_id
/// Abandon a session and release its capture device
pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let Some(entry) = state.remove_session(&session_id).await else {
        return not_found(&session_id);
    };

    entry.feed.set_connected(false);
    match entry.handle.close().await {
        Ok(snapshot) => {
            info!("Interview session closed: {}", session_id);
            (StatusCode::OK, Json(snapshot)).into_response()
        }
        Err(e) => error_response(session_error_status(&e), e),
    }
}

/// POST /sessions/:session_id/recording/start
pub async fn start_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    apply_intent(&state, &session_id, Intent::StartRecording).await
}

/// POST /sessions/:session_id/recording/stop
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    apply_intent(&state, &session_id, Intent::StopRecording).await
}

/// POST /sessions/:session_id/recording/retry
pub async fn retry_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    apply_intent(&state, &session_id, Intent::Retry).await
}

/// POST /sessions/:session_id/recording/chunk
/// Append encoded media to the live recording
pub async fn upload_chunk(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Response {
    let Some(entry) = state.session(&session_id).await else {
        return not_found(&session_id);
    };

    let bytes = body.len();
    match entry.feed.push(body.to_vec()).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(ChunkAccepted {
                bytes,
                preview: entry.feed.preview(),
            }),
        )
            .into_response(),
        Err(e) => error_response(StatusCode::CONFLICT, e),
    }
}

/// POST /sessions/:session_id/device
/// Report the outcome of the browser's camera/microphone prompt
pub async fn set_device_permission(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<DevicePermissionRequest>,
) -> Response {
    let Some(entry) = state.session(&session_id).await else {
        return not_found(&session_id);
    };

    entry.feed.set_permission(req.granted);
    (StatusCode::OK, Json(entry.feed.preview())).into_response()
}

/// GET /sessions/:session_id/preview
pub async fn get_preview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.session(&session_id).await {
        Some(entry) => (StatusCode::OK, Json(entry.feed.preview())).into_response(),
        None => not_found(&session_id),
    }
}

/// POST /sessions/:session_id/submit
pub async fn submit(State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    apply_intent(&state, &session_id, Intent::Submit).await
}

/// POST /sessions/:session_id/skip
pub async fn skip(State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    apply_intent(&state, &session_id, Intent::Skip).await
}

/// POST /sessions/:session_id/navigate
pub async fn navigate(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<NavigateRequest>,
) -> Response {
    apply_intent(&state, &session_id, Intent::Navigate(req.target.into())).await
}

/// POST /sessions/:session_id/finish
/// Freeze the session and return its results
pub async fn finish(State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    apply_intent(&state, &session_id, Intent::Finish).await
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
