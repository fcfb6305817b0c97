use super::state::{AppState, LastEvents};
use crate::error::BridgeError;
use crate::options::{
    OutputDescriptor, OutputRoute, PlaybackOptions, PlaybackSettings, RecordingOptions,
    RecordingSettings,
};
use crate::session::{FinishedData, SessionStatus};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PrepareRecordingRequest {
    /// Absolute, or relative to the configured recordings directory
    pub path: String,

    /// Any subset of the recording options
    #[serde(default)]
    pub options: Value,
}

#[derive(Debug, Serialize)]
pub struct PrepareRecordingResponse {
    pub path: String,
    pub settings: RecordingSettings,
}

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    pub path: String,

    #[serde(default)]
    pub options: Value,

    /// Output route key, e.g. "Phone Speaker"
    pub output: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub path: String,
    pub settings: PlaybackSettings,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    pub seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct DurationQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct DurationResponse {
    pub path: String,
    pub duration: f64,
}

#[derive(Debug, Serialize)]
pub struct PathResponse {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: SessionStatus,
    pub last_events: LastEvents,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// `BridgeError` rendered as an HTTP response
pub struct ApiError(BridgeError);

impl From<BridgeError> for ApiError {
    fn from(e: BridgeError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BridgeError::InvalidOption { .. } => StatusCode::BAD_REQUEST,
            BridgeError::AuthorizationDenied => StatusCode::FORBIDDEN,
            BridgeError::AlreadyActive(_) | BridgeError::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            BridgeError::SeekOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BridgeError::PrepareFailed(_) | BridgeError::NativeTransportError(_) => {
                StatusCode::BAD_GATEWAY
            }
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                kind: self.0.kind_name().to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn snapshot(events: &std::sync::Mutex<LastEvents>) -> LastEvents {
    events.lock().expect("event log mutex poisoned").clone()
}

// ============================================================================
// Recorder
// ============================================================================

/// POST /recorder/prepare
pub async fn prepare_recording(
    State(state): State<AppState>,
    Json(req): Json<PrepareRecordingRequest>,
) -> ApiResult<PrepareRecordingResponse> {
    let path = state.config.resolve_recording_path(&req.path);
    let options = RecordingOptions::from_value(req.options)?;

    info!("Preparing recording at {}", path);
    let settings = state.bridge.recorder.prepare(&path, &options).await?;
    // Only an accepted prepare starts a new event history
    *state.recorder_events.lock().expect("event log mutex poisoned") = LastEvents::default();

    Ok(Json(PrepareRecordingResponse { path, settings }))
}

/// POST /recorder/start
pub async fn start_recording(State(state): State<AppState>) -> ApiResult<PathResponse> {
    let path = state.bridge.recorder.start().await?;
    Ok(Json(PathResponse { path }))
}

/// POST /recorder/pause
pub async fn pause_recording(State(state): State<AppState>) -> ApiResult<PathResponse> {
    let path = state.bridge.recorder.pause().await?;
    Ok(Json(PathResponse { path }))
}

/// POST /recorder/resume
pub async fn resume_recording(State(state): State<AppState>) -> ApiResult<PathResponse> {
    let path = state.bridge.recorder.resume().await?;
    Ok(Json(PathResponse { path }))
}

/// POST /recorder/stop
pub async fn stop_recording(State(state): State<AppState>) -> ApiResult<FinishedData> {
    let finished = state.bridge.recorder.stop().await?;
    Ok(Json(finished))
}

/// GET /recorder/status
pub async fn recorder_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: state.bridge.recorder.status().await,
        last_events: snapshot(&state.recorder_events),
    })
}

// ============================================================================
// Player
// ============================================================================

/// POST /player/play
pub async fn play(
    State(state): State<AppState>,
    Json(req): Json<PlayRequest>,
) -> ApiResult<PlayResponse> {
    let options = PlaybackOptions::from_value(req.options)?;
    let output = req
        .output
        .as_deref()
        .map(str::parse::<OutputRoute>)
        .transpose()?;

    info!("Playing {}", req.path);
    let settings = state.bridge.player.play(&req.path, &options, output).await?;
    *state.player_events.lock().expect("event log mutex poisoned") = LastEvents::default();

    Ok(Json(PlayResponse {
        path: req.path,
        settings,
    }))
}

/// POST /player/pause
pub async fn pause_playback(State(state): State<AppState>) -> ApiResult<PathResponse> {
    let path = state.bridge.player.pause().await?;
    Ok(Json(PathResponse { path }))
}

/// POST /player/unpause
pub async fn unpause_playback(State(state): State<AppState>) -> ApiResult<PathResponse> {
    let path = state.bridge.player.unpause().await?;
    Ok(Json(PathResponse { path }))
}

/// POST /player/stop
pub async fn stop_playback(State(state): State<AppState>) -> ApiResult<PathResponse> {
    let path = state.bridge.player.stop().await?;
    Ok(Json(PathResponse { path }))
}

/// POST /player/seek
pub async fn seek(
    State(state): State<AppState>,
    Json(req): Json<SeekRequest>,
) -> ApiResult<SessionStatus> {
    state.bridge.player.skip_to_seconds(req.seconds).await?;
    Ok(Json(state.bridge.player.status().await))
}

/// GET /player/duration?path=...
pub async fn duration_from_path(
    State(state): State<AppState>,
    Query(query): Query<DurationQuery>,
) -> ApiResult<DurationResponse> {
    let duration = state.bridge.player.get_duration_from_path(&query.path).await?;
    Ok(Json(DurationResponse {
        path: query.path,
        duration,
    }))
}

/// GET /player/outputs
pub async fn get_outputs(State(state): State<AppState>) -> ApiResult<Vec<OutputDescriptor>> {
    let outputs = state.bridge.player.get_outputs().await?;
    Ok(Json(outputs))
}

/// GET /player/status
pub async fn player_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: state.bridge.player.status().await,
        last_events: snapshot(&state.player_events),
    })
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
