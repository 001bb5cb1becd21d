//! HTTP surface of the verification service.
//!
//! API endpoints:
//! - POST /enroll  {speaker_id, audio_base64} -> {status, speaker_id}
//! - POST /match   {audio_base64, speaker_id?} -> {speaker_id, confidence, match}
//! - GET  /health  -> {status, stored}

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use scribegear_voiceprint::{Matcher, VoiceprintError};

#[derive(Clone)]
struct AppState {
    matcher: Arc<Matcher>,
}

/// Starts the HTTP server and blocks until it exits.
pub async fn serve(addr: &str, matcher: Arc<Matcher>) -> Result<()> {
    let state = AppState { matcher };

    let app = Router::new()
        .route("/enroll", post(enroll))
        .route("/match", post(match_speaker))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = parse_addr(addr)?;
    info!("voiceprintd: listening on http://{}", addr);
    info!("  - POST /enroll   Enroll a speaker voiceprint");
    info!("  - POST /match    Match audio against stored voiceprints");
    info!("  - GET  /health   Service health and stored count");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Parse address string to SocketAddr, accepting `:port` shorthand.
fn parse_addr(addr: &str) -> Result<SocketAddr> {
    let addr = if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    };
    Ok(addr.parse()?)
}

#[derive(Debug, Deserialize)]
struct EnrollRequest {
    speaker_id: String,
    audio_base64: String,
}

#[derive(Debug, Serialize)]
struct EnrollResponse {
    status: &'static str,
    speaker_id: String,
}

#[derive(Debug, Deserialize)]
struct MatchRequest {
    audio_base64: String,
    #[serde(default)]
    speaker_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct MatchResponse {
    speaker_id: String,
    confidence: f32,
    #[serde(rename = "match")]
    is_match: bool,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    stored: usize,
}

/// Voiceprint errors carried out of a handler, mapped to a status code and
/// a JSON error envelope. No retries — failures surface directly.
struct ApiError(VoiceprintError);

impl From<VoiceprintError> for ApiError {
    fn from(err: VoiceprintError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            VoiceprintError::Decode(_) => StatusCode::BAD_REQUEST,
            VoiceprintError::NotFound => StatusCode::NOT_FOUND,
            VoiceprintError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            VoiceprintError::Encode(_) => StatusCode::BAD_GATEWAY,
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

fn decode_audio(audio_base64: &str) -> Result<Vec<u8>, ApiError> {
    STANDARD
        .decode(audio_base64)
        .map_err(|e| ApiError(VoiceprintError::Decode(format!("base64: {e}"))))
}

async fn enroll(
    State(state): State<AppState>,
    Json(req): Json<EnrollRequest>,
) -> Result<Json<EnrollResponse>, ApiError> {
    let audio = decode_audio(&req.audio_base64)?;
    state.matcher.enroll(&req.speaker_id, &audio).await?;
    Ok(Json(EnrollResponse {
        status: "saved",
        speaker_id: req.speaker_id,
    }))
}

async fn match_speaker(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    let audio = decode_audio(&req.audio_base64)?;
    let result = state
        .matcher
        .match_audio(&audio, req.speaker_id.as_deref())
        .await?;
    Ok(Json(MatchResponse {
        speaker_id: result.speaker_id,
        confidence: result.confidence,
        is_match: result.is_match,
    }))
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let stored = state.matcher.stored()?;
    Ok(Json(HealthResponse {
        status: "ok",
        stored,
    }))
}
