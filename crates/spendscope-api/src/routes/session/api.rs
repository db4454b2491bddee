//! Session API endpoints - JSON API

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use spendscope_core::{AnalysisSession, AnalysisView};

use crate::{current_view, with_any_session, with_session, ApiError, AppState, Identity};

#[derive(Debug, Deserialize)]
pub struct DemoModeRequest {
    pub enabled: bool,
}

/// Hide the error banner
pub async fn api_dismiss_error(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalysisView>, ApiError> {
    let identity = Identity::from_headers(&headers, &state.config);
    with_session(&state, &identity, |s| s.dismiss_error()).await?;
    Ok(Json(current_view(&state, &identity).await?))
}

/// Demo flag of the caller's session, or the configured default
pub async fn api_demo_mode(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    let identity = Identity::from_headers(&headers, &state.config);
    let demo_mode = match state.sessions.read().await.get(&identity.session_key) {
        Some(slot) => slot.session.demo_mode(),
        None => state.config.session.demo_mode,
    };
    Json(serde_json::json!({ "demo_mode": demo_mode }))
}

/// Toggle demo mode and load the matching data set
///
/// Turning demo mode on is the one action that opens a session without an
/// identity.
pub async fn api_set_demo_mode(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<DemoModeRequest>,
) -> Result<Json<AnalysisView>, ApiError> {
    let identity = Identity::from_headers(&headers, &state.config);
    let toggle = |s: &mut AnalysisSession| s.set_demo_mode(body.enabled);
    if body.enabled {
        with_any_session(&state, &identity, toggle).await?;
    } else {
        with_session(&state, &identity, toggle).await?;
    }
    Ok(Json(current_view(&state, &identity).await?))
}

/// End the caller's session; filters return to their defaults next time
pub async fn api_end_session(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    let identity = Identity::from_headers(&headers, &state.config);
    let ended = state.sessions.write().await.remove(&identity.session_key).is_some();
    if ended {
        log::info!("Session {} ended", identity.session_key);
    }
    Json(serde_json::json!({ "ended": ended }))
}
