//! Settings API endpoints - JSON API

use axum::extract::State;
use crate::AppState;

pub async fn api_settings(State(state): State<AppState>) -> String {
    serde_json::to_string(&state.config).unwrap_or_default()
}

/// Category catalog with the fallback entry for unknown ids
pub async fn api_categories(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "categories": state.catalog.entries(),
        "fallback": state.catalog.fallback(),
    }))
}
