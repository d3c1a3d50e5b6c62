use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health
/// Service status and whether a hosted model is configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "mentorpath-api",
        "llm": {
            "configured": state.llm.is_configured(),
            "model": state.llm.model(),
            "fallbackEnabled": state.config.llm.fallback_enabled,
        }
    }))
}
