use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/monitor/reset — clear the monitor's processed-order set.
pub async fn reset(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    app.monitor.reset();
    Ok(Json(serde_json::json!({
        "status": "ok",
        "processed": app.monitor.processed_count(),
    })))
}
