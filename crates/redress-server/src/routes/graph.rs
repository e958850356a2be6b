use axum::extract::State;
use axum::Json;

use redress_core::store::GraphStore;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/graph — all nodes + relationships for the force-graph view.
pub async fn graph(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let snapshot = app.store.graph_snapshot().await?;
    Ok(Json(serde_json::to_value(snapshot)?))
}

/// GET /api/orders — all orders with customer info for the live orders panel.
pub async fn orders(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let orders = app.store.all_orders().await?;
    Ok(Json(serde_json::to_value(orders)?))
}
