use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use redress_core::pipeline::ResolveRequest;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    #[serde(default)]
    customer_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    order_id: Option<String>,
}

/// POST /api/chat — run the pipeline for a live customer message.
pub async fn chat(
    State(app): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (Some(customer_id), Some(message)) = (body.customer_id, body.message) else {
        return Err(AppError::bad_request("customerId and message are required"));
    };

    let outcome = app
        .pipeline
        .resolve(ResolveRequest {
            customer_id,
            message,
            delay_days: 0,
            order_id: body.order_id,
            external_context: None,
        })
        .await?;

    Ok(Json(serde_json::to_value(outcome)?))
}
