use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use redress_core::pipeline::ResolveRequest;
use redress_core::store::{GraphStore, StoreError};
use redress_core::types::{Order, OrderStatus, OrderWithCustomer, Tier};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerBody {
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    days_late: Option<i64>,
}

/// POST /api/trigger-delay — simulate a carrier delay for one order and run
/// the full autonomous flow. Demo/operational endpoint.
pub async fn trigger_delay(
    State(app): State<AppState>,
    Json(body): Json<TriggerBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Some(order_id) = body.order_id else {
        return Err(AppError::bad_request("orderId is required"));
    };
    let days_late = body.days_late.unwrap_or(4);
    if days_late <= 0 {
        return Err(AppError::bad_request("daysLate must be positive"));
    }

    let row = match app.store.order(&order_id).await {
        Ok(Some(row)) => row,
        Ok(None) => return Err(AppError::not_found(order_id)),
        Err(StoreError::Unavailable(_)) => demo_order(&order_id)
            .ok_or_else(|| AppError::not_found(order_id.clone()))?,
        Err(err) => return Err(err.into()),
    };

    app.bus.delay_detected(
        &row.order.id,
        &row.customer_name,
        &row.order.carrier,
        days_late,
    );

    let message = format!(
        "PROACTIVE ALERT: Carrier tracking shows Order {} ({}) is {} days late. \
         Customer {} is a {} customer.",
        row.order.id, row.order.product, days_late, row.customer_name, row.tier
    );

    let outcome = app
        .pipeline
        .resolve(ResolveRequest::delay(
            row.customer_id.clone(),
            message,
            days_late,
            row.order.id.clone(),
        ))
        .await?;

    let mut response = serde_json::to_value(outcome)?;
    response["orderId"] = serde_json::Value::String(order_id);
    response["daysLate"] = serde_json::Value::from(days_late);
    response["trigger"] = serde_json::Value::String("manual_demo".into());
    Ok(Json(response))
}

/// Demo orders used when the datastore cannot be read. Mirrors the seeded
/// dataset so the demo keeps working through an outage.
fn demo_order(order_id: &str) -> Option<OrderWithCustomer> {
    let (customer_id, customer_name, tier, product, carrier, total) = match order_id {
        "order-1042" => ("customer-001", "Sarah Chen", Tier::Vip, "Nike Air Max", "FedEx", 189.99),
        "order-1043" => (
            "customer-002",
            "Marcus Williams",
            Tier::Standard,
            "Adidas Ultraboost",
            "UPS",
            159.99,
        ),
        "order-1044" => (
            "customer-003",
            "Priya Patel",
            Tier::Vip,
            "New Balance 990",
            "FedEx",
            199.99,
        ),
        _ => return None,
    };
    Some(OrderWithCustomer {
        order: Order {
            id: order_id.to_string(),
            product: product.to_string(),
            carrier: carrier.to_string(),
            tracking_ref: String::new(),
            estimated_delivery: String::new(),
            total,
            status: OrderStatus::Shipped,
        },
        customer_id: customer_id.to_string(),
        customer_name: customer_name.to_string(),
        tier,
    })
}
