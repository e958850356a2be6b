//! Activity bus — the pipeline's fire-and-forget observability feed.
//!
//! Every stage publishes what it just did; dashboards subscribe over SSE.
//! Publishing never blocks and never fails: consumers are best-effort
//! observers, not part of the pipeline's correctness contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// EventCategory
// ---------------------------------------------------------------------------

/// Fixed taxonomy of activity events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    DelayDetected,
    ContextRetrieved,
    PolicyResolved,
    DecisionMade,
    DispatchStep,
    MessageSent,
    OrderStatusChanged,
    GraphChanged,
}

impl EventCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::DelayDetected => "delay_detected",
            EventCategory::ContextRetrieved => "context_retrieved",
            EventCategory::PolicyResolved => "policy_resolved",
            EventCategory::DecisionMade => "decision_made",
            EventCategory::DispatchStep => "dispatch_step",
            EventCategory::MessageSent => "message_sent",
            EventCategory::OrderStatusChanged => "order_status_changed",
            EventCategory::GraphChanged => "graph_changed",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActivityEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub timestamp: DateTime<Utc>,
    pub category: EventCategory,
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// ActivityBus
// ---------------------------------------------------------------------------

/// Broadcast-backed event sink shared by every pipeline component.
#[derive(Debug, Clone)]
pub struct ActivityBus {
    tx: broadcast::Sender<ActivityEvent>,
}

impl ActivityBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event. No receivers is fine; lagged receivers miss events.
    pub fn publish(&self, category: EventCategory, message: impl Into<String>, data: serde_json::Value) {
        let message = message.into();
        tracing::info!(category = %category, "{message}");
        let _ = self.tx.send(ActivityEvent {
            timestamp: Utc::now(),
            category,
            message,
            data,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEvent> {
        self.tx.subscribe()
    }

    // ── Typed emitters for the common stages ──

    pub fn delay_detected(&self, order_id: &str, customer_name: &str, carrier: &str, days_late: i64) {
        self.publish(
            EventCategory::DelayDetected,
            format!("{carrier} delay detected on order {order_id} — {days_late} day(s) late"),
            serde_json::json!({
                "orderId": order_id,
                "customerName": customer_name,
                "daysLate": days_late,
            }),
        );
    }

    pub fn context_retrieved(&self, customer_name: &str, tier: &str, ltv: f64, prior_issues: usize) {
        self.publish(
            EventCategory::ContextRetrieved,
            format!("{customer_name} — {}, LTV ${ltv:.0}, {prior_issues} prior issue(s)", tier.to_uppercase()),
            serde_json::json!({ "customerName": customer_name, "tier": tier, "ltv": ltv }),
        );
    }

    pub fn policy_resolved(&self, delay_days: i64, credit: f64, tier: &str) {
        let multiplier_note = if tier == "vip" { " (vip multiplier applied)" } else { "" };
        self.publish(
            EventCategory::PolicyResolved,
            format!("{delay_days}-day delay resolves to ${credit:.0} credit{multiplier_note}"),
            serde_json::json!({ "delayDays": delay_days, "credit": credit, "tier": tier }),
        );
    }

    pub fn decision_made(&self, action: &str, credit_amount: f64, reasoning: &str) {
        let credit_note = if credit_amount > 0.0 {
            format!(" + ${credit_amount:.0} credit")
        } else {
            String::new()
        };
        self.publish(
            EventCategory::DecisionMade,
            format!("decision — {action}{credit_note}"),
            serde_json::json!({
                "action": action,
                "creditAmount": credit_amount,
                "reasoning": reasoning,
            }),
        );
    }

    pub fn dispatch_step(&self, step: &str) {
        self.publish(EventCategory::DispatchStep, step, serde_json::Value::Null);
    }

    pub fn message_sent(&self, customer_name: &str, message: &str) {
        self.publish(
            EventCategory::MessageSent,
            format!("message sent to {customer_name}"),
            serde_json::json!({ "customerName": customer_name, "message": message }),
        );
    }

    pub fn order_status_changed(&self, order_id: &str, status: &str) {
        self.publish(
            EventCategory::OrderStatusChanged,
            format!("order {order_id} is now {status}"),
            serde_json::json!({ "orderId": order_id, "status": status }),
        );
    }

    pub fn graph_changed(&self) {
        self.publish(EventCategory::GraphChanged, "graph updated", serde_json::Value::Null);
    }
}

impl Default for ActivityBus {
    fn default() -> Self {
        Self::new(256)
    }
}
