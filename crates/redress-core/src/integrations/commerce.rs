//! Commerce actions: store credit, refunds, carrier claims.

use async_trait::async_trait;

use crate::integrations::ActionOutcome;

// ---------------------------------------------------------------------------
// CommerceGateway
// ---------------------------------------------------------------------------

/// Side-effecting operations the dispatcher can execute. Best-effort:
/// failures are published to the activity feed, never rolled back into the
/// decision.
#[async_trait]
pub trait CommerceGateway: Send + Sync {
    async fn apply_credit(
        &self,
        order_id: &str,
        amount: f64,
        customer_id: &str,
    ) -> std::io::Result<ActionOutcome>;

    async fn process_refund(
        &self,
        order_id: &str,
        amount: f64,
        reason: &str,
    ) -> std::io::Result<ActionOutcome>;

    async fn file_carrier_claim(
        &self,
        tracking_ref: &str,
        order_total: f64,
        brand: &str,
        session_id: &str,
    ) -> std::io::Result<ActionOutcome>;
}

// ---------------------------------------------------------------------------
// MockCommerce
// ---------------------------------------------------------------------------

/// Simulated gateway producing the step narration the dashboard shows.
#[derive(Debug, Default)]
pub struct MockCommerce;

#[async_trait]
impl CommerceGateway for MockCommerce {
    async fn apply_credit(
        &self,
        order_id: &str,
        amount: f64,
        _customer_id: &str,
    ) -> std::io::Result<ActionOutcome> {
        Ok(ActionOutcome {
            success: true,
            steps: vec![
                format!("Opening admin panel for order {order_id}..."),
                format!("Entering credit amount: ${amount:.2}..."),
                format!("Credit of ${amount:.2} applied to order {order_id}"),
            ],
        })
    }

    async fn process_refund(
        &self,
        order_id: &str,
        amount: f64,
        reason: &str,
    ) -> std::io::Result<ActionOutcome> {
        Ok(ActionOutcome {
            success: true,
            steps: vec![
                format!("Opening admin panel for order {order_id}..."),
                format!("Selecting refund reason: {reason}..."),
                format!("Refund of ${amount:.2} processed for order {order_id}"),
            ],
        })
    }

    async fn file_carrier_claim(
        &self,
        tracking_ref: &str,
        order_total: f64,
        brand: &str,
        session_id: &str,
    ) -> std::io::Result<ActionOutcome> {
        Ok(ActionOutcome {
            success: true,
            steps: vec![
                format!("Opening carrier claim portal for {tracking_ref}..."),
                format!("Filing claim on behalf of {brand} (session {session_id})..."),
                format!("Claim filed for ${order_total:.2} on {tracking_ref}"),
            ],
        })
    }
}

// ---------------------------------------------------------------------------
// RestCommerce
// ---------------------------------------------------------------------------

/// Thin REST gateway against a shop admin API. Request bodies are simplified
/// proxies for the real payloads; swap freely with [`MockCommerce`].
#[derive(Debug, Clone)]
pub struct RestCommerce {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestCommerce {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> std::io::Result<()> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("X-Admin-Token", &self.token)
            .json(&body)
            .send()
            .await
            .map_err(std::io::Error::other)?;
        resp.error_for_status().map_err(std::io::Error::other)?;
        Ok(())
    }
}

#[async_trait]
impl CommerceGateway for RestCommerce {
    async fn apply_credit(
        &self,
        order_id: &str,
        amount: f64,
        customer_id: &str,
    ) -> std::io::Result<ActionOutcome> {
        self.post(
            "/gift_cards.json",
            serde_json::json!({
                "gift_card": {
                    "note": format!("Delay compensation for order {order_id}"),
                    "initial_value": amount,
                    "customer_id": customer_id,
                }
            }),
        )
        .await?;
        Ok(ActionOutcome {
            success: true,
            steps: vec![format!("Applied ${amount:.2} credit to order {order_id} via admin API")],
        })
    }

    async fn process_refund(
        &self,
        order_id: &str,
        amount: f64,
        reason: &str,
    ) -> std::io::Result<ActionOutcome> {
        self.post(
            &format!("/orders/{order_id}/refunds.json"),
            serde_json::json!({
                "refund": {
                    "currency": "USD",
                    "note": reason,
                    "transactions": [{ "kind": "refund", "amount": amount }],
                }
            }),
        )
        .await?;
        Ok(ActionOutcome {
            success: true,
            steps: vec![format!("Processed ${amount:.2} refund for order {order_id} via admin API")],
        })
    }

    async fn file_carrier_claim(
        &self,
        tracking_ref: &str,
        order_total: f64,
        brand: &str,
        session_id: &str,
    ) -> std::io::Result<ActionOutcome> {
        self.post(
            "/carrier_claims.json",
            serde_json::json!({
                "claim": {
                    "tracking_ref": tracking_ref,
                    "amount": order_total,
                    "brand": brand,
                    "session_id": session_id,
                }
            }),
        )
        .await?;
        Ok(ActionOutcome {
            success: true,
            steps: vec![format!("Filed carrier claim for {tracking_ref} (${order_total:.2})")],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_credit_narrates_steps_in_order() {
        let outcome = MockCommerce
            .apply_credit("order-1042", 20.0, "customer-001")
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.steps.len(), 3);
        assert!(outcome.steps[1].contains("$20.00"));
        assert!(outcome.steps.last().unwrap().contains("order-1042"));
    }

    #[tokio::test]
    async fn mock_claim_mentions_brand() {
        let outcome = MockCommerce
            .file_carrier_claim("demo-tracking-001", 189.99, "Redress Sneaker Co.", "order-1042")
            .await
            .unwrap();
        assert!(outcome.steps.iter().any(|s| s.contains("Redress Sneaker Co.")));
    }
}
