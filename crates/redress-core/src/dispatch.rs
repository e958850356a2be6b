//! Action dispatcher — maps a decision onto the commerce gateway.
//!
//! Execution is best-effort: the decision and message have already been
//! made, so a failing adapter is published to the activity feed and the
//! pipeline moves on.

use std::sync::Arc;

use decision_agent::{Decision, DecisionAction};

use crate::events::ActivityBus;
use crate::integrations::{ActionOutcome, CommerceGateway};
use crate::types::OrderWithCustomer;

#[derive(Clone)]
pub struct Dispatcher {
    commerce: Arc<dyn CommerceGateway>,
    bus: ActivityBus,
    brand_name: String,
}

impl Dispatcher {
    pub fn new(commerce: Arc<dyn CommerceGateway>, bus: ActivityBus, brand_name: String) -> Self {
        Self {
            commerce,
            bus,
            brand_name,
        }
    }

    /// Execute the side effect a decision calls for, forwarding each adapter
    /// step to the activity feed in order.
    pub async fn dispatch(&self, order: &OrderWithCustomer, decision: &Decision) {
        let executed: Option<std::io::Result<ActionOutcome>> = match decision.action {
            DecisionAction::SendMessage => None,
            DecisionAction::Escalate => {
                self.bus
                    .dispatch_step(&format!("order {} flagged for human review", order.order.id));
                None
            }
            DecisionAction::ApplyCredit => Some(
                self.commerce
                    .apply_credit(&order.order.id, decision.credit_amount, &order.customer_id)
                    .await,
            ),
            DecisionAction::ProcessRefund => Some(
                self.commerce
                    .process_refund(&order.order.id, decision.credit_amount, "Delay compensation")
                    .await,
            ),
            DecisionAction::FileCarrierClaim => Some(
                self.commerce
                    .file_carrier_claim(
                        &order.order.tracking_ref,
                        order.order.total,
                        &self.brand_name,
                        &order.order.id,
                    )
                    .await,
            ),
        };

        match executed {
            None => {}
            Some(Ok(outcome)) => {
                for step in &outcome.steps {
                    self.bus.dispatch_step(step);
                }
                if !outcome.success {
                    tracing::warn!(order_id = %order.order.id, action = %decision.action,
                        "commerce action reported failure");
                    self.bus
                        .dispatch_step(&format!("{} did not complete for order {}", decision.action, order.order.id));
                }
            }
            Some(Err(err)) => {
                tracing::warn!(order_id = %order.order.id, action = %decision.action, %err,
                    "commerce action failed");
                self.bus.dispatch_step(&format!(
                    "{} failed for order {}: {err}",
                    decision.action, order.order.id
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::MockCommerce;
    use crate::types::{Order, OrderStatus, Tier};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn order_row() -> OrderWithCustomer {
        OrderWithCustomer {
            order: Order {
                id: "order-1042".into(),
                product: "Nike Air Max".into(),
                carrier: "FedEx".into(),
                tracking_ref: "demo-tracking-001".into(),
                estimated_delivery: "2026-03-03".into(),
                total: 189.99,
                status: OrderStatus::Delayed,
            },
            customer_id: "customer-001".into(),
            customer_name: "Sarah Chen".into(),
            tier: Tier::Vip,
        }
    }

    fn decision(action: DecisionAction) -> Decision {
        Decision {
            action,
            message: "hello".into(),
            credit_amount: 20.0,
            requires_human_review: false,
            reasoning: String::new(),
        }
    }

    /// Gateway that counts calls and always fails.
    #[derive(Default)]
    struct FailingCommerce {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CommerceGateway for FailingCommerce {
        async fn apply_credit(&self, _: &str, _: f64, _: &str) -> std::io::Result<ActionOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::other("gateway down"))
        }
        async fn process_refund(&self, _: &str, _: f64, _: &str) -> std::io::Result<ActionOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::other("gateway down"))
        }
        async fn file_carrier_claim(
            &self,
            _: &str,
            _: f64,
            _: &str,
            _: &str,
        ) -> std::io::Result<ActionOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::other("gateway down"))
        }
    }

    #[tokio::test]
    async fn credit_steps_reach_the_feed_in_order() {
        let bus = ActivityBus::default();
        let mut rx = bus.subscribe();
        let dispatcher = Dispatcher::new(Arc::new(MockCommerce), bus, "Redress Sneaker Co.".into());

        dispatcher
            .dispatch(&order_row(), &decision(DecisionAction::ApplyCredit))
            .await;

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        let third = rx.recv().await.unwrap();
        assert!(first.message.contains("Opening admin panel"));
        assert!(second.message.contains("$20.00"));
        assert!(third.message.contains("applied"));
    }

    #[tokio::test]
    async fn escalate_makes_no_commerce_call() {
        let gateway = Arc::new(FailingCommerce::default());
        let dispatcher = Dispatcher::new(gateway.clone(), ActivityBus::default(), "brand".into());

        dispatcher
            .dispatch(&order_row(), &decision(DecisionAction::Escalate))
            .await;
        dispatcher
            .dispatch(&order_row(), &decision(DecisionAction::SendMessage))
            .await;

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn adapter_failure_is_published_not_propagated() {
        let bus = ActivityBus::default();
        let mut rx = bus.subscribe();
        let gateway = Arc::new(FailingCommerce::default());
        let dispatcher = Dispatcher::new(gateway.clone(), bus, "brand".into());

        dispatcher
            .dispatch(&order_row(), &decision(DecisionAction::ProcessRefund))
            .await;

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        let event = rx.recv().await.unwrap();
        assert!(event.message.contains("failed"));
    }
}
