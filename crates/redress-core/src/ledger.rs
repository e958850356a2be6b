//! Audit ledger writer — the only component that mutates the graph.
//!
//! One pipeline invocation produces at most one Issue/Resolution pair,
//! written as a logical unit. Storage being down downgrades the writes to a
//! published warning; the decision still reaches the customer.

use std::sync::Arc;

use decision_agent::Decision;

use crate::events::ActivityBus;
use crate::store::{GraphStore, StoreError};
use crate::types::{IssueKind, OrderStatus};

// ---------------------------------------------------------------------------
// LedgerOutcome
// ---------------------------------------------------------------------------

/// What the ledger actually did for an invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerOutcome {
    Recorded {
        issue_id: String,
        resolution_id: String,
    },
    /// The order already carries an issue for this problem instance.
    DuplicateSkipped,
    /// The datastore was unavailable; nothing was written.
    StorageSkipped,
    /// The order is not in the graph; nothing to link against.
    OrderMissing,
}

// ---------------------------------------------------------------------------
// DuplicateCheck
// ---------------------------------------------------------------------------

/// Result of the pre-write dedup gate. The pipeline consults this before
/// executing any side-effecting action for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateCheck {
    /// No issue on record for this problem instance; proceed.
    Fresh,
    /// An open issue exists, or a delay trigger hit an order whose episode
    /// is already terminal.
    Duplicate,
    /// The store cannot answer; proceed with dispatch, skip writes.
    StoreDown,
    /// The order is not in the graph at all.
    OrderMissing,
}

/// Issue kind implied by the trigger.
pub fn issue_kind_for(delay_days: i64) -> IssueKind {
    if delay_days > 0 {
        IssueKind::LateDelivery
    } else {
        IssueKind::CustomerInquiry
    }
}

// ---------------------------------------------------------------------------
// LedgerWriter
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct LedgerWriter {
    store: Arc<dyn GraphStore>,
    bus: ActivityBus,
}

impl LedgerWriter {
    pub fn new(store: Arc<dyn GraphStore>, bus: ActivityBus) -> Self {
        Self { store, bus }
    }

    /// Dedup gate, checked against the store before any write:
    /// - an open issue already exists on the order, or
    /// - the trigger is a delay and the order status is already terminal —
    ///   the episode was handled (status is monotone, so a re-trigger
    ///   cannot rewind it).
    pub async fn duplicate_check(&self, order_id: &str, kind: IssueKind) -> DuplicateCheck {
        match self.store.open_issue(order_id).await {
            Ok(Some(existing)) => {
                tracing::info!(order_id, issue_id = %existing.id, "open issue exists, skipping duplicate");
                self.bus.publish(
                    crate::events::EventCategory::DispatchStep,
                    format!("order {order_id} already has an open issue, skipping duplicate"),
                    serde_json::json!({ "orderId": order_id, "issueId": existing.id }),
                );
                return DuplicateCheck::Duplicate;
            }
            Ok(None) => {}
            Err(StoreError::Unavailable(reason)) => {
                tracing::warn!(order_id, %reason, "dedup check skipped, store unavailable");
                return DuplicateCheck::StoreDown;
            }
            Err(err) => {
                tracing::warn!(order_id, %err, "dedup check failed");
                return DuplicateCheck::StoreDown;
            }
        }

        if kind == IssueKind::LateDelivery {
            match self.store.order(order_id).await {
                Ok(Some(row)) if row.order.status.is_terminal() => {
                    tracing::info!(order_id, "delay episode already handled, skipping duplicate issue");
                    return DuplicateCheck::Duplicate;
                }
                Ok(Some(_)) => {}
                Ok(None) => return DuplicateCheck::OrderMissing,
                Err(_) => return DuplicateCheck::StoreDown,
            }
        }

        DuplicateCheck::Fresh
    }

    /// Write the Issue + Resolution pair for a decided invocation. Runs the
    /// dedup gate itself, so calling it directly is always safe.
    pub async fn record(
        &self,
        order_id: &str,
        decision: &Decision,
        delay_days: i64,
        description: &str,
    ) -> LedgerOutcome {
        let kind = issue_kind_for(delay_days);

        match self.duplicate_check(order_id, kind).await {
            DuplicateCheck::Fresh => {}
            DuplicateCheck::Duplicate => return LedgerOutcome::DuplicateSkipped,
            DuplicateCheck::StoreDown => return LedgerOutcome::StorageSkipped,
            DuplicateCheck::OrderMissing => return LedgerOutcome::OrderMissing,
        }

        let issue = match self.store.create_issue(order_id, kind, description).await {
            Ok(issue) => issue,
            Err(StoreError::OrderNotFound(_)) => return LedgerOutcome::OrderMissing,
            Err(err) => {
                tracing::warn!(order_id, %err, "issue write skipped");
                return LedgerOutcome::StorageSkipped;
            }
        };

        let resolution = match self
            .store
            .create_resolution(
                &issue.id,
                decision.action.as_str(),
                decision.credit_amount,
                &decision.message,
            )
            .await
        {
            Ok(resolution) => resolution,
            Err(err) => {
                // Issue stays open; the open-issue gate keeps retries from
                // doubling it up.
                tracing::warn!(issue_id = %issue.id, %err, "resolution write skipped");
                return LedgerOutcome::StorageSkipped;
            }
        };

        self.bus.graph_changed();
        LedgerOutcome::Recorded {
            issue_id: issue.id,
            resolution_id: resolution.id,
        }
    }

    /// Advance an order along its monotone lifecycle. Requests that would
    /// move the status backwards are ignored; storage outages are absorbed.
    pub async fn mark_order_status(&self, order_id: &str, status: OrderStatus) {
        let current = match self.store.order(order_id).await {
            Ok(Some(row)) => row.order.status,
            Ok(None) => {
                tracing::warn!(order_id, "status update for unknown order ignored");
                return;
            }
            Err(err) => {
                tracing::warn!(order_id, %err, "status update skipped");
                return;
            }
        };

        if status.index() <= current.index() {
            tracing::debug!(order_id, from = %current, to = %status, "ignoring non-monotone status update");
            return;
        }

        match self.store.set_order_status(order_id, status).await {
            Ok(()) => self.bus.order_status_changed(order_id, status.as_str()),
            Err(err) => tracing::warn!(order_id, %err, "status update skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryGraph;
    use decision_agent::{Decision, DecisionAction};

    fn decision() -> Decision {
        Decision {
            action: DecisionAction::ApplyCredit,
            message: "Hi Sarah, credit applied.".into(),
            credit_amount: 20.0,
            requires_human_review: false,
            reasoning: "4-day delay, vip".into(),
        }
    }

    fn writer(store: Arc<MemoryGraph>) -> LedgerWriter {
        LedgerWriter::new(store, ActivityBus::default())
    }

    #[tokio::test]
    async fn records_issue_and_resolution_pair() {
        let store = Arc::new(MemoryGraph::seeded());
        let ledger = writer(store.clone());

        let outcome = ledger.record("order-1042", &decision(), 4, "4 days late").await;
        let LedgerOutcome::Recorded { issue_id, .. } = outcome else {
            panic!("expected Recorded, got {outcome:?}");
        };

        let issues = store.issues_for_order("order-1042").await.unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, issue_id);
        assert_eq!(issues[0].kind, IssueKind::LateDelivery);
        // Resolved atomically with the resolution write.
        assert!(store.open_issue("order-1042").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn open_issue_blocks_duplicates() {
        let store = Arc::new(MemoryGraph::seeded());
        store
            .create_issue("order-1042", IssueKind::LateDelivery, "in flight")
            .await
            .unwrap();

        let ledger = writer(store.clone());
        let outcome = ledger.record("order-1042", &decision(), 4, "4 days late").await;
        assert_eq!(outcome, LedgerOutcome::DuplicateSkipped);
        assert_eq!(store.issues_for_order("order-1042").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resolved_delay_episode_blocks_duplicates() {
        let store = Arc::new(MemoryGraph::seeded());
        let ledger = writer(store.clone());

        ledger.mark_order_status("order-1042", OrderStatus::Delayed).await;
        let first = ledger.record("order-1042", &decision(), 4, "4 days late").await;
        assert!(matches!(first, LedgerOutcome::Recorded { .. }));
        ledger.mark_order_status("order-1042", OrderStatus::Resolved).await;

        // Re-trigger: delayed cannot rewind a resolved order, so the ledger
        // sees the episode as already handled.
        ledger.mark_order_status("order-1042", OrderStatus::Delayed).await;
        let second = ledger.record("order-1042", &decision(), 4, "4 days late").await;
        assert_eq!(second, LedgerOutcome::DuplicateSkipped);
        assert_eq!(store.issues_for_order("order-1042").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn prior_resolved_issue_from_old_episode_does_not_block() {
        // order-1043 carries a resolved late_delivery issue from months ago;
        // a fresh delay on a still-shipped order must open a new one.
        let store = Arc::new(MemoryGraph::seeded());
        let ledger = writer(store.clone());

        let outcome = ledger.record("order-1043", &decision(), 3, "3 days late").await;
        assert!(matches!(outcome, LedgerOutcome::Recorded { .. }));
        assert_eq!(store.issues_for_order("order-1043").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn storage_outage_skips_without_error() {
        let store = Arc::new(MemoryGraph::seeded());
        store.set_available(false);
        let ledger = writer(store.clone());

        let outcome = ledger.record("order-1042", &decision(), 4, "4 days late").await;
        assert_eq!(outcome, LedgerOutcome::StorageSkipped);

        store.set_available(true);
        assert!(store.issues_for_order("order-1042").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_order_is_order_missing() {
        let ledger = writer(Arc::new(MemoryGraph::seeded()));
        let outcome = ledger.record("order-9999", &decision(), 4, "4 days late").await;
        assert_eq!(outcome, LedgerOutcome::OrderMissing);
    }

    #[tokio::test]
    async fn status_never_moves_backwards() {
        let store = Arc::new(MemoryGraph::seeded());
        let ledger = writer(store.clone());

        ledger.mark_order_status("order-1042", OrderStatus::Resolved).await;
        ledger.mark_order_status("order-1042", OrderStatus::Delayed).await;

        let row = store.order("order-1042").await.unwrap().unwrap();
        assert_eq!(row.order.status, OrderStatus::Resolved);
    }
}
