//! In-memory graph store with the seeded demo dataset.
//!
//! Stands in for the external graph database in development and tests. The
//! `available` switch simulates an unreachable datastore so degraded-mode
//! paths can be exercised without a network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::store::{ContextRecords, GraphLink, GraphNode, GraphSnapshot, GraphStore, StoreError};
use crate::types::{
    Customer, Issue, IssueKind, IssueStatus, Order, OrderStatus, OrderWithCustomer, Resolution,
    Tier,
};

// ---------------------------------------------------------------------------
// MemoryGraph
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Inner {
    customers: Vec<Customer>,
    /// (customer_id, order) pairs — the PLACED edge.
    orders: Vec<(String, Order)>,
    issues: Vec<Issue>,
    resolutions: Vec<Resolution>,
}

#[derive(Debug)]
pub struct MemoryGraph {
    inner: RwLock<Inner>,
    available: AtomicBool,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn short_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &hex[..8])
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Demo dataset: three customers, three shipped orders, and one prior
    /// resolved issue/resolution pair for Marcus.
    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write().expect("store lock poisoned");

            inner.customers = vec![
                Customer {
                    id: "customer-001".into(),
                    name: "Sarah Chen".into(),
                    email: "sarah.chen@example.com".into(),
                    tier: Tier::Vip,
                    ltv: 2400.0,
                },
                Customer {
                    id: "customer-002".into(),
                    name: "Marcus Williams".into(),
                    email: "marcus.w@example.com".into(),
                    tier: Tier::Standard,
                    ltv: 180.0,
                },
                Customer {
                    id: "customer-003".into(),
                    name: "Priya Patel".into(),
                    email: "priya.patel@example.com".into(),
                    tier: Tier::Vip,
                    ltv: 5100.0,
                },
            ];

            inner.orders = vec![
                (
                    "customer-001".into(),
                    Order {
                        id: "order-1042".into(),
                        product: "Nike Air Max".into(),
                        carrier: "FedEx".into(),
                        tracking_ref: "demo-tracking-001".into(),
                        estimated_delivery: "2026-03-03".into(),
                        total: 189.99,
                        status: OrderStatus::Shipped,
                    },
                ),
                (
                    "customer-002".into(),
                    Order {
                        id: "order-1043".into(),
                        product: "Adidas Ultraboost".into(),
                        carrier: "UPS".into(),
                        tracking_ref: "demo-tracking-002".into(),
                        estimated_delivery: "2026-03-04".into(),
                        total: 159.99,
                        status: OrderStatus::Shipped,
                    },
                ),
                (
                    "customer-003".into(),
                    Order {
                        id: "order-1044".into(),
                        product: "New Balance 990".into(),
                        carrier: "FedEx".into(),
                        tracking_ref: "demo-tracking-003".into(),
                        estimated_delivery: "2026-03-05".into(),
                        total: 199.99,
                        status: OrderStatus::Shipped,
                    },
                ),
            ];

            let past = Utc.with_ymd_and_hms(2025, 11, 27, 10, 0, 0).unwrap();
            inner.issues = vec![Issue {
                id: "issue-past-001".into(),
                order_id: "order-1043".into(),
                customer_id: "customer-002".into(),
                kind: IssueKind::LateDelivery,
                description: "Package arrived 3 days late".into(),
                status: IssueStatus::Resolved,
                created_at: past,
            }];
            inner.resolutions = vec![Resolution {
                id: "resolution-past-001".into(),
                issue_id: "issue-past-001".into(),
                action: "apply_credit".into(),
                credit_applied: 10.0,
                message: "Hi Marcus, we're sorry about the delay. We've applied a $10 credit to your account.".into(),
                timestamp: past + chrono::Duration::minutes(5),
            }];
        }
        store
    }

    /// Flip availability — tests use this to simulate a datastore outage.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory graph marked offline".into()))
        }
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn customer_records(
        &self,
        customer_id: &str,
    ) -> Result<Option<ContextRecords>, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().expect("store lock poisoned");

        let Some(customer) = inner.customers.iter().find(|c| c.id == customer_id) else {
            return Ok(None);
        };

        let orders: Vec<Order> = inner
            .orders
            .iter()
            .filter(|(cid, _)| cid == customer_id)
            .map(|(_, o)| o.clone())
            .collect();
        let issues: Vec<Issue> = inner
            .issues
            .iter()
            .filter(|i| i.customer_id == customer_id)
            .cloned()
            .collect();
        let issue_ids: Vec<&str> = issues.iter().map(|i| i.id.as_str()).collect();
        let resolutions = inner
            .resolutions
            .iter()
            .filter(|r| issue_ids.contains(&r.issue_id.as_str()))
            .cloned()
            .collect();

        Ok(Some(ContextRecords {
            customer: customer.clone(),
            orders,
            issues,
            resolutions,
        }))
    }

    async fn all_orders(&self) -> Result<Vec<OrderWithCustomer>, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(inner
            .orders
            .iter()
            .filter_map(|(cid, order)| {
                let customer = inner.customers.iter().find(|c| &c.id == cid)?;
                Some(OrderWithCustomer {
                    order: order.clone(),
                    customer_id: customer.id.clone(),
                    customer_name: customer.name.clone(),
                    tier: customer.tier,
                })
            })
            .collect())
    }

    async fn order(&self, order_id: &str) -> Result<Option<OrderWithCustomer>, StoreError> {
        Ok(self
            .all_orders()
            .await?
            .into_iter()
            .find(|o| o.order.id == order_id))
    }

    async fn open_issue(&self, order_id: &str) -> Result<Option<Issue>, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(inner
            .issues
            .iter()
            .find(|i| i.order_id == order_id && i.status == IssueStatus::Open)
            .cloned())
    }

    async fn issues_for_order(&self, order_id: &str) -> Result<Vec<Issue>, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(inner
            .issues
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn create_issue(
        &self,
        order_id: &str,
        kind: IssueKind,
        description: &str,
    ) -> Result<Issue, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.write().expect("store lock poisoned");

        let customer_id = inner
            .orders
            .iter()
            .find(|(_, o)| o.id == order_id)
            .map(|(cid, _)| cid.clone())
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))?;

        let issue = Issue {
            id: short_id("issue"),
            order_id: order_id.to_string(),
            customer_id,
            kind,
            description: description.to_string(),
            status: IssueStatus::Open,
            created_at: Utc::now(),
        };
        inner.issues.push(issue.clone());
        Ok(issue)
    }

    async fn create_resolution(
        &self,
        issue_id: &str,
        action: &str,
        credit_applied: f64,
        message: &str,
    ) -> Result<Resolution, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.write().expect("store lock poisoned");

        let issue = inner
            .issues
            .iter_mut()
            .find(|i| i.id == issue_id)
            .ok_or_else(|| StoreError::IssueNotFound(issue_id.to_string()))?;
        issue.status = IssueStatus::Resolved;

        let resolution = Resolution {
            id: short_id("resolution"),
            issue_id: issue_id.to_string(),
            action: action.to_string(),
            credit_applied,
            message: message.to_string(),
            timestamp: Utc::now(),
        };
        inner.resolutions.push(resolution.clone());
        Ok(resolution)
    }

    async fn set_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let mut inner = self.inner.write().expect("store lock poisoned");
        let (_, order) = inner
            .orders
            .iter_mut()
            .find(|(_, o)| o.id == order_id)
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))?;
        order.status = status;
        Ok(())
    }

    async fn graph_snapshot(&self) -> Result<GraphSnapshot, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().expect("store lock poisoned");

        let mut nodes = Vec::new();
        let mut links = Vec::new();

        for customer in &inner.customers {
            nodes.push(GraphNode {
                id: customer.id.clone(),
                label: "Customer".into(),
                data: serde_json::to_value(customer).unwrap_or_default(),
            });
        }
        for (customer_id, order) in &inner.orders {
            nodes.push(GraphNode {
                id: order.id.clone(),
                label: "Order".into(),
                data: serde_json::to_value(order).unwrap_or_default(),
            });
            links.push(GraphLink {
                source: customer_id.clone(),
                kind: "PLACED".into(),
                target: order.id.clone(),
            });
        }
        for issue in &inner.issues {
            nodes.push(GraphNode {
                id: issue.id.clone(),
                label: "Issue".into(),
                data: serde_json::to_value(issue).unwrap_or_default(),
            });
            links.push(GraphLink {
                source: issue.order_id.clone(),
                kind: "HAS_ISSUE".into(),
                target: issue.id.clone(),
            });
            links.push(GraphLink {
                source: issue.customer_id.clone(),
                kind: "HAD_ISSUE".into(),
                target: issue.id.clone(),
            });
        }
        for resolution in &inner.resolutions {
            nodes.push(GraphNode {
                id: resolution.id.clone(),
                label: "Resolution".into(),
                data: serde_json::to_value(resolution).unwrap_or_default(),
            });
            links.push(GraphLink {
                source: resolution.issue_id.clone(),
                kind: "RESOLVED_BY".into(),
                target: resolution.id.clone(),
            });
        }

        Ok(GraphSnapshot { nodes, links })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_store_has_demo_records() {
        let store = MemoryGraph::seeded();
        let orders = store.all_orders().await.unwrap();
        assert_eq!(orders.len(), 3);

        let records = store.customer_records("customer-002").await.unwrap().unwrap();
        assert_eq!(records.customer.name, "Marcus Williams");
        assert_eq!(records.issues.len(), 1);
        assert_eq!(records.resolutions.len(), 1);
    }

    #[tokio::test]
    async fn unknown_customer_is_none_not_error() {
        let store = MemoryGraph::seeded();
        assert!(store.customer_records("customer-999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_resolution_marks_issue_resolved() {
        let store = MemoryGraph::seeded();
        let issue = store
            .create_issue("order-1042", IssueKind::LateDelivery, "4 days late")
            .await
            .unwrap();
        assert_eq!(issue.status, IssueStatus::Open);
        assert_eq!(issue.customer_id, "customer-001");

        let open = store.open_issue("order-1042").await.unwrap();
        assert_eq!(open.as_ref().map(|i| i.id.as_str()), Some(issue.id.as_str()));

        store
            .create_resolution(&issue.id, "apply_credit", 20.0, "sorry!")
            .await
            .unwrap();
        assert!(store.open_issue("order-1042").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn offline_store_returns_unavailable() {
        let store = MemoryGraph::seeded();
        store.set_available(false);
        assert!(matches!(
            store.all_orders().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.create_issue("order-1042", IssueKind::LateDelivery, "x").await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn snapshot_links_follow_ownership() {
        let store = MemoryGraph::seeded();
        let snapshot = store.graph_snapshot().await.unwrap();
        assert_eq!(snapshot.nodes.len(), 3 + 3 + 1 + 1);
        assert!(snapshot
            .links
            .iter()
            .any(|l| l.source == "customer-001" && l.kind == "PLACED" && l.target == "order-1042"));
        assert!(snapshot
            .links
            .iter()
            .any(|l| l.source == "issue-past-001" && l.kind == "RESOLVED_BY"));
    }
}
