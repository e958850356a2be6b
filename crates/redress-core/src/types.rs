use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Customer loyalty segment; drives the policy credit multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Standard,
    Vip,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Standard => "standard",
            Tier::Vip => "vip",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = crate::error::RedressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Tier::Standard),
            "vip" => Ok(Tier::Vip),
            _ => Err(crate::error::RedressError::InvalidRequest(format!(
                "unknown tier '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub tier: Tier,
    /// Lifetime value in dollars.
    pub ltv: f64,
}

impl Customer {
    /// First name for customer-facing copy.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// Order lifecycle. Monotone for the pipeline: shipped → delayed → resolved.
/// Delivered is reached externally and excluded from monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Shipped,
    Delayed,
    Resolved,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delayed => "delayed",
            OrderStatus::Resolved => "resolved",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// Terminal states are skipped by the monitor loop.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Resolved | OrderStatus::Delivered)
    }

    /// Position in the monotone lifecycle. Status never moves backwards.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub product: String,
    pub carrier: String,
    pub tracking_ref: String,
    /// ISO date the carrier originally promised.
    pub estimated_delivery: String,
    pub total: f64,
    pub status: OrderStatus,
}

/// An order joined with its owning customer — the monitor loop's scan row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithCustomer {
    #[serde(flatten)]
    pub order: Order,
    pub customer_id: String,
    pub customer_name: String,
    pub tier: Tier,
}

// ---------------------------------------------------------------------------
// Issue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    LateDelivery,
    CustomerInquiry,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::LateDelivery => "late_delivery",
            IssueKind::CustomerInquiry => "customer_inquiry",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    Resolved,
}

/// A tracked problem instance tied to one order. Invariant enforced by the
/// ledger writer: at most one open issue per order at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub order_id: String,
    pub customer_id: String,
    pub kind: IssueKind,
    pub description: String,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// The recorded outcome closing an issue. Exactly one per resolved issue,
/// created atomically with marking the issue resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub id: String,
    pub issue_id: String,
    pub action: String,
    pub credit_applied: f64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// CustomerContext
// ---------------------------------------------------------------------------

/// Aggregate figures computed over a customer's history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    pub total_orders: usize,
    pub total_issues: usize,
    /// Sum of every credit ever applied, across all resolutions.
    pub total_credit_applied: f64,
    /// Short summaries of the most recent issues, newest first.
    pub recent_issues: Vec<String>,
}

/// One consistent snapshot of everything known about a customer. The primary
/// input to the decision prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerContext {
    pub customer: Customer,
    pub orders: Vec<Order>,
    pub issues: Vec<Issue>,
    pub resolutions: Vec<Resolution>,
    pub stats: CustomerStats,
}

impl CustomerContext {
    /// Find an order in the snapshot by id.
    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Resolved.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(!OrderStatus::Delayed.is_terminal());
    }

    #[test]
    fn tier_round_trips_through_str() {
        assert_eq!("vip".parse::<Tier>().unwrap(), Tier::Vip);
        assert_eq!(Tier::Standard.as_str(), "standard");
        assert!("gold".parse::<Tier>().is_err());
    }

    #[test]
    fn first_name_takes_leading_token() {
        let customer = Customer {
            id: "c1".into(),
            name: "Sarah Chen".into(),
            email: "sarah@example.com".into(),
            tier: Tier::Vip,
            ltv: 2400.0,
        };
        assert_eq!(customer.first_name(), "Sarah");
    }
}
