//! Graph datastore contract.
//!
//! The store is the system of record for customers, orders, issues, and
//! resolutions, and the arbiter of the open-issue invariant. All mutation
//! goes through the ledger writer; everything here is explicit-`Result` so
//! callers are forced to handle the degraded-storage path.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    Customer, Issue, IssueKind, Order, OrderStatus, OrderWithCustomer, Resolution,
};

pub use memory::MemoryGraph;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing datastore cannot be reached. Absorbed close to the
    /// source: writes are skipped, reads fall back to demo context.
    #[error("graph store unavailable: {0}")]
    Unavailable(String),

    #[error("order not found in graph: {0}")]
    OrderNotFound(String),

    #[error("issue not found in graph: {0}")]
    IssueNotFound(String),
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// Raw per-customer records, before aggregation.
#[derive(Debug, Clone)]
pub struct ContextRecords {
    pub customer: Customer,
    pub orders: Vec<Order>,
    pub issues: Vec<Issue>,
    pub resolutions: Vec<Resolution>,
}

/// Whole-graph snapshot for the visualization endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// Node label: Customer, Order, Issue, or Resolution.
    pub label: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub target: String,
}

// ---------------------------------------------------------------------------
// GraphStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Everything recorded about one customer, or `None` if unknown.
    async fn customer_records(&self, customer_id: &str)
        -> Result<Option<ContextRecords>, StoreError>;

    /// All orders joined with their owning customer (monitor scan input).
    async fn all_orders(&self) -> Result<Vec<OrderWithCustomer>, StoreError>;

    async fn order(&self, order_id: &str) -> Result<Option<OrderWithCustomer>, StoreError>;

    /// The open issue on an order, if any. The ledger writer's dedup gate.
    async fn open_issue(&self, order_id: &str) -> Result<Option<Issue>, StoreError>;

    async fn issues_for_order(&self, order_id: &str) -> Result<Vec<Issue>, StoreError>;

    /// Create an open issue linked to the order and its customer.
    async fn create_issue(
        &self,
        order_id: &str,
        kind: IssueKind,
        description: &str,
    ) -> Result<Issue, StoreError>;

    /// Create the resolution for an issue and mark the issue resolved, as
    /// one unit.
    async fn create_resolution(
        &self,
        issue_id: &str,
        action: &str,
        credit_applied: f64,
        message: &str,
    ) -> Result<Resolution, StoreError>;

    async fn set_order_status(&self, order_id: &str, status: OrderStatus)
        -> Result<(), StoreError>;

    async fn graph_snapshot(&self) -> Result<GraphSnapshot, StoreError>;
}
