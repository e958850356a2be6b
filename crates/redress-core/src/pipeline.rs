//! The resolution pipeline — context → policy → decision → dispatch →
//! ledger → publish.
//!
//! One entry point serves both callers: the monitor loop (auto-generated
//! trigger message) and live chat handlers (customer-authored message).
//! Stages run strictly in order; concurrent invocations for the same order
//! serialize on a per-order lock around the dispatch-and-record window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;

use decision_agent::{Decision, DecisionAction, DecisionClient};

use crate::config::PolicyConfig;
use crate::context::ContextAggregator;
use crate::dispatch::Dispatcher;
use crate::error::{RedressError, Result};
use crate::events::ActivityBus;
use crate::integrations::{search, CommerceGateway, SignalSearch};
use crate::ledger::{issue_kind_for, DuplicateCheck, LedgerWriter};
use crate::policy::{resolve_policy, Policy};
use crate::prompt::{build_user_prompt, SYSTEM_PROMPT};
use crate::store::GraphStore;
use crate::types::{CustomerContext, OrderStatus, OrderWithCustomer};

// ---------------------------------------------------------------------------
// DecisionService
// ---------------------------------------------------------------------------

/// The generative decision engine, as the pipeline sees it. Tests plug in
/// stubs; production uses [`DecisionClient`].
#[async_trait]
pub trait DecisionService: Send + Sync {
    async fn decide(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> decision_agent::Result<Decision>;
}

#[async_trait]
impl DecisionService for DecisionClient {
    async fn decide(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> decision_agent::Result<Decision> {
        DecisionClient::decide(self, system_prompt, user_prompt).await
    }
}

// ---------------------------------------------------------------------------
// ResolveRequest / ResolveOutcome
// ---------------------------------------------------------------------------

/// One pipeline invocation.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub customer_id: String,
    pub message: String,
    /// Days late per the trigger; 0 for plain inquiries.
    pub delay_days: i64,
    pub order_id: Option<String>,
    /// Pre-gathered external signal text; when absent and a delay is being
    /// resolved, the pipeline consults the search provider itself.
    pub external_context: Option<String>,
}

impl ResolveRequest {
    /// A live-chat invocation.
    pub fn chat(customer_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            message: message.into(),
            delay_days: 0,
            order_id: None,
            external_context: None,
        }
    }

    /// A delay trigger tied to an order.
    pub fn delay(
        customer_id: impl Into<String>,
        message: impl Into<String>,
        delay_days: i64,
        order_id: impl Into<String>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            message: message.into(),
            delay_days,
            order_id: Some(order_id.into()),
            external_context: None,
        }
    }
}

/// The pipeline's answer: the decision plus the context and policy that
/// produced it, for API responses and dashboards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutcome {
    #[serde(flatten)]
    pub decision: Decision,
    pub customer_context: Option<CustomerContext>,
    pub policy: Option<Policy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline {
    aggregator: ContextAggregator,
    store: Arc<dyn GraphStore>,
    decision: Arc<dyn DecisionService>,
    dispatcher: Dispatcher,
    ledger: LedgerWriter,
    signals: Arc<dyn SignalSearch>,
    bus: ActivityBus,
    policy_config: PolicyConfig,
    /// Per-order mutexes serializing the check-then-create window.
    order_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn GraphStore>,
        decision: Arc<dyn DecisionService>,
        commerce: Arc<dyn CommerceGateway>,
        signals: Arc<dyn SignalSearch>,
        bus: ActivityBus,
        policy_config: PolicyConfig,
        brand_name: String,
    ) -> Self {
        Self {
            aggregator: ContextAggregator::new(store.clone()),
            dispatcher: Dispatcher::new(commerce, bus.clone(), brand_name),
            ledger: LedgerWriter::new(store.clone(), bus.clone()),
            store,
            decision,
            signals,
            bus,
            policy_config,
            order_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The ledger writer, for callers that advance order status around an
    /// invocation (monitor, trigger route).
    pub fn ledger(&self) -> &LedgerWriter {
        &self.ledger
    }

    /// Run the full pipeline for one trigger.
    ///
    /// Unknown customers resolve to a conservative escalate decision rather
    /// than an error. Storage trouble is absorbed. Only malformed input and
    /// a decision service that stays down past its retry budget are errors.
    pub async fn resolve(&self, request: ResolveRequest) -> Result<ResolveOutcome> {
        if request.customer_id.trim().is_empty() {
            return Err(RedressError::InvalidRequest("customerId is required".into()));
        }
        if request.message.trim().is_empty() {
            return Err(RedressError::InvalidRequest("message is required".into()));
        }

        // Stage 1: context.
        let Some(context) = self.aggregator.aggregate(&request.customer_id).await? else {
            let decision = not_found_decision(&request.customer_id);
            self.bus
                .decision_made(decision.action.as_str(), 0.0, &decision.reasoning);
            return Ok(ResolveOutcome {
                decision,
                customer_context: None,
                policy: None,
                order_id: request.order_id,
            });
        };
        self.bus.context_retrieved(
            &context.customer.name,
            context.customer.tier.as_str(),
            context.customer.ltv,
            context.stats.total_issues,
        );

        // Stage 2: policy, only when a delay is being resolved.
        let policy = (request.delay_days > 0).then(|| {
            let policy = resolve_policy(
                request.delay_days,
                context.customer.tier,
                &self.policy_config,
            );
            self.bus.policy_resolved(
                request.delay_days,
                policy.credit,
                context.customer.tier.as_str(),
            );
            policy
        });

        // Stage 2.5: external signal, if the caller brought none.
        let external_context = match &request.external_context {
            Some(explicit) => Some(explicit.clone()),
            None if request.delay_days > 0 => {
                self.gather_signal(&context, request.order_id.as_deref()).await
            }
            None => None,
        };

        // Stage 3: decision.
        let user_prompt = build_user_prompt(
            &context,
            &request.message,
            policy.as_ref(),
            external_context.as_deref(),
        );
        let decision = self.decision.decide(SYSTEM_PROMPT, &user_prompt).await?;
        self.bus.decision_made(
            decision.action.as_str(),
            decision.credit_amount,
            &decision.reasoning,
        );

        // Stage 4 + 5: dispatch and ledger, serialized per order.
        if let Some(order_id) = &request.order_id {
            self.dispatch_and_record(order_id, &context, &decision, &request)
                .await;
        }

        self.bus
            .message_sent(&context.customer.name, &decision.message);

        Ok(ResolveOutcome {
            decision,
            customer_context: Some(context),
            policy,
            order_id: request.order_id,
        })
    }

    /// Search for carrier-disruption context around the delayed order.
    async fn gather_signal(
        &self,
        context: &CustomerContext,
        order_id: Option<&str>,
    ) -> Option<String> {
        let carrier = order_id
            .and_then(|id| context.order(id))
            .map(|o| o.carrier.as_str())
            .unwrap_or("shipping");
        let query = format!("{carrier} shipping delays weather news");

        match self.signals.search(&query).await {
            Ok(hits) => search::format_hits(&query, &hits),
            Err(err) => {
                tracing::warn!(%err, query, "signal search failed, continuing without");
                None
            }
        }
    }

    async fn dispatch_and_record(
        &self,
        order_id: &str,
        context: &CustomerContext,
        decision: &Decision,
        request: &ResolveRequest,
    ) {
        let lock = self.order_lock(order_id);
        let _guard = lock.lock().await;

        if request.delay_days > 0 {
            self.ledger
                .mark_order_status(order_id, OrderStatus::Delayed)
                .await;
        }

        let kind = issue_kind_for(request.delay_days);
        match self.ledger.duplicate_check(order_id, kind).await {
            DuplicateCheck::Duplicate => return,
            DuplicateCheck::Fresh | DuplicateCheck::StoreDown | DuplicateCheck::OrderMissing => {}
        }

        match self.order_row(order_id, context).await {
            Some(row) => self.dispatcher.dispatch(&row, decision).await,
            None => {
                tracing::warn!(order_id, "order unknown, skipping action dispatch");
            }
        }

        let description: String = request.message.chars().take(200).collect();
        let _ = self
            .ledger
            .record(order_id, decision, request.delay_days, &description)
            .await;

        if request.delay_days > 0 {
            self.ledger
                .mark_order_status(order_id, OrderStatus::Resolved)
                .await;
        }
    }

    /// Find the order row for dispatch, preferring the store but falling
    /// back to the aggregated snapshot when storage is down.
    async fn order_row(
        &self,
        order_id: &str,
        context: &CustomerContext,
    ) -> Option<OrderWithCustomer> {
        if let Ok(Some(row)) = self.store.order(order_id).await {
            return Some(row);
        }
        context.order(order_id).map(|order| OrderWithCustomer {
            order: order.clone(),
            customer_id: context.customer.id.clone(),
            customer_name: context.customer.name.clone(),
            tier: context.customer.tier,
        })
    }

    fn order_lock(&self, order_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.order_locks.lock().expect("order lock map poisoned");
        locks
            .entry(order_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

fn not_found_decision(customer_id: &str) -> Decision {
    Decision {
        action: DecisionAction::Escalate,
        message: "Customer not found.".into(),
        credit_amount: 0.0,
        requires_human_review: true,
        reasoning: format!("No customer found with ID {customer_id}"),
    }
}
