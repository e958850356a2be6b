//! Prompt construction for the decision service.

use crate::policy::Policy;
use crate::types::CustomerContext;

/// System prompt establishing the agent's role, the compensation rules, and
/// the required output schema.
pub const SYSTEM_PROMPT: &str = r#"You are Redress, an autonomous customer service agent for a DTC sneaker brand.
You have access to the customer's full history, order status, and company policy.
Your job is to decide the best action to take and draft the customer message.

Rules:
- Always check LTV and tier before deciding compensation level
- VIP customers get 2x the standard credit
- Never approve refunds over the auto-approve threshold without flagging for human review
- Match the brand voice: warm, direct, use first name, never robotic
- Never say "I apologize for the inconvenience"
- If you apply a credit or refund, always explain why in plain English
- Output ONLY valid JSON matching this schema:

{
  "action": "send_message" | "apply_credit" | "process_refund" | "escalate" | "file_carrier_claim",
  "message": "<customer-facing message>",
  "creditAmount": <number>,
  "requiresHumanReview": <boolean>,
  "reasoning": "<internal reasoning for the activity feed, not shown to customer>"
}
"#;

/// Build the user-side message carrying all the context the service needs.
pub fn build_user_prompt(
    context: &CustomerContext,
    customer_message: &str,
    policy: Option<&Policy>,
    external_context: Option<&str>,
) -> String {
    let customer = &context.customer;
    let mut parts = Vec::new();

    parts.push("=== CUSTOMER CONTEXT ===".to_string());
    parts.push(format!("Name: {}", customer.name));
    parts.push(format!("Email: {}", customer.email));
    parts.push(format!("Tier: {}", customer.tier));
    parts.push(format!("LTV: ${:.2}", customer.ltv));
    parts.push(format!("Prior issues: {}", context.stats.total_issues));
    parts.push(format!(
        "Total credit ever applied: ${:.2}",
        context.stats.total_credit_applied
    ));

    if !context.orders.is_empty() {
        parts.push("\n=== ORDERS ===".to_string());
        for order in &context.orders {
            parts.push(format!(
                "- Order {}: {} | Status: {} | Carrier: {} | Total: ${:.2}",
                order.id, order.product, order.status, order.carrier, order.total
            ));
        }
    }

    if !context.stats.recent_issues.is_empty() {
        parts.push("\n=== ISSUE HISTORY ===".to_string());
        for summary in &context.stats.recent_issues {
            parts.push(format!("- {summary}"));
        }
    }

    if !context.resolutions.is_empty() {
        parts.push("\n=== RESOLUTION HISTORY ===".to_string());
        for resolution in &context.resolutions {
            let preview: String = resolution.message.chars().take(80).collect();
            parts.push(format!(
                "- {}: credit ${:.0} — {}",
                resolution.action, resolution.credit_applied, preview
            ));
        }
    }

    if let Some(policy) = policy {
        parts.push("\n=== APPLICABLE POLICY ===".to_string());
        parts.push(format!("Recommended action: {}", policy.action));
        parts.push(format!("Credit amount: ${:.2}", policy.credit));
        parts.push(format!("Brand voice: {}", policy.brand_voice));
        parts.push(format!(
            "Auto-approve refund threshold: ${:.0}",
            policy.auto_approve_refund_threshold
        ));
    }

    if let Some(external) = external_context {
        parts.push(format!("\n=== EXTERNAL CONTEXT ===\n{external}"));
    }

    parts.push(format!("\n=== CUSTOMER MESSAGE ===\n{customer_message}"));

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use crate::policy::resolve_policy;
    use crate::types::{Customer, CustomerStats, Tier};

    fn context() -> CustomerContext {
        CustomerContext {
            customer: Customer {
                id: "customer-001".into(),
                name: "Sarah Chen".into(),
                email: "sarah.chen@example.com".into(),
                tier: Tier::Vip,
                ltv: 2400.0,
            },
            orders: Vec::new(),
            issues: Vec::new(),
            resolutions: Vec::new(),
            stats: CustomerStats::default(),
        }
    }

    #[test]
    fn prompt_always_carries_customer_and_message() {
        let prompt = build_user_prompt(&context(), "where is my order?", None, None);
        assert!(prompt.contains("Name: Sarah Chen"));
        assert!(prompt.contains("Tier: vip"));
        assert!(prompt.contains("=== CUSTOMER MESSAGE ===\nwhere is my order?"));
        assert!(!prompt.contains("=== APPLICABLE POLICY ==="));
        assert!(!prompt.contains("=== ORDERS ==="));
    }

    #[test]
    fn prompt_includes_policy_when_present() {
        let policy = resolve_policy(4, Tier::Vip, &PolicyConfig::default());
        let prompt = build_user_prompt(&context(), "trigger", Some(&policy), None);
        assert!(prompt.contains("Recommended action: send_apology_with_credit"));
        assert!(prompt.contains("Credit amount: $20.00"));
        assert!(prompt.contains("Auto-approve refund threshold: $150"));
    }

    #[test]
    fn prompt_appends_external_context_block() {
        let prompt = build_user_prompt(&context(), "hi", None, Some("FedEx ground stoppage"));
        assert!(prompt.contains("=== EXTERNAL CONTEXT ===\nFedEx ground stoppage"));
    }

    #[test]
    fn schema_names_every_action() {
        for action in [
            "send_message",
            "apply_credit",
            "process_refund",
            "escalate",
            "file_carrier_claim",
        ] {
            assert!(SYSTEM_PROMPT.contains(action));
        }
    }
}
