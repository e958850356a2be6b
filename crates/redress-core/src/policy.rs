//! Compensation policy resolution.
//!
//! Pure and deterministic: delay duration + tier in, recommended action and
//! credit out. The resolver never gates on the auto-approve threshold — that
//! value rides along for the decision engine to reason over.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::PolicyConfig;
use crate::types::Tier;

// ---------------------------------------------------------------------------
// PolicyAction
// ---------------------------------------------------------------------------

/// The policy table's recommended course of action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyAction {
    NoActionNeeded,
    SendApology,
    SendApologyWithCredit,
    OfferRefundOrReplacement,
}

impl PolicyAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyAction::NoActionNeeded => "no_action_needed",
            PolicyAction::SendApology => "send_apology",
            PolicyAction::SendApologyWithCredit => "send_apology_with_credit",
            PolicyAction::OfferRefundOrReplacement => "offer_refund_or_replacement",
        }
    }
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// A resolved policy: derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub action: PolicyAction,
    pub credit: f64,
    pub brand_voice: String,
    pub auto_approve_refund_threshold: f64,
}

/// Resolve the compensation policy for a delay.
///
/// Base table:
///
/// | delay days | action                      | credit |
/// |-----------:|-----------------------------|-------:|
/// | <= 0       | no_action_needed            |      0 |
/// | 1-2        | send_apology                |      0 |
/// | 3-5        | send_apology_with_credit    |     10 |
/// | >= 6       | offer_refund_or_replacement |     25 |
///
/// VIP tier multiplies the credit only — never the action or the
/// auto-approve threshold.
pub fn resolve_policy(delay_days: i64, tier: Tier, config: &PolicyConfig) -> Policy {
    let (action, base_credit) = match delay_days {
        d if d <= 0 => (PolicyAction::NoActionNeeded, 0.0),
        1..=2 => (PolicyAction::SendApology, 0.0),
        3..=5 => (PolicyAction::SendApologyWithCredit, 10.0),
        _ => (PolicyAction::OfferRefundOrReplacement, 25.0),
    };

    let credit = if tier == Tier::Vip && base_credit > 0.0 {
        base_credit * config.vip_multiplier
    } else {
        base_credit
    };

    Policy {
        action,
        credit,
        brand_voice: config.brand_voice.clone(),
        auto_approve_refund_threshold: config.auto_approve_refund_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(days: i64, tier: Tier) -> Policy {
        resolve_policy(days, tier, &PolicyConfig::default())
    }

    #[test]
    fn no_delay_means_no_action() {
        for d in [-3, -1, 0] {
            let p = policy(d, Tier::Standard);
            assert_eq!(p.action, PolicyAction::NoActionNeeded);
            assert_eq!(p.credit, 0.0);
        }
    }

    #[test]
    fn short_delay_is_apology_without_credit() {
        for d in [1, 2] {
            let p = policy(d, Tier::Standard);
            assert_eq!(p.action, PolicyAction::SendApology);
            assert_eq!(p.credit, 0.0);
        }
    }

    #[test]
    fn vip_multiplier_has_no_effect_on_zero_credit() {
        for d in [1, 2] {
            assert_eq!(policy(d, Tier::Vip).credit, 0.0);
        }
    }

    #[test]
    fn medium_delay_credits_ten_or_twenty() {
        for d in [3, 4, 5] {
            assert_eq!(policy(d, Tier::Standard).credit, 10.0);
            assert_eq!(policy(d, Tier::Vip).credit, 20.0);
            assert_eq!(policy(d, Tier::Vip).action, PolicyAction::SendApologyWithCredit);
        }
    }

    #[test]
    fn long_delay_credits_twenty_five_or_fifty() {
        for d in [6, 9, 30] {
            let standard = policy(d, Tier::Standard);
            let vip = policy(d, Tier::Vip);
            assert_eq!(standard.action, PolicyAction::OfferRefundOrReplacement);
            assert_eq!(standard.credit, 25.0);
            assert_eq!(vip.credit, 50.0);
        }
    }

    #[test]
    fn threshold_is_never_multiplied() {
        let vip = policy(7, Tier::Vip);
        assert_eq!(vip.auto_approve_refund_threshold, 150.0);
    }
}
