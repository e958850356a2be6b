use serde::{Deserialize, Serialize};

// ─── DecisionAction ───────────────────────────────────────────────────────

/// The action the pipeline is instructed to take for a customer.
///
/// Discriminated by the JSON `"action"` field of the service's output
/// schema. Unknown tags are handled during normalization (they fall back to
/// [`DecisionAction::SendMessage`]) rather than failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    SendMessage,
    ApplyCredit,
    ProcessRefund,
    Escalate,
    FileCarrierClaim,
}

impl DecisionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionAction::SendMessage => "send_message",
            DecisionAction::ApplyCredit => "apply_credit",
            DecisionAction::ProcessRefund => "process_refund",
            DecisionAction::Escalate => "escalate",
            DecisionAction::FileCarrierClaim => "file_carrier_claim",
        }
    }

    /// Parse a raw action tag. `None` for anything the schema doesn't name.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "send_message" => Some(DecisionAction::SendMessage),
            "apply_credit" => Some(DecisionAction::ApplyCredit),
            "process_refund" => Some(DecisionAction::ProcessRefund),
            "escalate" => Some(DecisionAction::Escalate),
            "file_carrier_claim" => Some(DecisionAction::FileCarrierClaim),
            _ => None,
        }
    }
}

impl std::fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── RawDecision ──────────────────────────────────────────────────────────

/// Lenient mirror of the service's output schema: every field optional so a
/// partial answer still parses. Normalization into [`Decision`] applies the
/// documented defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDecision {
    pub action: Option<String>,
    pub message: Option<String>,
    #[serde(alias = "creditAmount")]
    pub credit_amount: Option<f64>,
    #[serde(alias = "requiresHumanReview")]
    pub requires_human_review: Option<bool>,
    pub reasoning: Option<String>,
}

// ─── Decision ─────────────────────────────────────────────────────────────

/// The normalized output of the decision engine.
///
/// Serialized camelCase because it travels verbatim in API responses and
/// dashboard events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub action: DecisionAction,
    /// Customer-facing message.
    pub message: String,
    /// Always >= 0 after normalization.
    pub credit_amount: f64,
    pub requires_human_review: bool,
    /// Internal reasoning for the activity feed, never shown to customers.
    pub reasoning: String,
}

impl Decision {
    /// Apply the defaulting rules to a leniently-parsed payload.
    ///
    /// - `action` missing or unrecognized → `send_message`
    /// - `message` missing → empty
    /// - `credit_amount` missing → 0; negative values clamp to 0
    /// - `requires_human_review` missing → false
    pub fn from_raw(raw: RawDecision) -> Self {
        let action = raw
            .action
            .as_deref()
            .and_then(DecisionAction::parse)
            .unwrap_or(DecisionAction::SendMessage);
        Decision {
            action,
            message: raw.message.unwrap_or_default(),
            credit_amount: raw.credit_amount.unwrap_or(0.0).max(0.0),
            requires_human_review: raw.requires_human_review.unwrap_or(false),
            reasoning: raw.reasoning.unwrap_or_default(),
        }
    }

    /// Safe fallback for output that is not JSON at all: relay the raw text
    /// as a plain message rather than crashing the pipeline.
    pub fn fallback(raw_text: &str) -> Self {
        Decision {
            action: DecisionAction::SendMessage,
            message: raw_text.to_string(),
            credit_amount: 0.0,
            requires_human_review: false,
            reasoning: "Service response was not valid JSON; relaying raw text.".to_string(),
        }
    }
}

// ─── Wire types ───────────────────────────────────────────────────────────

/// One chat turn in the generate request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Request body for the service's `generate` task.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model_id: String,
    pub task: &'static str,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

impl GenerateRequest {
    pub fn new(model_id: &str, max_tokens: u32, system: &str, user: &str) -> Self {
        GenerateRequest {
            model_id: model_id.to_string(),
            task: "generate",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            max_tokens,
        }
    }
}

/// Response envelope. Deployments answer in one of several shapes; all the
/// observed content locations are optional fields here and probed in order.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub completion: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    /// Anything else the envelope carried, kept so the whole-envelope
    /// fallback can reproduce it.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl GenerateResponse {
    /// Extract the generated text, probing the known envelope shapes:
    /// `completion`, OpenAI-style `choices`, `content`, then `output`.
    /// Falls back to re-serializing the whole envelope so the caller's
    /// fallback path still has something to show.
    pub fn into_text(self) -> String {
        if let Some(completion) = self.completion {
            return completion;
        }
        if let Some(choices) = &self.choices {
            if let Some(first) = choices.first() {
                if let Some(content) = first.message.as_ref().and_then(|m| m.content.clone()) {
                    return content;
                }
                if let Some(text) = first.text.clone() {
                    return text;
                }
            }
        }
        if let Some(content) = self.content {
            return content;
        }
        if let Some(output) = self.output {
            return output;
        }
        serde_json::Value::Object(self.extra).to_string()
    }
}
