//! `decision-agent` — typed client for the generative decision service.
//!
//! The decision service is a chat-completion REST endpoint that is asked to
//! return a JSON object describing the next customer-service action. Models
//! being models, the payload arrives wrapped in markdown fences, preceded by
//! "thinking" sections, or occasionally not as JSON at all — so this crate
//! owns the full normalization path from raw HTTP response to a typed
//! [`Decision`]:
//!
//! ```text
//! ClientConfig
//!     │
//!     ▼
//! DecisionClient   ← POSTs one generate request, retries 429/transport
//!     │               errors with exponential backoff
//!     ▼
//! sanitize         ← strips code fences and <think>…</think> preambles
//!     │
//!     ▼
//! RawDecision      ← lenient parse: every schema field optional
//!     │
//!     ▼
//! Decision         ← defaults applied; non-JSON output becomes a safe
//!                    send_message fallback instead of an error
//! ```
//!
//! Malformed *content* is never an error: the caller always gets a usable
//! [`Decision`]. Exhausted retries and non-429 HTTP failures are errors and
//! abort the caller's current invocation only.

pub mod client;
pub mod error;
pub mod sanitize;
pub mod types;


pub use client::{ClientConfig, DecisionClient};
pub use error::DecisionAgentError;
pub use types::{Decision, DecisionAction, RawDecision};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, DecisionAgentError>;
