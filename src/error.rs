//! Unified error taxonomy for the orchestration core.
//!
//! Every fallible operation in this crate returns `CoreError`. Each variant
//! knows its HTTP status, whether it is safe to retry, and the message a
//! caller is allowed to see.

use axum::http::StatusCode;

#[derive(Debug, thiserror::Error, Clone)]
pub enum CoreError {
    /// Classifier returned `{false, false, false}` for the utterance.
    #[error("request is out of scope: {0}")]
    ClassificationOutOfScope(String),

    /// Provider returned plain text when a CFG binding was configured, or no
    /// `custom_tool_call` item was present in the response.
    #[error("agent '{agent}' grammar violation: {reason}")]
    AgentGrammarViolation { agent: String, reason: String },

    /// DSL text parsed against the grammar but failed a semantic check.
    #[error("agent '{agent}' parse error: {reason}")]
    AgentParseError { agent: String, reason: String },

    /// Pre-flight network/HTTP failure talking to the provider.
    #[error("provider transport error: {0}")]
    ProviderTransport(String),

    /// A provider call or orchestrator step exceeded its deadline.
    #[error("provider deadline exceeded after {elapsed_ms}ms")]
    ProviderDeadline { elapsed_ms: u64 },

    /// A remote MCP tool reported failure. Always non-fatal.
    #[error("tool '{tool_name}' call failed: {reason}")]
    ToolCallError { tool_name: String, reason: String },

    /// Composition stage 2 returned zero choices.
    #[error("composition stage 2 returned zero choices")]
    Stage2NoChoices,

    /// The caller cancelled the request or disconnected.
    #[error("request cancelled")]
    CancelledByClient,

    /// `AppConfig` failed to load or validate. Fatal to process startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Catch-all for invariant violations that indicate a bug.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable machine-readable category, used as a `tracing` field and the
    /// `error.kind` value in JSON error bodies.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ClassificationOutOfScope(_) => "classification_out_of_scope",
            Self::AgentGrammarViolation { .. } => "agent_grammar_violation",
            Self::AgentParseError { .. } => "agent_parse_error",
            Self::ProviderTransport(_) => "provider_transport",
            Self::ProviderDeadline { .. } => "provider_deadline",
            Self::ToolCallError { .. } => "tool_call_error",
            Self::Stage2NoChoices => "stage2_no_choices",
            Self::CancelledByClient => "cancelled_by_client",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the *caller* (not this crate's own pre-flight retry layer)
    /// should consider retrying the request as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderTransport(_) | Self::ProviderDeadline { .. })
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::ClassificationOutOfScope(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::AgentGrammarViolation { .. } | Self::AgentParseError { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Self::ProviderTransport(_) => StatusCode::BAD_GATEWAY,
            Self::ProviderDeadline { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::ToolCallError { .. } => StatusCode::OK, // carried in-band, never top-level
            Self::Stage2NoChoices => StatusCode::BAD_GATEWAY,
            Self::CancelledByClient => StatusCode::REQUEST_TIMEOUT,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text that is safe to send to an external caller. Internal detail for
    /// `Internal`/`Config` is logged via `tracing::error!` but never placed
    /// here.
    pub fn user_message(&self) -> String {
        match self {
            Self::ClassificationOutOfScope(utterance) => {
                format!("this request doesn't look like a music-production action: {utterance}")
            }
            Self::AgentGrammarViolation { agent, .. } => {
                format!("agent '{agent}' did not return a valid response")
            }
            Self::AgentParseError { agent, .. } => {
                format!("agent '{agent}' returned a malformed response")
            }
            Self::ProviderTransport(_) => "upstream provider is unreachable".to_string(),
            Self::ProviderDeadline { .. } => "upstream provider timed out".to_string(),
            Self::ToolCallError { tool_name, .. } => format!("tool '{tool_name}' failed"),
            Self::Stage2NoChoices => "composition produced no results".to_string(),
            Self::CancelledByClient => "request cancelled".to_string(),
            Self::Config(_) => "service misconfigured".to_string(),
            Self::Internal(_) => "internal error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_retryable() {
        let e = CoreError::ProviderTransport("connect refused".into());
        assert!(e.is_retryable());
        assert_eq!(e.category(), "provider_transport");
    }

    #[test]
    fn internal_errors_never_leak_detail() {
        let e = CoreError::Internal("schema compile failed: foo bar baz".into());
        assert_eq!(e.user_message(), "internal error");
        assert!(!e.is_retryable());
    }

    #[test]
    fn out_of_scope_maps_to_422() {
        let e = CoreError::ClassificationOutOfScope("bake me a cake".into());
        assert_eq!(e.http_status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
