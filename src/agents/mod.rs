//! Agents: first-class {name, scope, grammar, prompt-fn, parser-fn} records
//! (SPEC_FULL §4.4). Each is a plain struct, not a subclass — "Agents as
//! values, not subclasses" (SPEC_FULL §9).

pub mod arranger;
pub mod daw;
pub mod drummer;
pub mod jsfx;
pub mod mix;

pub use arranger::ArrangerAgent;
pub use daw::DawAgent;
pub use drummer::DrummerAgent;
pub use jsfx::JsfxAgent;
pub use mix::MixAgent;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::provider::LlmProvider;
use crate::types::{Action, AgentName, ReasoningEffort, ToolUsage, Usage, Utterance};

/// Common result shape for the three action-producing agents the
/// orchestrator fans out to (SPEC_FULL §4.5). JSFX and Mix have their own
/// bespoke entry points (SPEC_FULL §6) and are not `ActionAgent`s.
#[derive(Debug, Clone, Default)]
pub struct AgentRunResult {
    pub actions: Vec<Action>,
    pub usage: Usage,
    pub tool_usage: ToolUsage,
}

/// An agent the orchestrator can fan out to: DAW, Arranger, Drummer.
#[async_trait]
pub trait ActionAgent: Send + Sync {
    fn name(&self) -> AgentName;
    fn scope(&self) -> &'static str;
    fn reasoning_default(&self) -> ReasoningEffort;

    /// Assemble prompt, bind grammar, call the provider once, parse the
    /// returned DSL. Never calls the LLM more than once per request
    /// (SPEC_FULL §4.4 steps 1-5).
    async fn run(
        &self,
        utterance: &Utterance,
        provider: &dyn LlmProvider,
        tool_server_url: Option<&str>,
    ) -> Result<AgentRunResult, CoreError>;
}

/// Build the input messages shared by every DSL agent: the state snapshot
/// (if any) as a developer message, then the user utterance (SPEC_FULL
/// §4.4 step 2).
pub(crate) fn build_input_messages(utterance: &Utterance) -> Vec<crate::provider::InputMessage> {
    let mut messages = Vec::new();
    if let Some(state) = &utterance.state {
        messages.push(crate::provider::InputMessage::developer(format!(
            "Current editor state:\n{state}"
        )));
    }
    messages.push(crate::provider::InputMessage::user(&utterance.question));
    messages
}
