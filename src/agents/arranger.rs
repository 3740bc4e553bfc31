//! The Arranger agent: melodic/harmonic content (SPEC_FULL §4.4).

use async_trait::async_trait;

use super::{ActionAgent, AgentRunResult, build_input_messages};
use crate::error::CoreError;
use crate::grammar::GrammarBinding;
use crate::parsers::arranger as arranger_parser;
use crate::provider::{GenerateRequest, LlmProvider, OutputBinding};
use crate::types::{Action, AgentName, ReasoningEffort, Utterance};

const SCOPE: &str = "\
You write melodic and harmonic content: arpeggios, chords, chord \
progressions, and single notes. You do NOT create or modify tracks \
(that's the DAW agent's job) and you do NOT write drum patterns (that's \
the Drummer's job). You attach content to whatever track is currently \
selected — you never need to name or create a track yourself. If the \
utterance mentions a musical term only as a track name (e.g. \"the \
bassline track\"), that is not a request for melodic content; return no \
statements.";

pub struct ArrangerAgent;

#[async_trait]
impl ActionAgent for ArrangerAgent {
    fn name(&self) -> AgentName {
        AgentName::Arranger
    }

    fn scope(&self) -> &'static str {
        SCOPE
    }

    fn reasoning_default(&self) -> ReasoningEffort {
        ReasoningEffort::Low
    }

    async fn run(
        &self,
        utterance: &Utterance,
        provider: &dyn LlmProvider,
        tool_server_url: Option<&str>,
    ) -> Result<AgentRunResult, CoreError> {
        let binding = GrammarBinding::arranger();
        let system_prompt = format!(
            "{SCOPE}\n\nEmit your response as a single call to the `{}` tool, whose \
input must be valid Arranger DSL per this grammar:\n\n{}",
            binding.tool_name, binding.grammar_text
        );

        let req = GenerateRequest::new("arranger-agent-model", system_prompt)
            .with_input(build_input_messages(utterance))
            .with_reasoning(self.reasoning_default())
            .with_tool_server(tool_server_url.map(str::to_string))
            .with_output(OutputBinding::Cfg(binding));

        let response = provider.generate(req).await.map_err(|e| match e {
            CoreError::AgentGrammarViolation { reason, .. } => CoreError::AgentGrammarViolation {
                agent: self.name().as_str().to_string(),
                reason,
            },
            other => other,
        })?;

        let dsl = response.raw_output.unwrap_or_default();
        let actions: Vec<Action> = if dsl.trim().is_empty() {
            Vec::new()
        } else {
            arranger_parser::parse(&dsl).map_err(|reason| CoreError::AgentParseError {
                agent: self.name().as_str().to_string(),
                reason,
            })?
        };

        Ok(AgentRunResult {
            actions,
            usage: response.usage,
            tool_usage: response.tool_usage,
        })
    }
}
