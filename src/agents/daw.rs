//! The DAW agent: REAPER-track control (SPEC_FULL §4.4).

use async_trait::async_trait;

use super::{ActionAgent, AgentRunResult, build_input_messages};
use crate::error::CoreError;
use crate::grammar::GrammarBinding;
use crate::parsers::daw as daw_parser;
use crate::provider::{GenerateRequest, LlmProvider, OutputBinding};
use crate::types::{Action, AgentName, ReasoningEffort, Utterance};

const SCOPE: &str = "\
You control tracks in a digital audio workstation: creating, deleting, and \
renaming tracks; setting volume, pan, mute, and solo; creating clips and \
adding MIDI or FX to them. You do NOT write melodic or harmonic content \
yourself (that's the Arranger's job) and you do NOT write drum patterns \
(that's the Drummer's job) — when the user's request needs those, assume \
another agent is handling it and only emit the track-lifecycle operations \
that are actually yours. If the utterance has nothing for you to do, return \
no statements at all.";

pub struct DawAgent;

#[async_trait]
impl ActionAgent for DawAgent {
    fn name(&self) -> AgentName {
        AgentName::Daw
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
        let binding = GrammarBinding::daw();
        let system_prompt = format!(
            "{SCOPE}\n\nEmit your response as a single call to the `{}` tool, whose \
input must be valid DAW DSL per this grammar:\n\n{}",
            binding.tool_name, binding.grammar_text
        );

        let req = GenerateRequest::new("daw-agent-model", system_prompt)
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
            daw_parser::parse(&dsl).map_err(|reason| CoreError::AgentParseError {
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
