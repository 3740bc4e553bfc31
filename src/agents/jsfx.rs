//! The JSFX agent: audio-effect code (SPEC_FULL §4.4). Its own bespoke
//! entry point (SPEC_FULL §6 "JSFX generation") — it does not participate
//! in orchestrator fan-out and never produces `Action`s.

use crate::error::CoreError;
use crate::grammar::GrammarBinding;
use crate::parsers::jsfx as jsfx_parser;
use crate::provider::{GenerateRequest, InputMessage, LlmProvider, OutputBinding};
use crate::types::{AgentName, ReasoningEffort};

const SCOPE: &str = "\
You write REAPER JSFX audio-effect code. You receive the user's request, \
the filename, and (if editing an existing effect) its current code. You \
emit a complete, valid JSFX file — never a diff or a partial snippet.";

pub struct JsfxAgent;

impl JsfxAgent {
    pub fn name(&self) -> AgentName {
        AgentName::Jsfx
    }

    pub fn scope(&self) -> &'static str {
        SCOPE
    }

    pub fn reasoning_default(&self) -> ReasoningEffort {
        ReasoningEffort::Medium
    }

    pub async fn generate(
        &self,
        message: &str,
        existing_code: &str,
        filename: &str,
        provider: &dyn LlmProvider,
    ) -> Result<String, CoreError> {
        let binding = GrammarBinding::jsfx();
        let system_prompt = format!(
            "{SCOPE}\n\nEmit your response as a single call to the `{}` tool, whose \
input must be a complete JSFX file per this grammar:\n\n{}",
            binding.tool_name, binding.grammar_text
        );

        let mut input = vec![InputMessage::developer(format!(
            "filename: {filename}\ncurrent code:\n{existing_code}"
        ))];
        input.push(InputMessage::user(message));

        let req = GenerateRequest::new("jsfx-agent-model", system_prompt)
            .with_input(input)
            .with_reasoning(self.reasoning_default())
            .with_output(OutputBinding::Cfg(binding));

        let response = provider.generate(req).await.map_err(|e| match e {
            CoreError::AgentGrammarViolation { reason, .. } => CoreError::AgentGrammarViolation {
                agent: self.name().as_str().to_string(),
                reason,
            },
            other => other,
        })?;

        let code = response.raw_output.unwrap_or_default();
        jsfx_parser::validate(&code).map_err(|reason| CoreError::AgentParseError {
            agent: self.name().as_str().to_string(),
            reason,
        })?;
        Ok(code)
    }
}
