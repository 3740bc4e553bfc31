//! Wire-agnostic request shape for the `LlmProvider` contract.

use serde::Serialize;
use serde_json::Value;

use crate::grammar::GrammarBinding;
use crate::types::ReasoningEffort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Developer,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMessage {
    pub role: Role,
    pub content: String,
}

impl InputMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn developer(content: impl Into<String>) -> Self {
        Self {
            role: Role::Developer,
            content: content.into(),
        }
    }
}

/// Exactly one of these is attached per request (SPEC_FULL §4.1).
#[derive(Debug, Clone)]
pub enum OutputBinding {
    JsonSchema { name: String, schema: Value },
    Cfg(GrammarBinding),
    Text,
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub system_prompt: String,
    pub input: Vec<InputMessage>,
    pub reasoning_effort: ReasoningEffort,
    pub tool_server_url: Option<String>,
    pub output: OutputBinding,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            input: Vec::new(),
            reasoning_effort: ReasoningEffort::None,
            tool_server_url: None,
            output: OutputBinding::Text,
        }
    }

    pub fn with_input(mut self, input: Vec<InputMessage>) -> Self {
        self.input = input;
        self
    }

    pub fn with_reasoning(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = effort;
        self
    }

    pub fn with_tool_server(mut self, url: Option<String>) -> Self {
        self.tool_server_url = url;
        self
    }

    pub fn with_output(mut self, output: OutputBinding) -> Self {
        self.output = output;
        self
    }
}
