//! Wire-agnostic response shape for the `LlmProvider` contract.

use serde_json::Value;

use crate::types::{ToolUsage, Usage};

#[derive(Debug, Clone, Default)]
pub struct GenerateResponse {
    /// The DSL/plain text, when the request used `OutputBinding::Cfg` or
    /// `OutputBinding::Text`.
    pub raw_output: Option<String>,
    /// Parsed JSON, when the request used `OutputBinding::JsonSchema`.
    pub structured_output: Option<Value>,
    pub usage: Usage,
    pub tool_usage: ToolUsage,
}

impl GenerateResponse {
    pub fn text(raw_output: impl Into<String>, usage: Usage) -> Self {
        Self {
            raw_output: Some(raw_output.into()),
            structured_output: None,
            usage,
            tool_usage: ToolUsage::default(),
        }
    }

    pub fn structured(value: Value, usage: Usage) -> Self {
        Self {
            raw_output: None,
            structured_output: Some(value),
            usage,
            tool_usage: ToolUsage::default(),
        }
    }

    pub fn with_tool_usage(mut self, tool_usage: ToolUsage) -> Self {
        self.tool_usage = tool_usage;
        self
    }
}
