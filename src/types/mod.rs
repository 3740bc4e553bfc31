//! Closed-vocabulary wire types shared by every agent and the transport.

mod action;
mod agent;
mod note;
mod utterance;

pub use action::{Action, ActionKind, TrackSelector, validate_action_ranges};
pub use agent::{Accuracy, AgentName, ReasoningEffort};
pub use note::{DrumPattern, NoteEvent};
pub use utterance::{Classification, Utterance};

use serde::{Deserialize, Serialize};

/// Token usage reported by a provider call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn merge(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// Summary of MCP tool usage for one provider call, per SPEC_FULL §4.6.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolUsage {
    pub used: bool,
    pub call_count: u32,
    pub tool_names: Vec<String>,
}

impl ToolUsage {
    pub fn merge(&mut self, other: &ToolUsage) {
        if other.used {
            self.used = true;
        }
        self.call_count += other.call_count;
        for name in &other.tool_names {
            if !self.tool_names.contains(name) {
                self.tool_names.push(name.clone());
            }
        }
    }
}
