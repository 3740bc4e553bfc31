//! Typed stream events shared by the provider transport, the orchestrator,
//! and the SSE surface (SPEC_FULL §4.1/§6).

use std::pin::Pin;

use futures::Stream;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::{Action, NoteEvent, ToolUsage, Usage};

/// Events emitted by a single provider call (SPEC_FULL §4.1).
#[derive(Debug, Clone)]
pub enum ProviderStreamEvent {
    Started,
    TextDelta { chunk: String },
    ToolCallDelta { chunk: String },
    Heartbeat { events_received: u64, elapsed_s: f64 },
    Completed { usage: Usage, tool_usage: ToolUsage },
    Failed { reason: String },
}

pub type ProviderStream = Pin<Box<dyn Stream<Item = Result<ProviderStreamEvent, CoreError>> + Send>>;

/// Events emitted on the DAW-chat streaming endpoint (SPEC_FULL §6).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DawStreamEvent {
    Started,
    Action { action: Action },
    Error { message: String },
    Done { actions: Vec<Action> },
}

pub type DawStream = Pin<Box<dyn Stream<Item = DawStreamEvent> + Send>>;

/// Events emitted on the composition streaming endpoint (SPEC_FULL §6).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompositionStreamEvent {
    Progress { stage: String },
    McpEnabled { enabled: bool },
    Heartbeat { events_received: u64, elapsed_s: f64 },
    Result { choices: Vec<CompositionChoice> },
    Complete,
    Done,
    Error { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CompositionChoice {
    pub description: String,
    pub notes: Vec<NoteEvent>,
}

pub type CompositionStream = Pin<Box<dyn Stream<Item = CompositionStreamEvent> + Send>>;
