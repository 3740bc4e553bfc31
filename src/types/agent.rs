//! Agent identity and the reasoning-effort closed set.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentName {
    Daw,
    Arranger,
    Drummer,
    Jsfx,
    Mix,
}

impl AgentName {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentName::Daw => "daw",
            AgentName::Arranger => "arranger",
            AgentName::Drummer => "drummer",
            AgentName::Jsfx => "jsfx",
            AgentName::Mix => "mix",
        }
    }
}

/// Closed set from SPEC_FULL §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningEffort {
    None,
    Minimal,
    Low,
    Medium,
    High,
    Xhigh,
}

/// Caller-facing accuracy presets mapped onto `ReasoningEffort` per
/// SPEC_FULL §4.1 "fast / balanced / deep / max map to none / low / medium
/// / xhigh".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    Fast,
    Balanced,
    Deep,
    Max,
}

impl Accuracy {
    pub fn to_reasoning(self) -> ReasoningEffort {
        match self {
            Accuracy::Fast => ReasoningEffort::None,
            Accuracy::Balanced => ReasoningEffort::Low,
            Accuracy::Deep => ReasoningEffort::Medium,
            Accuracy::Max => ReasoningEffort::Xhigh,
        }
    }
}
