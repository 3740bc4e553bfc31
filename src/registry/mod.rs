//! Process-wide agent registry (SPEC_FULL §4.4/§9 "Agents as values, not
//! subclasses. ... Registry is a mapping from name to record").
//!
//! The three orchestrator-facing agents (DAW, Arranger, Drummer) are held
//! as `Arc<dyn ActionAgent>` trait objects, constructed once and shared
//! read-only across every request. JSFX and Mix are looked up by name for
//! metadata/introspection only — their bespoke entry points hold their own
//! instances directly (SPEC_FULL §4.4.1, §6).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::agents::{ActionAgent, ArrangerAgent, DawAgent, DrummerAgent, JsfxAgent, MixAgent};
use crate::types::{AgentName, ReasoningEffort};

/// Static metadata for every defined agent, independent of which ones
/// participate in orchestrator fan-out.
#[derive(Debug, Clone, Copy)]
pub struct AgentMetadata {
    pub name: AgentName,
    pub scope: &'static str,
    pub reasoning_default: ReasoningEffort,
}

pub struct AgentRegistry {
    action_agents: HashMap<AgentName, Arc<dyn ActionAgent>>,
    metadata: HashMap<AgentName, AgentMetadata>,
}

impl AgentRegistry {
    fn build() -> Self {
        let daw = Arc::new(DawAgent);
        let arranger = Arc::new(ArrangerAgent);
        let drummer = Arc::new(DrummerAgent);
        let jsfx = JsfxAgent;
        let mix = MixAgent;

        let mut metadata = HashMap::new();
        metadata.insert(
            AgentName::Daw,
            AgentMetadata {
                name: daw.name(),
                scope: daw.scope(),
                reasoning_default: daw.reasoning_default(),
            },
        );
        metadata.insert(
            AgentName::Arranger,
            AgentMetadata {
                name: arranger.name(),
                scope: arranger.scope(),
                reasoning_default: arranger.reasoning_default(),
            },
        );
        metadata.insert(
            AgentName::Drummer,
            AgentMetadata {
                name: drummer.name(),
                scope: drummer.scope(),
                reasoning_default: drummer.reasoning_default(),
            },
        );
        metadata.insert(
            AgentName::Jsfx,
            AgentMetadata {
                name: jsfx.name(),
                scope: jsfx.scope(),
                reasoning_default: jsfx.reasoning_default(),
            },
        );
        metadata.insert(
            AgentName::Mix,
            AgentMetadata {
                name: mix.name(),
                scope: mix.scope(),
                reasoning_default: ReasoningEffort::Low,
            },
        );

        let mut action_agents: HashMap<AgentName, Arc<dyn ActionAgent>> = HashMap::new();
        action_agents.insert(AgentName::Daw, daw);
        action_agents.insert(AgentName::Arranger, arranger);
        action_agents.insert(AgentName::Drummer, drummer);

        Self {
            action_agents,
            metadata,
        }
    }

    pub fn action_agent(&self, name: AgentName) -> Option<Arc<dyn ActionAgent>> {
        self.action_agents.get(&name).cloned()
    }

    pub fn metadata(&self, name: AgentName) -> Option<AgentMetadata> {
        self.metadata.get(&name).copied()
    }
}

static REGISTRY: OnceLock<AgentRegistry> = OnceLock::new();

pub fn global_registry() -> &'static AgentRegistry {
    REGISTRY.get_or_init(AgentRegistry::build)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_three_fan_out_agents_are_registered() {
        let registry = global_registry();
        assert!(registry.action_agent(AgentName::Daw).is_some());
        assert!(registry.action_agent(AgentName::Arranger).is_some());
        assert!(registry.action_agent(AgentName::Drummer).is_some());
    }

    #[test]
    fn jsfx_and_mix_have_metadata_but_no_action_agent() {
        let registry = global_registry();
        assert!(registry.metadata(AgentName::Jsfx).is_some());
        assert!(registry.action_agent(AgentName::Jsfx).is_none());
    }
}
