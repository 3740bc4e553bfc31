//! Orchestrator: the single entry point for the natural-language DAW path
//! (SPEC_FULL §4.5). Classify → fan out → merge → emit.

pub mod classifier;
pub mod merge;

use std::sync::Arc;
use std::time::Duration;

use futures::stream::FuturesUnordered;
use futures::StreamExt;

use crate::agents::{ActionAgent, AgentRunResult};
use crate::config::AppConfig;
use crate::error::CoreError;
use crate::provider::LlmProvider;
use crate::registry::global_registry;
use crate::stream::{DawStream, DawStreamEvent};
use crate::telemetry::RequestSpan;
use crate::types::{Action, AgentName, Classification, Usage, Utterance};
use crate::utils::cancel::CancelHandle;

pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    config: Arc<AppConfig>,
}

pub struct OrchestratorResult {
    pub actions: Vec<Action>,
    pub classification: Classification,
    pub usage: Usage,
}

struct AgentOutcome {
    name: AgentName,
    actions: Vec<Action>,
    usage: Usage,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: Arc<AppConfig>) -> Self {
        Self { provider, config }
    }

    async fn classify(&self, utterance: &Utterance) -> Result<Classification, CoreError> {
        let classification = classifier::classify(
            utterance,
            self.provider.as_ref(),
            self.config.classification_timeout,
        )
        .await?;
        if classification.is_out_of_scope() {
            return Err(CoreError::ClassificationOutOfScope(utterance.question.clone()));
        }
        Ok(classification)
    }

    /// Spawn one task per selected agent. Each agent's own provider error is
    /// recorded as a single `error` Action rather than failing the whole
    /// request (SPEC_FULL §4.5 "Tie-breaking and edge cases", §7).
    fn spawn_selected(
        &self,
        classification: Classification,
        utterance: &Utterance,
    ) -> Vec<tokio::task::JoinHandle<AgentOutcome>> {
        let registry = global_registry();
        let selections = [
            (classification.needs_daw, AgentName::Daw),
            (classification.needs_arranger, AgentName::Arranger),
            (classification.needs_drummer, AgentName::Drummer),
        ];

        selections
            .into_iter()
            .filter(|(needed, _)| *needed)
            .filter_map(|(_, name)| registry.action_agent(name).map(|agent| (name, agent)))
            .map(|(name, agent)| {
                let provider = Arc::clone(&self.provider);
                let utterance = utterance.clone();
                let tool_server_url = self.config.tool_server_url.clone();
                let timeout = self.config.agent_timeout;
                tokio::spawn(async move {
                    run_one(agent, name, utterance, provider, tool_server_url, timeout).await
                })
            })
            .collect()
    }

    pub async fn run_unary(&self, utterance: Utterance) -> Result<OrchestratorResult, CoreError> {
        let _span = RequestSpan::new_request();
        let classification = self.classify(&utterance).await?;

        let deadline = self.config.orchestrator_timeout;
        let handles = self.spawn_selected(classification, &utterance);

        let mut buckets: std::collections::HashMap<AgentName, Vec<Action>> =
            std::collections::HashMap::new();
        let mut usage = Usage::default();

        let joined = tokio::time::timeout(deadline, futures::future::join_all(handles))
            .await
            .map_err(|_| CoreError::ProviderDeadline {
                elapsed_ms: deadline.as_millis() as u64,
            })?;

        for result in joined {
            let outcome = result.map_err(|e| CoreError::Internal(format!("agent task panicked: {e}")))?;
            usage.merge(&outcome.usage);
            buckets.insert(outcome.name, outcome.actions);
        }

        let daw = buckets.remove(&AgentName::Daw).unwrap_or_default();
        let arranger = buckets.remove(&AgentName::Arranger).unwrap_or_default();
        let drummer = buckets.remove(&AgentName::Drummer).unwrap_or_default();
        let actions = merge::merge(daw, arranger, drummer);

        Ok(OrchestratorResult {
            actions,
            classification,
            usage,
        })
    }

    /// Streaming mode: each Action is pushed as soon as its producing
    /// agent completes parsing (SPEC_FULL §4.5 step 4). The terminal `done`
    /// event carries the full list in the fixed DAW → Arranger → Drummer
    /// priority order, matching unary mode.
    pub fn run_streaming(&self, utterance: Utterance, cancel: CancelHandle) -> DawStream {
        let provider = Arc::clone(&self.provider);
        let config = Arc::clone(&self.config);

        let s = async_stream::stream! {
            yield DawStreamEvent::Started;

            let classification = match classifier::classify(
                &utterance,
                provider.as_ref(),
                config.classification_timeout,
            )
            .await
            {
                Ok(c) if !c.is_out_of_scope() => c,
                Ok(_) => {
                    yield DawStreamEvent::Error {
                        message: CoreError::ClassificationOutOfScope(utterance.question.clone())
                            .user_message(),
                    };
                    return;
                }
                Err(e) => {
                    yield DawStreamEvent::Error { message: e.user_message() };
                    return;
                }
            };

            let orchestrator = Orchestrator::new(Arc::clone(&provider), Arc::clone(&config));
            let handles = orchestrator.spawn_selected(classification, &utterance);
            let mut futs: FuturesUnordered<_> = handles.into_iter().collect();

            let mut buckets: std::collections::HashMap<AgentName, Vec<Action>> =
                std::collections::HashMap::new();

            while let Some(joined) = futs.next().await {
                if cancel.is_cancelled() {
                    futs.iter().for_each(|handle| handle.abort());
                    yield DawStreamEvent::Error { message: "request cancelled".to_string() };
                    return;
                }
                match joined {
                    Ok(outcome) => {
                        for action in &outcome.actions {
                            yield DawStreamEvent::Action { action: action.clone() };
                        }
                        buckets.insert(outcome.name, outcome.actions);
                    }
                    Err(e) => {
                        yield DawStreamEvent::Error {
                            message: format!("agent task panicked: {e}"),
                        };
                    }
                }
            }

            let daw = buckets.remove(&AgentName::Daw).unwrap_or_default();
            let arranger = buckets.remove(&AgentName::Arranger).unwrap_or_default();
            let drummer = buckets.remove(&AgentName::Drummer).unwrap_or_default();
            let merged = merge::merge(daw, arranger, drummer);
            yield DawStreamEvent::Done { actions: merged };
        };

        Box::pin(s)
    }
}

async fn run_one(
    agent: Arc<dyn ActionAgent>,
    name: AgentName,
    utterance: Utterance,
    provider: Arc<dyn LlmProvider>,
    tool_server_url: Option<String>,
    timeout: Duration,
) -> AgentOutcome {
    let run = agent.run(&utterance, provider.as_ref(), tool_server_url.as_deref());
    let outcome: Result<AgentRunResult, CoreError> = match tokio::time::timeout(timeout, run).await
    {
        Ok(result) => result,
        Err(_) => Err(CoreError::ProviderDeadline {
            elapsed_ms: timeout.as_millis() as u64,
        }),
    };

    match outcome {
        Ok(result) => AgentOutcome {
            name,
            actions: result.actions,
            usage: result.usage,
        },
        Err(e) => AgentOutcome {
            name,
            actions: vec![Action::error(e.user_message())],
            usage: Usage::default(),
        },
    }
}
