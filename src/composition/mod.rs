//! The two-stage composition pipeline (SPEC_FULL §4.7): harmonic
//! enrichment, then rhythmic placement, producing `NoteEvent`s.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::CoreError;
use crate::provider::{
    GenerateRequest, GenerateResponse, InputMessage, LlmProvider, OutputBinding, WALL_CLOCK_INTERVAL,
};
use crate::stream::{CompositionChoice, CompositionStream, CompositionStreamEvent};
use crate::types::{NoteEvent, ReasoningEffort, Usage};
use crate::utils::schema::validate_json;

const MUSICAL_KNOWLEDGE_PROMPT: &str = "\
You are a composition assistant with full music-theory knowledge: scales, \
chord voicings, counterpoint, rhythm, and arrangement conventions across \
genres. You compose by reasoning about the harmonic and rhythmic context \
the caller supplies.";

const STAGE1_ADDENDUM: &str =
    "\n\nstage 1: harmonic. Think through the harmonic implications of the \
request and, if a tool server is available, use it to explore voicings or \
scales. Your output here is not consumed directly — it primes your \
internal state for stage 2.";

const STAGE2_ADDENDUM: &str =
    "\n\nstage 2: rhythmic. Now place the harmonic content you arrived at \
into concrete timed note events. Respond with one or more choices, each a \
complete, independently playable option.";

#[derive(Debug, Clone, Deserialize)]
struct Stage2Choice {
    description: String,
    notes: Vec<NoteEvent>,
}

#[derive(Debug, Clone, Deserialize)]
struct Stage2Output {
    #[serde(default)]
    choices: Vec<Stage2Choice>,
}

fn stage2_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "choices": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "description": { "type": "string" },
                        "notes": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "midi_note_number": { "type": "integer" },
                                    "velocity": { "type": "integer" },
                                    "start_beats": { "type": "number" },
                                    "duration_beats": { "type": "number" }
                                },
                                "required": ["midi_note_number", "velocity", "start_beats", "duration_beats"]
                            }
                        }
                    },
                    "required": ["description", "notes"]
                }
            }
        },
        "required": ["choices"]
    })
}

pub struct CompositionRequest {
    pub model: String,
    pub input_messages: Vec<InputMessage>,
    pub reasoning_level: Option<ReasoningEffort>,
    pub tool_server_url: Option<String>,
}

pub struct CompositionResult {
    pub choices: Vec<CompositionChoice>,
    pub usage: Usage,
    pub mcp_used: bool,
    pub mcp_calls: u32,
    pub mcp_tools: Vec<String>,
}

fn stage1_request(req: &CompositionRequest) -> GenerateRequest {
    GenerateRequest::new(&req.model, format!("{MUSICAL_KNOWLEDGE_PROMPT}{STAGE1_ADDENDUM}"))
        .with_input(req.input_messages.clone())
        .with_reasoning(ReasoningEffort::Medium)
        .with_tool_server(req.tool_server_url.clone())
        .with_output(OutputBinding::Text)
}

fn stage2_request(req: CompositionRequest, reasoning: ReasoningEffort) -> GenerateRequest {
    GenerateRequest::new(&req.model, format!("{MUSICAL_KNOWLEDGE_PROMPT}{STAGE2_ADDENDUM}"))
        .with_input(req.input_messages)
        .with_reasoning(reasoning)
        .with_tool_server(req.tool_server_url)
        .with_output(OutputBinding::JsonSchema {
            name: "composition_choices".to_string(),
            schema: stage2_schema(),
        })
}

/// Parse and validate stage 2's structured output into the final result.
/// Every note is checked against the SPEC_FULL §8 `NoteEvent` invariants —
/// an out-of-range note is a stage error, never silently dropped or
/// clamped, per §7 "Stage errors in the composition pipeline are never
/// masked".
fn finalize(
    stage1_response: GenerateResponse,
    stage2_response: GenerateResponse,
) -> Result<CompositionResult, CoreError> {
    let structured = stage2_response
        .structured_output
        .ok_or(CoreError::Stage2NoChoices)?;
    validate_json(&stage2_schema(), &structured, "composition").map_err(|_| CoreError::Stage2NoChoices)?;
    let parsed: Stage2Output =
        serde_json::from_value(structured).map_err(|_| CoreError::Stage2NoChoices)?;
    if parsed.choices.is_empty() {
        return Err(CoreError::Stage2NoChoices);
    }

    let choices = parsed
        .choices
        .into_iter()
        .map(|c| {
            if let Some(note) = c.notes.iter().find(|n| !n.is_valid()) {
                return Err(CoreError::AgentParseError {
                    agent: "composition".to_string(),
                    reason: format!("stage 2 produced an out-of-range note event: {note:?}"),
                });
            }
            Ok(CompositionChoice {
                description: c.description,
                notes: c.notes,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut usage = stage1_response.usage;
    usage.merge(&stage2_response.usage);
    let mut tool_usage = stage1_response.tool_usage;
    tool_usage.merge(&stage2_response.tool_usage);

    Ok(CompositionResult {
        choices,
        usage,
        mcp_used: tool_usage.used,
        mcp_calls: tool_usage.call_count,
        mcp_tools: tool_usage.tool_names,
    })
}

/// Run both stages sequentially. Stage 1 is never skipped, even if the
/// caller supplied pre-enriched context (SPEC_FULL §9, Open Question (c)).
pub async fn run(
    req: CompositionRequest,
    provider: &dyn LlmProvider,
) -> Result<CompositionResult, CoreError> {
    let reasoning = req.reasoning_level.unwrap_or(ReasoningEffort::Medium);

    // Stage 1: harmonic enrichment. Parse errors here are explicitly
    // non-fatal (SPEC_FULL §4.7) — only the call itself may fail.
    let stage1_response = provider.generate(stage1_request(&req)).await?;

    // Stage 2: rhythmic placement, JSON-schema bound.
    let stage2_response = provider.generate(stage2_request(req, reasoning)).await?;

    finalize(stage1_response, stage2_response)
}

/// Streaming variant: emits `progress`/`mcp_enabled` around each stage,
/// `heartbeat` on a wall-clock timer while a stage call is outstanding
/// (SPEC_FULL §4.1/§9 "Dual heartbeat sources" — composition has no
/// per-event source of its own, so the wall clock is the only source
/// here), `result` once stage 2 parses, then `complete`/`done`
/// (SPEC_FULL §6).
pub fn run_streaming(req: CompositionRequest, provider: Arc<dyn LlmProvider>) -> CompositionStream {
    let s = async_stream::stream! {
        yield CompositionStreamEvent::McpEnabled { enabled: req.tool_server_url.is_some() };
        let reasoning = req.reasoning_level.unwrap_or(ReasoningEffort::Medium);
        let start = std::time::Instant::now();
        let mut ticks: u64 = 0;

        yield CompositionStreamEvent::Progress { stage: "harmonic".to_string() };
        let stage1_fut = provider.generate(stage1_request(&req));
        futures::pin_mut!(stage1_fut);
        let mut ticker = tokio::time::interval(WALL_CLOCK_INTERVAL);
        ticker.tick().await;
        let stage1_response = loop {
            tokio::select! {
                result = &mut stage1_fut => {
                    match result {
                        Ok(r) => break r,
                        Err(e) => {
                            yield CompositionStreamEvent::Error { message: e.user_message() };
                            return;
                        }
                    }
                }
                _ = ticker.tick() => {
                    ticks += 1;
                    yield CompositionStreamEvent::Heartbeat { events_received: ticks, elapsed_s: start.elapsed().as_secs_f64() };
                }
            }
        };

        yield CompositionStreamEvent::Progress { stage: "rhythmic".to_string() };
        let stage2_fut = provider.generate(stage2_request(req, reasoning));
        futures::pin_mut!(stage2_fut);
        let mut ticker = tokio::time::interval(WALL_CLOCK_INTERVAL);
        ticker.tick().await;
        let stage2_response = loop {
            tokio::select! {
                result = &mut stage2_fut => {
                    match result {
                        Ok(r) => break r,
                        Err(e) => {
                            yield CompositionStreamEvent::Error { message: e.user_message() };
                            return;
                        }
                    }
                }
                _ = ticker.tick() => {
                    ticks += 1;
                    yield CompositionStreamEvent::Heartbeat { events_received: ticks, elapsed_s: start.elapsed().as_secs_f64() };
                }
            }
        };

        match finalize(stage1_response, stage2_response) {
            Ok(result) => {
                yield CompositionStreamEvent::Result { choices: result.choices };
                yield CompositionStreamEvent::Complete;
                yield CompositionStreamEvent::Done;
            }
            Err(e) => {
                yield CompositionStreamEvent::Error { message: e.user_message() };
            }
        }
    };
    Box::pin(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::GenerateResponse;
    use crate::stream::ProviderStream;
    use crate::utils::cancel::CancelHandle;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        call_count: AtomicUsize,
        stage2_choices: Value,
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        async fn generate(&self, req: GenerateRequest) -> Result<GenerateResponse, CoreError> {
            let call = self.call_count.fetch_add(1, Ordering::SeqCst);
            match req.output {
                OutputBinding::Text => Ok(GenerateResponse::text("warm-up text", Usage::default())),
                OutputBinding::JsonSchema { .. } => {
                    assert_eq!(call, 1, "stage 2 must run after stage 1");
                    Ok(GenerateResponse::structured(
                        self.stage2_choices.clone(),
                        Usage::default(),
                    ))
                }
                OutputBinding::Cfg(_) => panic!("composition never binds a grammar"),
            }
        }

        async fn generate_stream(
            &self,
            _req: GenerateRequest,
            _cancel: CancelHandle,
        ) -> Result<ProviderStream, CoreError> {
            unimplemented!()
        }
    }

    fn req() -> CompositionRequest {
        CompositionRequest {
            model: "composer-model".to_string(),
            input_messages: vec![InputMessage::user("a moody lo-fi progression")],
            reasoning_level: None,
            tool_server_url: None,
        }
    }

    #[tokio::test]
    async fn zero_choices_is_fatal() {
        let provider = StubProvider {
            call_count: AtomicUsize::new(0),
            stage2_choices: json!({ "choices": [] }),
        };
        let result = run(req(), &provider).await;
        assert!(matches!(result, Err(CoreError::Stage2NoChoices)));
    }

    #[tokio::test]
    async fn both_stages_always_run_in_order() {
        let provider = StubProvider {
            call_count: AtomicUsize::new(0),
            stage2_choices: json!({
                "choices": [{
                    "description": "variant A",
                    "notes": [{"midi_note_number": 60, "velocity": 100, "start_beats": 0.0, "duration_beats": 1.0}]
                }]
            }),
        };
        let result = run(req(), &provider).await.unwrap();
        assert_eq!(result.choices.len(), 1);
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 2);
    }
}
