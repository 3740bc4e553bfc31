//! End-to-end orchestrator scenarios: classify -> fan out -> merge, driven
//! through the public `Orchestrator` API against a stub `LlmProvider`. No
//! network involved; mirrors the teacher's in-process stream/client tests
//! but exercises this crate's classify/fan-out/merge pipeline instead.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use daw_copilot_core::config::AppConfig;
use daw_copilot_core::error::CoreError;
use daw_copilot_core::orchestrator::Orchestrator;
use daw_copilot_core::provider::{GenerateRequest, GenerateResponse, LlmProvider, OutputBinding};
use daw_copilot_core::stream::ProviderStream;
use daw_copilot_core::types::{ActionKind, Usage, Utterance};
use daw_copilot_core::utils::cancel::CancelHandle;

/// Routes each `GenerateRequest` to a canned response keyed by its output
/// binding: the classifier's JSON schema by name, or a DSL agent's grammar
/// tool name. A request shape this provider doesn't recognize panics, so a
/// test failure points straight at the mismatch.
struct StubProvider {
    classification: Value,
    daw_dsl: Option<String>,
    arranger_dsl: Option<String>,
    drummer_dsl: Option<String>,
}

impl StubProvider {
    fn new(classification: Value) -> Self {
        Self {
            classification,
            daw_dsl: None,
            arranger_dsl: None,
            drummer_dsl: None,
        }
    }

    fn with_daw(mut self, dsl: &str) -> Self {
        self.daw_dsl = Some(dsl.to_string());
        self
    }

    fn with_arranger(mut self, dsl: &str) -> Self {
        self.arranger_dsl = Some(dsl.to_string());
        self
    }

    fn with_drummer(mut self, dsl: &str) -> Self {
        self.drummer_dsl = Some(dsl.to_string());
        self
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    async fn generate(&self, req: GenerateRequest) -> Result<GenerateResponse, CoreError> {
        match &req.output {
            OutputBinding::JsonSchema { name, .. } if name == "classification" => {
                Ok(GenerateResponse::structured(self.classification.clone(), Usage::default()))
            }
            OutputBinding::JsonSchema { name, .. } => {
                panic!("unexpected json-schema request '{name}' in fan-out test")
            }
            OutputBinding::Cfg(binding) => {
                let dsl = match binding.tool_name {
                    "daw_dsl" => self.daw_dsl.clone(),
                    "arranger_dsl" => self.arranger_dsl.clone(),
                    "drummer_dsl" => self.drummer_dsl.clone(),
                    other => panic!("unexpected grammar tool '{other}'"),
                };
                Ok(GenerateResponse::text(dsl.unwrap_or_default(), Usage::default()))
            }
            OutputBinding::Text => panic!("orchestrator fan-out never requests plain text"),
        }
    }

    async fn generate_stream(
        &self,
        _req: GenerateRequest,
        _cancel: CancelHandle,
    ) -> Result<ProviderStream, CoreError> {
        unimplemented!("streaming is exercised separately")
    }
}

fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        llm_api_key: secrecy::SecretString::from("test-key".to_string()),
        llm_base_url: "http://localhost".to_string(),
        tool_server_url: None,
        telemetry_dsn: None,
        auth_mode: daw_copilot_core::config::AuthMode::None,
        classification_timeout: Duration::from_secs(3),
        orchestrator_timeout: Duration::from_secs(10),
        agent_timeout: Duration::from_secs(10),
        reasoning_allow_list: Vec::new(),
    })
}

fn utterance(question: &str) -> Utterance {
    Utterance {
        question: question.to_string(),
        state: None,
    }
}

#[tokio::test]
async fn daw_only_pan_request_produces_a_single_set_pan_action() {
    let provider = StubProvider::new(json!({
        "needs_daw": true, "needs_arranger": false, "needs_drummer": false
    }))
    .with_daw(r#"track(name="bassline").set_pan(pan=-0.5)"#);

    let orchestrator = Orchestrator::new(Arc::new(provider), test_config());
    let result = orchestrator
        .run_unary(utterance("pan the bassline track left"))
        .await
        .unwrap();

    assert_eq!(result.actions.len(), 1);
    assert_eq!(result.actions[0].kind, ActionKind::SetPan);
    assert_eq!(result.actions[0].attr_f64("pan"), Some(-0.5));
}

#[tokio::test]
async fn rename_with_musical_track_name_stays_daw_only() {
    // "bassline" and "drums" are musical terms used only as track names; the
    // classifier must not pull in arranger/drummer for this.
    let provider = StubProvider::new(json!({
        "needs_daw": true, "needs_arranger": false, "needs_drummer": false
    }))
    .with_daw(r#"track(name="drums").set_name(name="percussion")"#);

    let orchestrator = Orchestrator::new(Arc::new(provider), test_config());
    let result = orchestrator
        .run_unary(utterance("rename the drums track to percussion"))
        .await
        .unwrap();

    assert_eq!(result.actions.len(), 1);
    assert_eq!(result.actions[0].kind, ActionKind::SetName);
}

#[tokio::test]
async fn chord_progression_request_fans_out_to_arranger_only() {
    let provider = StubProvider::new(json!({
        "needs_daw": true, "needs_arranger": true, "needs_drummer": false
    }))
    .with_daw("")
    .with_arranger("progression(chords=[C, Am, F, G], length=16)");

    let orchestrator = Orchestrator::new(Arc::new(provider), test_config());
    let result = orchestrator
        .run_unary(utterance("give me a C Am F G progression"))
        .await
        .unwrap();

    assert_eq!(result.actions.len(), 1);
    assert_eq!(result.actions[0].kind, ActionKind::AddMidi);
}

#[tokio::test]
async fn arpeggio_request_yields_exactly_sixteen_notes() {
    let provider = StubProvider::new(json!({
        "needs_daw": true, "needs_arranger": true, "needs_drummer": false
    }))
    .with_daw("")
    .with_arranger("arpeggio(symbol=Em, length=4)");

    let orchestrator = Orchestrator::new(Arc::new(provider), test_config());
    let result = orchestrator
        .run_unary(utterance("arpeggiate an Em chord over four beats"))
        .await
        .unwrap();

    assert_eq!(result.actions.len(), 1);
    let notes = result.actions[0].attrs.get("notes").and_then(Value::as_array).unwrap();
    assert_eq!(notes.len(), 16);
}

#[tokio::test]
async fn drum_pattern_request_fans_out_to_drummer_only() {
    let provider = StubProvider::new(json!({
        "needs_daw": true, "needs_arranger": false, "needs_drummer": true
    }))
    .with_daw("")
    .with_drummer(r#"pattern(drum=kick, grid="x---x---x---x---")"#);

    let orchestrator = Orchestrator::new(Arc::new(provider), test_config());
    let result = orchestrator
        .run_unary(utterance("give me a four on the floor kick pattern"))
        .await
        .unwrap();

    assert_eq!(result.actions.len(), 1);
    assert_eq!(result.actions[0].kind, ActionKind::DrumPattern);
    assert_eq!(result.actions[0].attr_str("drum"), Some("kick"));
}

#[tokio::test]
async fn out_of_scope_utterance_is_rejected_before_any_fan_out() {
    let provider = StubProvider::new(json!({
        "needs_daw": false, "needs_arranger": false, "needs_drummer": false
    }));

    let orchestrator = Orchestrator::new(Arc::new(provider), test_config());
    let result = orchestrator.run_unary(utterance("what's the weather like today")).await;

    assert!(matches!(result, Err(CoreError::ClassificationOutOfScope(_))));
}

#[tokio::test]
async fn daw_and_arranger_results_merge_in_fixed_priority_order() {
    let provider = StubProvider::new(json!({
        "needs_daw": true, "needs_arranger": true, "needs_drummer": false
    }))
    .with_daw(r#"track(id=1).set_mute(mute=true)"#)
    .with_arranger(r#"note(pitch="E1", duration=4)"#);

    let orchestrator = Orchestrator::new(Arc::new(provider), test_config());
    let result = orchestrator
        .run_unary(utterance("mute track 1 and add an E1 note"))
        .await
        .unwrap();

    assert_eq!(result.actions.len(), 2);
    assert_eq!(result.actions[0].kind, ActionKind::SetMute);
    assert_eq!(result.actions[1].kind, ActionKind::AddMidi);
}

/// A provider whose DAW agent call always fails; the orchestrator must still
/// surface the other agents' results alongside a single `error` Action
/// rather than failing the whole request (SPEC_FULL §4.5/§7).
struct PartiallyFailingProvider {
    classification: Value,
}

#[async_trait]
impl LlmProvider for PartiallyFailingProvider {
    async fn generate(&self, req: GenerateRequest) -> Result<GenerateResponse, CoreError> {
        match &req.output {
            OutputBinding::JsonSchema { name, .. } if name == "classification" => {
                Ok(GenerateResponse::structured(self.classification.clone(), Usage::default()))
            }
            OutputBinding::Cfg(binding) if binding.tool_name == "daw_dsl" => {
                Err(CoreError::ProviderTransport("connection reset".to_string()))
            }
            OutputBinding::Cfg(binding) if binding.tool_name == "drummer_dsl" => Ok(
                GenerateResponse::text(r#"pattern(drum=snare, grid="x---")"#, Usage::default()),
            ),
            other => panic!("unexpected request in partial-failure test: {other:?}"),
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

#[tokio::test]
async fn one_agent_failing_does_not_fail_the_whole_request() {
    let provider = PartiallyFailingProvider {
        classification: json!({
            "needs_daw": true, "needs_arranger": false, "needs_drummer": true
        }),
    };

    let orchestrator = Orchestrator::new(Arc::new(provider), test_config());
    let result = orchestrator
        .run_unary(utterance("mute the drums and add a snare pattern"))
        .await
        .unwrap();

    assert_eq!(result.actions.len(), 2);
    assert_eq!(result.actions[0].kind, ActionKind::Error);
    assert_eq!(result.actions[1].kind, ActionKind::DrumPattern);
}
