//! The classifier: a small LLM call with a JSON-schema output returning
//! `{needs_daw, needs_arranger, needs_drummer}` (SPEC_FULL §4.5 step 1).

use serde_json::json;

use crate::error::CoreError;
use crate::provider::{GenerateRequest, InputMessage, LlmProvider, OutputBinding};
use crate::types::{Classification, ReasoningEffort, Utterance};
use crate::utils::schema::validate_json;

const SYSTEM_PROMPT: &str = "\
You classify a music-production utterance into the set of specialized \
agents needed to satisfy it:

- needs_daw: the request creates, deletes, renames, or adjusts tracks, \
  clips, volume, pan, mute, solo, or FX.
- needs_arranger: the request asks for melodic or harmonic content — \
  chords, progressions, arpeggios, or specific notes.
- needs_drummer: the request asks for a drum or percussion pattern.

A musical term used only as a track NAME (e.g. \"mute the track called \
bassline\", \"rename the drums track to percussion\") does not itself \
trigger needs_arranger or needs_drummer.

Requests unrelated to music production in a DAW — cooking, weather, \
general code, video editing, vague or off-topic requests, troubleshooting \
or support questions unrelated to audio — must yield every flag false.";

fn schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "needs_daw": { "type": "boolean" },
            "needs_arranger": { "type": "boolean" },
            "needs_drummer": { "type": "boolean" }
        },
        "required": ["needs_daw", "needs_arranger", "needs_drummer"]
    })
}

/// Classify one utterance, bounded by `deadline` (SPEC_FULL §4.5
/// "classification alone must complete under 3 s").
pub async fn classify(
    utterance: &Utterance,
    provider: &dyn LlmProvider,
    deadline: std::time::Duration,
) -> Result<Classification, CoreError> {
    let req = GenerateRequest::new("classifier-model", SYSTEM_PROMPT)
        .with_input(vec![InputMessage::user(&utterance.question)])
        .with_reasoning(ReasoningEffort::None)
        .with_output(OutputBinding::JsonSchema {
            name: "classification".to_string(),
            schema: schema(),
        });

    let response = tokio::time::timeout(deadline, provider.generate(req))
        .await
        .map_err(|_| CoreError::ProviderDeadline {
            elapsed_ms: deadline.as_millis() as u64,
        })??;

    let structured = response
        .structured_output
        .ok_or_else(|| CoreError::AgentParseError {
            agent: "classifier".to_string(),
            reason: "classifier returned no structured output".to_string(),
        })?;
    validate_json(&schema(), &structured, "classifier")?;

    let classification: Classification =
        serde_json::from_value(structured).map_err(|e| CoreError::AgentParseError {
            agent: "classifier".to_string(),
            reason: format!("classification did not match schema: {e}"),
        })?;

    Ok(classification.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::GenerateResponse;
    use crate::stream::ProviderStream;
    use crate::types::Usage;
    use crate::utils::cancel::CancelHandle;
    use async_trait::async_trait;

    struct StubProvider(serde_json::Value);

    #[async_trait]
    impl LlmProvider for StubProvider {
        async fn generate(&self, _req: GenerateRequest) -> Result<GenerateResponse, CoreError> {
            Ok(GenerateResponse::structured(self.0.clone(), Usage::default()))
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
    async fn out_of_scope_yields_all_false() {
        let provider = StubProvider(json!({
            "needs_daw": false, "needs_arranger": false, "needs_drummer": false
        }));
        let utterance = Utterance {
            question: "bake me a cake".to_string(),
            state: None,
        };
        let result = classify(&utterance, &provider, std::time::Duration::from_secs(3))
            .await
            .unwrap();
        assert!(result.is_out_of_scope());
    }

    #[tokio::test]
    async fn daw_is_normalized_true_when_any_flag_is_set() {
        let provider = StubProvider(json!({
            "needs_daw": false, "needs_arranger": true, "needs_drummer": false
        }));
        let utterance = Utterance {
            question: "add a Cmaj7 chord".to_string(),
            state: None,
        };
        let result = classify(&utterance, &provider, std::time::Duration::from_secs(3))
            .await
            .unwrap();
        assert!(result.needs_daw);
        assert!(result.needs_arranger);
    }
}
