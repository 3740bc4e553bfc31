//! The Mix agent: analysis/recommendation (SPEC_FULL §4.4.1). JSON-schema
//! constrained, not CFG — its own bespoke entry point, never part of
//! orchestrator fan-out.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::CoreError;
use crate::provider::{GenerateRequest, InputMessage, LlmProvider, OutputBinding};
use crate::types::{Accuracy, Action, AgentName, ReasoningEffort};
use crate::utils::schema::validate_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixMode {
    Track,
    MultiTrack,
    Master,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MixRequest {
    pub mode: MixMode,
    pub dsp_analysis: Value,
    pub context: Value,
    #[serde(default)]
    pub user_request: Option<String>,
    #[serde(default)]
    pub accuracy: Option<Accuracy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixRecommendation {
    pub description: String,
    /// A DAW-compatible action payload, per SPEC_FULL §4.4.1.
    pub action: Action,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixResult {
    pub analysis_summary: String,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<MixRecommendation>,
    #[serde(default)]
    pub relationship_issues: Vec<String>,
}

const SCOPE: &str = "\
You analyze mix DSP data (frequency bands, EQ, loudness, dynamics, stereo \
image, resonances, existing FX) and produce a structured critique: a \
summary, issues, strengths, and recommendations. Each recommendation must \
include a DAW-compatible action payload the caller can apply directly.";

fn output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "analysis_summary": { "type": "string" },
            "issues": { "type": "array", "items": { "type": "string" } },
            "strengths": { "type": "array", "items": { "type": "string" } },
            "recommendations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "description": { "type": "string" },
                        "action": { "type": "object" }
                    },
                    "required": ["description", "action"]
                }
            },
            "relationship_issues": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["analysis_summary", "issues", "strengths", "recommendations", "relationship_issues"]
    })
}

pub struct MixAgent;

impl MixAgent {
    pub fn name(&self) -> AgentName {
        AgentName::Mix
    }

    pub fn scope(&self) -> &'static str {
        SCOPE
    }

    /// Accuracy → reasoning mapping per SPEC_FULL §4.1, auto-raised to at
    /// least `medium` for `multi_track` mode (SPEC_FULL §4.4.1).
    fn reasoning_for(&self, req: &MixRequest) -> ReasoningEffort {
        let base = req
            .accuracy
            .map(Accuracy::to_reasoning)
            .unwrap_or(ReasoningEffort::Low);
        if req.mode == MixMode::MultiTrack && matches!(base, ReasoningEffort::None | ReasoningEffort::Minimal | ReasoningEffort::Low)
        {
            ReasoningEffort::Medium
        } else {
            base
        }
    }

    pub async fn analyze(
        &self,
        req: MixRequest,
        provider: &dyn LlmProvider,
    ) -> Result<MixResult, CoreError> {
        let reasoning = self.reasoning_for(&req);

        let mut input = vec![InputMessage::developer(format!(
            "mode: {:?}\ndsp_analysis: {}\ncontext: {}",
            req.mode, req.dsp_analysis, req.context
        ))];
        if let Some(user_request) = &req.user_request {
            input.push(InputMessage::user(user_request));
        } else {
            input.push(InputMessage::user("Analyze this mix."));
        }

        let generate_req = GenerateRequest::new("mix-agent-model", SCOPE)
            .with_input(input)
            .with_reasoning(reasoning)
            .with_output(OutputBinding::JsonSchema {
                name: "mix_analysis".to_string(),
                schema: output_schema(),
            });

        let response = provider.generate(generate_req).await?;
        let structured = response
            .structured_output
            .ok_or_else(|| CoreError::AgentParseError {
                agent: self.name().as_str().to_string(),
                reason: "provider returned no structured output for a JSON-schema request"
                    .to_string(),
            })?;
        validate_json(&output_schema(), &structured, self.name().as_str())?;

        serde_json::from_value(structured).map_err(|e| CoreError::AgentParseError {
            agent: self.name().as_str().to_string(),
            reason: format!("structured output did not match the mix schema: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_track_mode_raises_low_reasoning_to_medium() {
        let agent = MixAgent;
        let req = MixRequest {
            mode: MixMode::MultiTrack,
            dsp_analysis: json!({}),
            context: json!({}),
            user_request: None,
            accuracy: Some(Accuracy::Fast),
        };
        assert_eq!(agent.reasoning_for(&req), ReasoningEffort::Medium);
    }

    #[test]
    fn track_mode_keeps_requested_accuracy() {
        let agent = MixAgent;
        let req = MixRequest {
            mode: MixMode::Track,
            dsp_analysis: json!({}),
            context: json!({}),
            user_request: None,
            accuracy: Some(Accuracy::Deep),
        };
        assert_eq!(agent.reasoning_for(&req), ReasoningEffort::Medium);
    }
}
