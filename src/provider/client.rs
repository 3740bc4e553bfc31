//! `HttpLlmProvider`: the concrete `LlmProvider` talking to a
//! `responses`-style HTTP endpoint (SPEC_FULL §6 "Outbound (provider)").

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Event;
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use super::heartbeat::{HeartbeatPacer, WALL_CLOCK_INTERVAL};
use super::request::{GenerateRequest, OutputBinding, Role};
use super::response::GenerateResponse;
use super::{LlmProvider, reasoning_is_allowed};
use crate::error::CoreError;
use crate::grammar::GrammarSyntax;
use crate::retry::retry_preflight;
use crate::stream::{ProviderStream, ProviderStreamEvent};
use crate::types::{ToolUsage, Usage};
use crate::utils::cancel::CancelHandle;
use crate::utils::streaming::{SseEventConverter, StreamFactory};

pub struct HttpLlmProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    reasoning_allow_list: Vec<String>,
}

impl HttpLlmProvider {
    pub fn new(base_url: String, api_key: SecretString, reasoning_allow_list: Vec<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            reasoning_allow_list,
        }
    }

    /// Build the wire body per SPEC_FULL §6: instructions, input messages,
    /// reasoning parameters (only for allow-listed models), and for a CFG
    /// binding a custom-tool definition whose `format` field carries
    /// `{type: "grammar", syntax, definition}`.
    fn build_body(&self, req: &GenerateRequest, stream: bool) -> Value {
        let input: Vec<Value> = req
            .input
            .iter()
            .map(|m| {
                json!({
                    "role": match m.role {
                        Role::User => "user",
                        Role::Developer => "developer",
                    },
                    "content": m.content,
                })
            })
            .collect();

        let mut body = json!({
            "model": req.model,
            "instructions": req.system_prompt,
            "input": input,
            "stream": stream,
        });

        if reasoning_is_allowed(&req.model, &self.reasoning_allow_list) {
            body["reasoning"] = json!({ "effort": reasoning_effort_wire(req.reasoning_effort) });
        }

        match &req.output {
            OutputBinding::Cfg(binding) => {
                body["tools"] = json!([{
                    "type": "custom",
                    "name": binding.tool_name,
                    "description": binding.description,
                    "format": {
                        "type": "grammar",
                        "syntax": match binding.syntax {
                            GrammarSyntax::Lark => "lark",
                            GrammarSyntax::Regex => "regex",
                        },
                        "definition": binding.grammar_text,
                    },
                }]);
                body["tool_choice"] = json!("required");
            }
            OutputBinding::JsonSchema { name, schema } => {
                body["text"] = json!({
                    "format": {
                        "type": "json_schema",
                        "name": name,
                        "schema": schema,
                        "strict": true,
                    }
                });
            }
            OutputBinding::Text => {}
        }

        if let Some(url) = &req.tool_server_url {
            body["tools"] = match body.get("tools").cloned() {
                Some(Value::Array(mut existing)) => {
                    existing.push(mcp_tool_entry(url));
                    Value::Array(existing)
                }
                _ => json!([mcp_tool_entry(url)]),
            };
        }

        body
    }

    fn request_builder(&self, body: &Value) -> reqwest::RequestBuilder {
        self.http
            .post(&self.base_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .timeout(Duration::from_secs(120))
    }
}

fn reasoning_effort_wire(effort: crate::types::ReasoningEffort) -> &'static str {
    use crate::types::ReasoningEffort::*;
    match effort {
        None => "none",
        Minimal => "minimal",
        Low => "low",
        Medium => "medium",
        High => "high",
        Xhigh => "xhigh",
    }
}

fn mcp_tool_entry(url: &str) -> Value {
    json!({
        "type": "mcp",
        "server_url": url,
        "require_approval": "never",
    })
}

/// Search the `output` array for the first `custom_tool_call` item and
/// extract its `input` field verbatim (SPEC_FULL §6). Absence is a fatal
/// `AgentGrammarViolation`, not a silent fallback.
fn extract_custom_tool_call(output: &Value) -> Option<&str> {
    output
        .as_array()?
        .iter()
        .find(|item| item.get("type").and_then(|t| t.as_str()) == Some("custom_tool_call"))
        .and_then(|item| item.get("input"))
        .and_then(|v| v.as_str())
}

fn extract_tool_usage(output: &Value) -> ToolUsage {
    let mut usage = ToolUsage::default();
    if let Some(items) = output.as_array() {
        for item in items {
            let item_type = item.get("type").and_then(|t| t.as_str()).unwrap_or("");
            if item_type == "mcp_call" {
                usage.used = true;
                usage.call_count += 1;
                if let Some(name) = item.get("name").and_then(|v| v.as_str()) {
                    if !usage.tool_names.contains(&name.to_string()) {
                        usage.tool_names.push(name.to_string());
                    }
                }
            }
        }
    }
    usage
}

fn extract_usage(body: &Value) -> Usage {
    let input_tokens = body
        .pointer("/usage/input_tokens")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;
    let output_tokens = body
        .pointer("/usage/output_tokens")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;
    Usage::new(input_tokens, output_tokens)
}

#[async_trait]
impl LlmProvider for HttpLlmProvider {
    async fn generate(&self, req: GenerateRequest) -> Result<GenerateResponse, CoreError> {
        let body = self.build_body(&req, false);
        let is_cfg = matches!(req.output, OutputBinding::Cfg(_));
        let is_schema = matches!(req.output, OutputBinding::JsonSchema { .. });

        let response_json = retry_preflight(|| {
            let builder = self.request_builder(&body);
            async move {
                let resp = builder.send().await.map_err(|e| {
                    CoreError::ProviderTransport(format!("failed to send request: {e}"))
                })?;
                if !resp.status().is_success() {
                    let status = resp.status();
                    let text = resp.text().await.unwrap_or_default();
                    return Err(CoreError::ProviderTransport(format!(
                        "HTTP error {}: {text}",
                        status.as_u16()
                    )));
                }
                resp.json::<Value>()
                    .await
                    .map_err(|e| CoreError::ProviderTransport(format!("invalid JSON body: {e}")))
            }
        })
        .await?;

        let usage = extract_usage(&response_json);
        let output = response_json.get("output").cloned().unwrap_or(Value::Null);
        let tool_usage = extract_tool_usage(&output);

        if is_cfg {
            let dsl = extract_custom_tool_call(&output).ok_or_else(|| {
                CoreError::AgentGrammarViolation {
                    agent: "unknown".to_string(),
                    reason: "no custom_tool_call item in provider response".to_string(),
                }
            })?;
            return Ok(GenerateResponse::text(dsl, usage).with_tool_usage(tool_usage));
        }

        if is_schema {
            let parsed = response_json
                .get("output_parsed")
                .cloned()
                .or_else(|| response_json.get("output_text").cloned())
                .ok_or_else(|| {
                    CoreError::AgentParseError {
                        agent: "unknown".to_string(),
                        reason: "no structured output in provider response".to_string(),
                    }
                })?;
            return Ok(GenerateResponse::structured(parsed, usage).with_tool_usage(tool_usage));
        }

        let text = response_json
            .get("output_text")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        Ok(GenerateResponse::text(text, usage).with_tool_usage(tool_usage))
    }

    async fn generate_stream(
        &self,
        req: GenerateRequest,
        cancel: CancelHandle,
    ) -> Result<ProviderStream, CoreError> {
        let body = self.build_body(&req, true);
        let builder = self.request_builder(&body);
        let converter = ResponsesSseConverter {
            is_cfg: matches!(req.output, OutputBinding::Cfg(_)),
        };

        let inner = StreamFactory::create_eventsource_stream(builder, converter).await?;
        let pacer = Arc::new(std::sync::Mutex::new(HeartbeatPacer::new(10)));

        let event_pacer = Arc::clone(&pacer);
        let paced = inner.flat_map(move |item| {
            let mut heartbeats = Vec::new();
            if let Ok(heartbeat) = event_pacer
                .lock()
                .map(|mut p| p.on_event())
                .map_err(|_| ())
            {
                heartbeats.extend(heartbeat.map(Ok));
            }
            heartbeats.push(item);
            futures::stream::iter(heartbeats)
        });

        // Dual heartbeat source (SPEC_FULL §4.1/§9): the per-event pacer above
        // only fires while the upstream keeps emitting. A stalled upstream
        // emits nothing, so a wall-clock ticker independently drives
        // `wall_clock_check` regardless of event traffic.
        let wall_clock_pacer = pacer;
        let cancel_guarded = async_stream::stream! {
            futures::pin_mut!(paced);
            let mut ticker = tokio::time::interval(WALL_CLOCK_INTERVAL);
            ticker.tick().await; // first tick fires immediately; consume it
            loop {
                if cancel.is_cancelled() {
                    break;
                }
                tokio::select! {
                    item = paced.next() => {
                        match item {
                            Some(item) => yield item,
                            None => break,
                        }
                    }
                    _ = ticker.tick() => {
                        let heartbeat = wall_clock_pacer
                            .lock()
                            .ok()
                            .and_then(|mut p| p.wall_clock_check());
                        if let Some(heartbeat) = heartbeat {
                            yield Ok(heartbeat);
                        }
                    }
                }
            }
        };

        Ok(Box::pin(cancel_guarded))
    }
}

#[derive(Clone)]
struct ResponsesSseConverter {
    is_cfg: bool,
}

impl SseEventConverter for ResponsesSseConverter {
    fn convert_event(&self, event: Event) -> Vec<Result<ProviderStreamEvent, CoreError>> {
        let Ok(json) = serde_json::from_str::<Value>(&event.data) else {
            return vec![];
        };
        let event_type = json.get("type").and_then(|v| v.as_str()).unwrap_or("");

        match event_type {
            "response.created" => vec![Ok(ProviderStreamEvent::Started)],
            "response.output_text.delta" => {
                let chunk = json
                    .get("delta")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                vec![Ok(ProviderStreamEvent::TextDelta { chunk })]
            }
            "response.custom_tool_call_input.delta" if self.is_cfg => {
                let chunk = json
                    .get("delta")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                vec![Ok(ProviderStreamEvent::ToolCallDelta { chunk })]
            }
            "response.completed" => {
                let body = json.get("response").cloned().unwrap_or(Value::Null);
                let usage = extract_usage(&body);
                let output = body.get("output").cloned().unwrap_or(Value::Null);
                let tool_usage = extract_tool_usage(&output);

                if self.is_cfg {
                    return match extract_custom_tool_call(&output) {
                        Some(_dsl) => vec![Ok(ProviderStreamEvent::Completed { usage, tool_usage })],
                        None => vec![Err(CoreError::AgentGrammarViolation {
                            agent: "unknown".to_string(),
                            reason: "no custom_tool_call item in provider response".to_string(),
                        })],
                    };
                }
                vec![Ok(ProviderStreamEvent::Completed { usage, tool_usage })]
            }
            "response.failed" | "error" => {
                let reason = json
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|v| v.as_str())
                    .unwrap_or("provider reported failure")
                    .to_string();
                vec![Ok(ProviderStreamEvent::Failed { reason })]
            }
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBinding;
    use crate::types::ReasoningEffort;

    fn provider() -> HttpLlmProvider {
        HttpLlmProvider::new(
            "https://example.invalid/v1/responses".to_string(),
            SecretString::from("sk-test".to_string()),
            vec!["gpt-5".to_string()],
        )
    }

    #[test]
    fn cfg_requests_carry_grammar_format_and_required_tool_choice() {
        let req = GenerateRequest::new("gpt-5", "system")
            .with_output(OutputBinding::Cfg(GrammarBinding::daw()));
        let body = provider().build_body(&req, false);
        assert_eq!(body["tools"][0]["format"]["type"], "grammar");
        assert_eq!(body["tools"][0]["format"]["syntax"], "lark");
        assert_eq!(body["tool_choice"], "required");
    }

    #[test]
    fn reasoning_is_omitted_for_non_allow_listed_models() {
        let req = GenerateRequest::new("gpt-3.5", "system").with_reasoning(ReasoningEffort::High);
        let body = provider().build_body(&req, false);
        assert!(body.get("reasoning").is_none());
    }

    #[test]
    fn reasoning_is_attached_for_allow_listed_models() {
        let req = GenerateRequest::new("gpt-5", "system").with_reasoning(ReasoningEffort::High);
        let body = provider().build_body(&req, false);
        assert_eq!(body["reasoning"]["effort"], "high");
    }

    #[test]
    fn missing_custom_tool_call_is_none() {
        let output = json!([{ "type": "reasoning" }]);
        assert!(extract_custom_tool_call(&output).is_none());
    }

    #[test]
    fn extracts_custom_tool_call_dsl_verbatim() {
        let output = json!([
            { "type": "reasoning" },
            { "type": "custom_tool_call", "name": "daw_dsl", "input": "track(id=1).set_pan(pan=-1.0)" }
        ]);
        assert_eq!(
            extract_custom_tool_call(&output),
            Some("track(id=1).set_pan(pan=-1.0)")
        );
    }

    #[test]
    fn mcp_tool_server_is_appended_to_tools() {
        let req = GenerateRequest::new("gpt-5", "system")
            .with_output(OutputBinding::Cfg(GrammarBinding::arranger()))
            .with_tool_server(Some("https://mcp.example.invalid".to_string()));
        let body = provider().build_body(&req, false);
        let tools = body["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[1]["type"], "mcp");
    }
}
