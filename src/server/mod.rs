//! The axum HTTP surface (SPEC_FULL §6): four functional POST endpoints
//! plus an operational `/healthz`, following the teacher's
//! `server_adapters::axum` convention of turning an internal stream into an
//! `Sse<impl Stream<Item = Result<Event, Infallible>>>` response.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::agents::{JsfxAgent, MixAgent};
use crate::agents::mix::{MixMode, MixRequest, MixResult};
use crate::composition::{self, CompositionRequest};
use crate::config::AppConfig;
use crate::error::CoreError;
use crate::orchestrator::Orchestrator;
use crate::provider::{InputMessage, LlmProvider, Role};
use crate::stream::{CompositionStreamEvent, DawStreamEvent};
use crate::types::{Accuracy, Action, ReasoningEffort, Utterance};
use crate::utils::cancel::new_cancel_handle;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub provider: Arc<dyn LlmProvider>,
    pub config: Arc<AppConfig>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/daw/chat", post(daw_chat_unary))
        .route("/daw/chat/stream", post(daw_chat_stream))
        .route("/jsfx/generate", post(jsfx_generate))
        .route("/generate", post(composition_generate))
        .route("/mix/analyze", post(mix_analyze))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn error_response(e: &CoreError) -> Response {
    (e.http_status(), Json(json!({ "error": e.user_message() }))).into_response()
}

// ---------------------------------------------------------------------
// DAW chat
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DawChatBody {
    question: String,
    #[serde(default)]
    state: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct DawChatResponse {
    actions: Vec<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn daw_chat_unary(
    State(state): State<AppState>,
    Json(body): Json<DawChatBody>,
) -> Response {
    let utterance = Utterance {
        question: body.question,
        state: body.state,
    };
    match state.orchestrator.run_unary(utterance).await {
        Ok(result) => Json(DawChatResponse {
            actions: result.actions,
            error: None,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn daw_chat_stream(
    State(state): State<AppState>,
    Json(body): Json<DawChatBody>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send> {
    let utterance = Utterance {
        question: body.question,
        state: body.state,
    };
    let cancel = new_cancel_handle();
    let stream = state.orchestrator.run_streaming(utterance, cancel);

    let sse_stream = stream.map(|event| {
        let (name, data) = match &event {
            DawStreamEvent::Started => ("started", json!({})),
            DawStreamEvent::Action { action } => ("action", json!({ "action": action })),
            DawStreamEvent::Error { message } => ("error", json!({ "message": message })),
            DawStreamEvent::Done { actions } => ("done", json!({ "actions": actions })),
        };
        let payload = serde_json::to_string(&data).unwrap_or_else(|_| "{}".to_string());
        Ok(Event::default().event(name).data(payload))
    });

    Sse::new(sse_stream)
}

// ---------------------------------------------------------------------
// JSFX
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JsfxBody {
    message: String,
    #[serde(default)]
    code: String,
    filename: String,
}

async fn jsfx_generate(State(state): State<AppState>, Json(body): Json<JsfxBody>) -> Response {
    let agent = JsfxAgent;
    match agent
        .generate(&body.message, &body.code, &body.filename, state.provider.as_ref())
        .await
    {
        Ok(code) => Json(json!({ "code": code })).into_response(),
        Err(e) => error_response(&e),
    }
}

// ---------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct InputArrayItem {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompositionBody {
    model: String,
    input_array: Vec<InputArrayItem>,
    #[serde(default)]
    stream: bool,
    #[serde(default)]
    reasoning_mode: Option<ReasoningEffort>,
    #[serde(default)]
    output_format: Option<String>,
}

fn composition_request(body: CompositionBody, tool_server_url: Option<String>) -> CompositionRequest {
    let input_messages = body
        .input_array
        .into_iter()
        .map(|item| match item.role.as_str() {
            "developer" => InputMessage { role: Role::Developer, content: item.content },
            _ => InputMessage { role: Role::User, content: item.content },
        })
        .collect();

    CompositionRequest {
        model: body.model,
        input_messages,
        reasoning_level: body.reasoning_mode,
        tool_server_url,
    }
}

async fn composition_generate(
    State(state): State<AppState>,
    Json(body): Json<CompositionBody>,
) -> Response {
    let _ = &body.output_format; // acknowledged, wire format is fixed JSON per SPEC_FULL §6
    let wants_stream = body.stream;
    let req = composition_request(body, state.config.tool_server_url.clone());

    if wants_stream {
        let stream = composition::run_streaming(req, Arc::clone(&state.provider));
        let sse_stream = stream.map(|event| {
            let (name, data) = match &event {
                CompositionStreamEvent::Progress { stage } => ("progress", json!({ "stage": stage })),
                CompositionStreamEvent::McpEnabled { enabled } => {
                    ("mcp_enabled", json!({ "enabled": enabled }))
                }
                CompositionStreamEvent::Heartbeat { events_received, elapsed_s } => (
                    "heartbeat",
                    json!({ "events_received": events_received, "elapsed_s": elapsed_s }),
                ),
                CompositionStreamEvent::Result { choices } => ("result", json!({ "choices": choices })),
                CompositionStreamEvent::Complete => ("complete", json!({})),
                CompositionStreamEvent::Done => ("done", json!({})),
                CompositionStreamEvent::Error { message } => ("error", json!({ "message": message })),
            };
            let payload = serde_json::to_string(&data).unwrap_or_else(|_| "{}".to_string());
            Ok::<_, std::convert::Infallible>(Event::default().event(name).data(payload))
        });
        return Sse::new(sse_stream).into_response();
    }

    match composition::run(req, state.provider.as_ref()).await {
        Ok(result) => Json(json!({
            "output_parsed": { "choices": result.choices },
            "usage": result.usage,
            "mcp_used": result.mcp_used,
            "mcp_calls": result.mcp_calls,
            "mcp_tools": result.mcp_tools,
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

// ---------------------------------------------------------------------
// Mix
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MixBody {
    mode: MixMode,
    analysis_data: serde_json::Value,
    context: serde_json::Value,
    #[serde(default)]
    user_request: Option<String>,
    #[serde(default)]
    accuracy: Option<Accuracy>,
}

async fn mix_analyze(State(state): State<AppState>, Json(body): Json<MixBody>) -> Response {
    let agent = MixAgent;
    let req = MixRequest {
        mode: body.mode,
        dsp_analysis: body.analysis_data,
        context: body.context,
        user_request: body.user_request,
        accuracy: body.accuracy,
    };
    match agent.analyze(req, state.provider.as_ref()).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(&e),
    }
}
