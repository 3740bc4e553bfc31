//! The LLM provider abstraction (SPEC_FULL §4.1).
//!
//! A single contract, `LlmProvider`, exposes `generate` and `generate_stream`
//! over a uniform `GenerateRequest`/`GenerateResponse` pair. Exactly one
//! output discipline is bound per request: a JSON-schema output, a CFG
//! (grammar) binding delivered as a custom tool call, or plain text.

mod client;
mod heartbeat;
mod request;
mod response;

pub use client::HttpLlmProvider;
pub use heartbeat::{HeartbeatPacer, WALL_CLOCK_INTERVAL};
pub use request::{GenerateRequest, InputMessage, OutputBinding, Role};
pub use response::GenerateResponse;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::stream::ProviderStream;
use crate::utils::cancel::CancelHandle;

/// Uniform contract every agent and pipeline stage calls through. Never
/// called directly by anything outside `agents`/`composition`/`orchestrator`.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, req: GenerateRequest) -> Result<GenerateResponse, CoreError>;

    async fn generate_stream(
        &self,
        req: GenerateRequest,
        cancel: CancelHandle,
    ) -> Result<ProviderStream, CoreError>;
}

/// Models permitted to receive a `reasoning` parameter are configuration,
/// not code (SPEC_FULL §9). This helper applies the allow-list: the
/// `reasoning_effort` is carried on the request unconditionally, but the
/// wire-level request builder omits it unless the model is allow-listed.
pub fn reasoning_is_allowed(model: &str, allow_list: &[String]) -> bool {
    allow_list.iter().any(|m| m == model)
}
