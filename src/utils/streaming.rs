//! Common streaming utilities for provider HTTP calls.
//!
//! Handles SSE parsing across chunk/UTF-8 boundaries using
//! `eventsource-stream`, converting provider-native events into
//! `ProviderStreamEvent`s (SPEC_FULL §4.1).

use eventsource_stream::{Event, Eventsource};
use futures_util::StreamExt;

use crate::error::CoreError;
use crate::stream::{ProviderStream, ProviderStreamEvent};

/// Implemented once per outbound endpoint shape to convert its native SSE
/// events into `ProviderStreamEvent`s.
pub trait SseEventConverter: Send + Sync {
    fn convert_event(&self, event: Event) -> Vec<Result<ProviderStreamEvent, CoreError>>;

    /// Called once on the terminal `[DONE]` marker, if the endpoint emits one.
    fn handle_stream_end(&self) -> Option<Result<ProviderStreamEvent, CoreError>> {
        None
    }
}

pub struct StreamFactory;

impl StreamFactory {
    /// Send the request and convert the response body into a
    /// `ProviderStream` using `eventsource-stream` for UTF-8-safe SSE
    /// parsing.
    pub async fn create_eventsource_stream<C>(
        request_builder: reqwest::RequestBuilder,
        converter: C,
    ) -> Result<ProviderStream, CoreError>
    where
        C: SseEventConverter + Clone + 'static,
    {
        let response = request_builder
            .send()
            .await
            .map_err(|e| CoreError::ProviderTransport(format!("failed to send request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::ProviderTransport(format!(
                "HTTP error {}: {}",
                status.as_u16(),
                body
            )));
        }

        let byte_stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| std::io::Error::other(e.to_string())));

        let sse_stream = byte_stream.eventsource();

        let provider_stream = sse_stream
            .then(move |event_result| {
                let converter = converter.clone();
                async move {
                    match event_result {
                        Ok(event) => {
                            if event.data.trim() == "[DONE]" {
                                return converter
                                    .handle_stream_end()
                                    .into_iter()
                                    .collect::<Vec<_>>();
                            }
                            if event.data.trim().is_empty() {
                                return vec![];
                            }
                            converter.convert_event(event)
                        }
                        Err(e) => vec![Err(CoreError::ProviderTransport(format!(
                            "SSE parsing error: {e}"
                        )))],
                    }
                }
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(provider_stream))
    }
}
