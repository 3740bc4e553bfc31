//! Structured tracing for request/classification/agent/tool-call lifecycles.
//!
//! Every inbound request gets a `trace_id`; classification, each agent call,
//! and each tool call get a child `span_id`, so a single request's fan-out
//! is correlatable in logs (SPEC_FULL §9 "Structured logging").

use uuid::Uuid;

/// Install the global `tracing` subscriber. Call once at process start.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// A request-scoped identifier pair. `trace_id` is shared by every log line
/// and provider call belonging to one inbound request; `span_id` is unique
/// per step (classification, one agent call, one tool call).
#[derive(Debug, Clone, Copy)]
pub struct RequestSpan {
    pub trace_id: Uuid,
    pub span_id: Uuid,
}

impl RequestSpan {
    pub fn new_request() -> Self {
        let trace_id = Uuid::new_v4();
        Self {
            trace_id,
            span_id: trace_id,
        }
    }

    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: Uuid::new_v4(),
        }
    }
}

/// Optional exporter hook gated on `AppConfig.telemetry_dsn`. A production
/// deployment would forward spans to a DSN-configured sink; without one
/// configured this is a no-op, since telemetry sinks are an external
/// collaborator (SPEC_FULL §1).
pub trait TelemetryExporter: Send + Sync {
    fn export(&self, trace_id: Uuid, name: &str, fields: &[(&str, &str)]);
}

pub struct TracingExporter;

impl TelemetryExporter for TracingExporter {
    fn export(&self, trace_id: Uuid, name: &str, fields: &[(&str, &str)]) {
        tracing::info!(trace_id = %trace_id, event = name, ?fields, "telemetry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_spans_share_trace_id_but_not_span_id() {
        let root = RequestSpan::new_request();
        let child = root.child();
        assert_eq!(root.trace_id, child.trace_id);
        assert_ne!(root.span_id, child.span_id);
    }
}
