use std::sync::Arc;

use daw_copilot_core::config::AppConfig;
use daw_copilot_core::orchestrator::Orchestrator;
use daw_copilot_core::provider::{HttpLlmProvider, LlmProvider};
use daw_copilot_core::registry::global_registry;
use daw_copilot_core::server::{AppState, build_router};
use daw_copilot_core::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Arc::new(AppConfig::from_env()?);
    // Force the registry to initialize now rather than on first request, so
    // `/healthz` can report readiness truthfully.
    let _ = global_registry();

    let provider: Arc<dyn LlmProvider> = Arc::new(HttpLlmProvider::new(
        config.llm_base_url.clone(),
        config.llm_api_key.clone(),
        config.reasoning_allow_list.clone(),
    ));

    let orchestrator = Arc::new(Orchestrator::new(Arc::clone(&provider), Arc::clone(&config)));

    let state = AppState {
        orchestrator,
        provider,
        config: Arc::clone(&config),
    };

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "daw-copilot-core listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
