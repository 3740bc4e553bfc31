//! Process-wide runtime configuration, loaded once at startup.

use secrecy::SecretString;
use std::time::Duration;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    None,
    Gateway,
}

/// Immutable configuration shared read-only across all requests via `Arc`.
#[derive(Clone)]
pub struct AppConfig {
    pub listen_addr: String,
    pub llm_api_key: SecretString,
    pub llm_base_url: String,
    pub tool_server_url: Option<String>,
    pub telemetry_dsn: Option<String>,
    pub auth_mode: AuthMode,
    pub classification_timeout: Duration,
    pub orchestrator_timeout: Duration,
    pub agent_timeout: Duration,
    /// Models permitted to receive a `reasoning` parameter. Configuration,
    /// not code, per SPEC_FULL §9 "Model allow-list for reasoning".
    pub reasoning_allow_list: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("listen_addr", &self.listen_addr)
            .field("llm_api_key", &"[redacted]")
            .field("llm_base_url", &self.llm_base_url)
            .field("tool_server_url", &self.tool_server_url)
            .field("telemetry_dsn", &self.telemetry_dsn.is_some())
            .field("auth_mode", &self.auth_mode)
            .field("classification_timeout", &self.classification_timeout)
            .field("orchestrator_timeout", &self.orchestrator_timeout)
            .field("agent_timeout", &self.agent_timeout)
            .field("reasoning_allow_list", &self.reasoning_allow_list)
            .finish()
    }
}

fn env_duration_ms(key: &str, default_ms: u64) -> Result<Duration, CoreError> {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| CoreError::Config(format!("{key} must be an integer milliseconds value: {e}"))),
        Err(std::env::VarError::NotPresent) => Ok(Duration::from_millis(default_ms)),
        Err(e) => Err(CoreError::Config(format!("{key} is not valid unicode: {e}"))),
    }
}

impl AppConfig {
    /// The only constructor. Fails fast on a missing or invalid variable.
    pub fn from_env() -> Result<Self, CoreError> {
        let llm_api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| CoreError::Config("LLM_API_KEY is required".to_string()))?;
        if llm_api_key.trim().is_empty() {
            return Err(CoreError::Config("LLM_API_KEY must not be empty".to_string()));
        }

        let auth_mode = match std::env::var("AUTH_MODE").ok().as_deref() {
            None | Some("none") => AuthMode::None,
            Some("gateway") => AuthMode::Gateway,
            Some(other) => {
                return Err(CoreError::Config(format!(
                    "AUTH_MODE must be 'none' or 'gateway', got '{other}'"
                )));
            }
        };

        let reasoning_allow_list = std::env::var("REASONING_ALLOW_LIST")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            llm_api_key: SecretString::from(llm_api_key),
            llm_base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/responses".to_string()),
            tool_server_url: std::env::var("MCP_TOOL_SERVER_URL").ok(),
            telemetry_dsn: std::env::var("TELEMETRY_DSN").ok(),
            auth_mode,
            classification_timeout: env_duration_ms("CLASSIFICATION_TIMEOUT_MS", 3_000)?,
            orchestrator_timeout: env_duration_ms("ORCHESTRATOR_TIMEOUT_MS", 120_000)?,
            agent_timeout: env_duration_ms("AGENT_TIMEOUT_MS", 120_000)?,
            reasoning_allow_list,
        })
    }
}
