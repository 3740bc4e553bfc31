//! Music-theory tool bridge (SPEC_FULL §4.6): a thin wrapper over `rmcp`'s
//! streamable-HTTP client transport. The provider itself hands the tool
//! server URL straight to the LLM so tool calls happen server-side
//! ([`crate::provider::client`]); this bridge exists to validate the server
//! before attaching it and to describe what it offers, since a caller can
//! point `optional_tool_server` at anything.
//!
//! Constructed once per request, never a process-wide singleton — tool
//! servers are caller-configured per request (SPEC_FULL §4.6).

use rmcp::ServiceExt;
use rmcp::model::{ClientCapabilities, ClientInfo, Implementation};
use rmcp::transport::StreamableHttpClientTransport;

use crate::error::CoreError;

const CLIENT_NAME: &str = "daw-copilot-core";
const CLIENT_VERSION: &str = "0.1.0";

/// The result of one connect-discover-disconnect cycle against a caller
/// supplied tool server. Holding the live connection across the whole
/// request isn't necessary here: tool calls during generation happen
/// server-side, between the LLM provider and the tool server directly
/// ([`crate::provider::client::HttpLlmProvider::build_body`] just forwards
/// the URL) — this bridge's job is validating the server and naming what it
/// offers before that happens.
pub struct McpBridge {
    tool_names: Vec<String>,
}

impl McpBridge {
    /// Connect to `url`, list its tools, and disconnect. A failure here is
    /// non-fatal to the caller (SPEC_FULL §4.6 "tool failures do not fail
    /// the request"); callers should treat `Err` as "proceed without tools".
    pub async fn connect(url: &str) -> Result<Self, CoreError> {
        let transport = StreamableHttpClientTransport::from_uri(url.to_string());
        let client_info = ClientInfo {
            protocol_version: Default::default(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: CLIENT_NAME.to_string(),
                title: None,
                version: CLIENT_VERSION.to_string(),
                website_url: None,
                icons: None,
            },
        };

        let client = client_info.serve(transport).await.map_err(|e| CoreError::ToolCallError {
            tool_name: "mcp_connect".to_string(),
            reason: format!("failed to connect to tool server: {e}"),
        })?;

        let tools = client.list_tools(Default::default()).await.map_err(|e| CoreError::ToolCallError {
            tool_name: "mcp_list_tools".to_string(),
            reason: format!("failed to list tools: {e}"),
        })?;
        let tool_names = tools.tools.into_iter().map(|t| t.name.to_string()).collect();

        let _ = client.cancel().await;

        Ok(Self { tool_names })
    }

    pub fn tool_names(&self) -> &[String] {
        &self.tool_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_identity_is_stable() {
        assert_eq!(CLIENT_NAME, "daw-copilot-core");
    }
}
