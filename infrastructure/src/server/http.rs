//! HTTP-fronted tool-server transport.
//!
//! Some tool-servers expose an HTTP endpoint instead of answering on
//! stdout. The exchange envelope is the same (`result` / `error`), wrapped
//! in a JSON-RPC `callTool` body. Readiness is a real concern here — the
//! process listens only after it has bound its port — so the first call is
//! preceded by bounded polling of the server URL.

use super::codec;
use harvest_domain::{FailureReason, ToolRequest, ToolResponse};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Settings for one HTTP-fronted tool-server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Base URL the server listens on.
    pub url: String,
    /// Total time to wait for the server to become ready.
    pub ready_timeout: Duration,
    /// Interval between readiness probes.
    pub poll_interval: Duration,
    /// Deadline for the call itself.
    pub request_timeout: Duration,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
            ready_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_millis(500),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for a tool-server endpoint.
#[derive(Clone)]
pub struct HttpToolServer {
    config: HttpServerConfig,
    http: reqwest::Client,
}

impl HttpToolServer {
    pub fn new(config: HttpServerConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Poll the server URL until it answers (any non-5xx status) or the
    /// ready deadline passes.
    pub async fn wait_until_ready(&self) -> bool {
        info!("Waiting for tool-server at {}", self.config.url);
        let deadline = Instant::now() + self.config.ready_timeout;

        while Instant::now() < deadline {
            match self.http.get(&self.config.url).send().await {
                Ok(response) if response.status().as_u16() < 500 => {
                    info!("Tool-server is ready");
                    return true;
                }
                Ok(response) => {
                    debug!("Tool-server not ready yet: {}", response.status());
                }
                Err(_) => {}
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }

        warn!(
            "Tool-server did not become ready within {:?}",
            self.config.ready_timeout
        );
        false
    }

    /// Send one `callTool` request and classify the reply exactly like the
    /// stdio codec does.
    pub async fn call(&self, request: &ToolRequest) -> ToolResponse {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": "1",
            "method": "callTool",
            "params": {
                "name": request.tool,
                "arguments": request.arguments,
            },
        });

        let response = match self
            .http
            .post(&self.config.url)
            .json(&payload)
            .timeout(self.config.request_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(
                    "no response from tool-server within {:?}",
                    self.config.request_timeout
                );
                return ToolResponse::failure(FailureReason::NoResponse);
            }
            Err(e) => {
                return ToolResponse::failure(FailureReason::Transport(e.to_string()));
            }
        };

        if !response.status().is_success() {
            return ToolResponse::failure(FailureReason::Transport(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        match response.json::<Value>().await {
            Ok(value) => codec::classify_payload(&value),
            Err(_) => ToolResponse::failure(FailureReason::InvalidJson),
        }
    }
}
