//! # JSON-RPC Framing
//!
//! Line-oriented JSON-RPC 2.0 handling for the tool server. Each input line
//! holds one request; each reply is one JSON value. Notifications (requests
//! without an `id`) never produce a reply.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::dispatch::ToolDispatcher;

pub const JSONRPC_VERSION: &str = "2.0";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "hoodwatch";

/// Protocol-level failures. Tool failures are not protocol errors; they are
/// reported inside a successful `tools/call` result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),
}

impl ProtocolError {
    pub const fn code(&self) -> i64 {
        match self {
            Self::Parse(_) => -32700,
            Self::InvalidRequest(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl Response {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, error: &ProtocolError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(ErrorObject {
                code: error.code(),
                message: error.to_string(),
            }),
        }
    }
}

/// Answers JSON-RPC requests using a [`ToolDispatcher`].
pub struct ProtocolHandler {
    dispatcher: ToolDispatcher,
}

impl ProtocolHandler {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Handles one input line. Blank lines and notifications yield `None`.
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let raw: Value = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(error) => {
                return Some(Response::error(
                    Value::Null,
                    &ProtocolError::Parse(error.to_string()),
                ))
            }
        };
        self.handle_value(raw).await
    }

    pub async fn handle_value(&self, raw: Value) -> Option<Response> {
        let id_hint = raw.get("id").cloned().unwrap_or(Value::Null);
        let request: Request = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(error) => {
                return Some(Response::error(
                    id_hint,
                    &ProtocolError::InvalidRequest(error.to_string()),
                ))
            }
        };

        if request.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
            return Some(Response::error(
                id_hint,
                &ProtocolError::InvalidRequest(String::from("jsonrpc must be \"2.0\"")),
            ));
        }

        let outcome = self.handle_request(&request).await;
        let id = request.id?;
        Some(match outcome {
            Ok(result) => Response::result(id, result),
            Err(error) => Response::error(id, &error),
        })
    }

    async fn handle_request(&self, request: &Request) -> Result<Value, ProtocolError> {
        debug!(method = %request.method, "rpc request");
        match request.method.as_str() {
            "initialize" => Ok(initialize_result(&request.params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.dispatcher.tools() })),
            "tools/call" => self.call_tool(&request.params).await,
            method if method.starts_with("notifications/") => Ok(Value::Null),
            method => Err(ProtocolError::MethodNotFound(method.to_owned())),
        }
    }

    async fn call_tool(&self, params: &Value) -> Result<Value, ProtocolError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::InvalidParams(String::from("name is required")))?;
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let outcome = self.dispatcher.call(name, &arguments).await;
        Ok(json!({
            "content": [{ "type": "text", "text": outcome.text() }],
            "isError": outcome.is_error,
        }))
    }
}

fn initialize_result(params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_follow_json_rpc() {
        assert_eq!(ProtocolError::Parse(String::new()).code(), -32700);
        assert_eq!(ProtocolError::InvalidRequest(String::new()).code(), -32600);
        assert_eq!(ProtocolError::MethodNotFound(String::new()).code(), -32601);
        assert_eq!(ProtocolError::InvalidParams(String::new()).code(), -32602);
    }

    #[test]
    fn initialize_echoes_client_protocol_version() {
        let result = initialize_result(&json!({ "protocolVersion": "2025-03-26" }));
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);

        let fallback = initialize_result(&Value::Null);
        assert_eq!(fallback["protocolVersion"], DEFAULT_PROTOCOL_VERSION);
    }

    #[test]
    fn error_response_omits_result() {
        let response = Response::error(json!(7), &ProtocolError::MethodNotFound("x".into()));
        let rendered = serde_json::to_value(&response).expect("serializes");
        assert_eq!(rendered["error"]["code"], -32601);
        assert!(rendered.get("result").is_none());
    }
}
