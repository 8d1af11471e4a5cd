//! # hoodwatch-agent
//!
//! Agent-facing surface of hoodwatch: the tool registry, argument validation,
//! dispatch onto the core services, and line-delimited JSON-RPC framing.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tools`] | Tool names, descriptions and input schemas |
//! | [`schema`] | Argument validation against a tool's input schema |
//! | [`dispatch`] | Routes a tool call to its service and renders the payload |
//! | [`protocol`] | JSON-RPC request handling |
//! | [`stream`] | NDJSON writer for replies |
//! | [`metadata`] | Per-call identifiers for logs |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hoodwatch_agent::{ProtocolHandler, ToolDispatcher};
//! use hoodwatch_core::{RobinhoodAdapter, SessionConfig};
//!
//! let source = Arc::new(RobinhoodAdapter::new(SessionConfig::from_env()));
//! let handler = ProtocolHandler::new(ToolDispatcher::new(source));
//! let reply = handler
//!     .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
//!     .await;
//! ```

pub mod dispatch;
pub mod metadata;
pub mod protocol;
pub mod schema;
pub mod stream;
pub mod tools;

pub use dispatch::{ToolDispatcher, ToolOutcome};
pub use metadata::CallId;
pub use protocol::{
    ErrorObject, ProtocolError, ProtocolHandler, Request, Response, DEFAULT_PROTOCOL_VERSION,
    JSONRPC_VERSION, SERVER_NAME,
};
pub use schema::{validate_against_schema, SchemaValidationError};
pub use stream::{parse_messages, NdjsonWriter, StreamError};
pub use tools::{registry, Tool, ToolDefinition};
