//! MCP transport capability.
//!
//! The session layer only needs four things from a transport: handshake,
//! list tools, call a tool, close. Implementations own the wire details; the
//! default speaks streamable HTTP with the session token as bearer.

use crate::gateway::tokens::GatewayToken;
use async_trait::async_trait;
use rust_mcp_schema::schema_utils::ServerMessage;
use rust_mcp_schema::{CallToolRequestParams, CallToolResult, InitializeResult, ListToolsResult};
use std::error::Error as StdError;
use std::fmt;

pub mod streamable_http;

pub use streamable_http::{StreamableHttpConnector, StreamableHttpTransport};

/// JSON-RPC code used by servers to indicate unsupported methods.
pub const MCP_METHOD_NOT_FOUND: i64 = -32601;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection failure, non-success HTTP status, or unreadable body.
    Http(String),
    /// The server answered, but not with a usable JSON-RPC result.
    Protocol(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Http(message) => write!(f, "MCP transport error: {message}"),
            TransportError::Protocol(message) => write!(f, "MCP protocol error: {message}"),
        }
    }
}

impl StdError for TransportError {}

#[async_trait]
pub trait McpTransport: Send {
    /// Run the initialize handshake, including the `initialized` notification.
    async fn initialize(&mut self) -> Result<InitializeResult, TransportError>;

    /// Fetch one page of the tool listing. Servers without tool support yield
    /// an empty page.
    async fn list_tools(&mut self, cursor: Option<String>)
        -> Result<ListToolsResult, TransportError>;

    async fn call_tool(
        &mut self,
        params: CallToolRequestParams,
    ) -> Result<CallToolResult, TransportError>;

    /// Release server-side session state.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Opens transports to a remote tool server on behalf of an issued token.
#[async_trait]
pub trait McpConnector: Send + Sync {
    async fn connect(
        &self,
        remote_url: &str,
        token: &GatewayToken,
    ) -> Result<Box<dyn McpTransport>, TransportError>;
}

/// Returns true when a server reports the JSON-RPC method-not-found code.
pub fn is_method_not_found(message: &ServerMessage) -> bool {
    matches!(
        message,
        ServerMessage::Error(error) if error.error.code == MCP_METHOD_NOT_FOUND
    )
}

pub(crate) fn empty_list_tools() -> ListToolsResult {
    ListToolsResult {
        meta: None,
        next_cursor: None,
        tools: Vec::new(),
    }
}
