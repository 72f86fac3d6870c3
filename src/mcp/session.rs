//! Per-chat MCP tool sessions.
//!
//! A session is opened on behalf of a signed-in user: a gateway token is issued
//! for the session identity, a transport is connected with that token as
//! bearer, and the tool catalog is fetched. Tools can only be called once the
//! catalog is in hand.

use super::catalog::ToolCatalog;
use super::transport::{McpConnector, McpTransport, StreamableHttpConnector, TransportError};
use crate::core::session::SessionIdentity;
use crate::gateway::tokens::{GatewayToken, SessionTokenBroker, TokenError};
use rust_mcp_schema::{CallToolRequestParams, CallToolResult, Tool};
use serde_json::{Map, Value};
use std::error::Error as StdError;
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Upper bound on tools collected from a paginated listing.
pub const MAX_CATALOG_TOOLS: usize = 100;
/// Upper bound on listing pages followed.
pub const MAX_CATALOG_PAGES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    TokenIssued,
    Ready,
    Closed,
}

impl SessionState {
    fn successor(self) -> Option<SessionState> {
        match self {
            SessionState::Uninitialized => Some(SessionState::TokenIssued),
            SessionState::TokenIssued => Some(SessionState::Ready),
            SessionState::Ready => Some(SessionState::Closed),
            SessionState::Closed => None,
        }
    }

    /// Move to `next`. Only the immediate successor is accepted; `Closed`
    /// may be re-entered.
    pub fn advance(&mut self, next: SessionState) -> Result<(), InvalidTransition> {
        let allowed = self.successor() == Some(next)
            || (*self == SessionState::Closed && next == SessionState::Closed);
        if !allowed {
            return Err(InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::TokenIssued => "token-issued",
            SessionState::Ready => "ready",
            SessionState::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: SessionState,
    pub to: SessionState,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid session transition: {} -> {}", self.from, self.to)
    }
}

impl StdError for InvalidTransition {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogFetchError {
    Transport(String),
    Protocol(String),
}

impl fmt::Display for CatalogFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogFetchError::Transport(message) => {
                write!(f, "Failed to fetch tool catalog: {message}")
            }
            CatalogFetchError::Protocol(message) => {
                write!(f, "Unexpected tool catalog response: {message}")
            }
        }
    }
}

impl StdError for CatalogFetchError {}

impl From<TransportError> for CatalogFetchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http(message) => CatalogFetchError::Transport(message),
            TransportError::Protocol(message) => CatalogFetchError::Protocol(message),
        }
    }
}

#[derive(Debug)]
pub enum SessionError {
    Token(TokenError),
    Connect(TransportError),
    CatalogFetch(CatalogFetchError),
    Cancelled,
    NotReady { state: SessionState },
    UnknownTool(String),
    InvalidArguments { tool: String, reason: String },
    ToolCall(TransportError),
    InvalidTransition(InvalidTransition),
}

impl SessionError {
    /// The gateway rejected the session identity; the user must sign in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SessionError::Token(err) if err.is_unauthorized())
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Token(err) => write!(f, "{err}"),
            SessionError::Connect(err) => write!(f, "Failed to connect to MCP server: {err}"),
            SessionError::CatalogFetch(err) => write!(f, "{err}"),
            SessionError::Cancelled => write!(f, "MCP session setup cancelled"),
            SessionError::NotReady { state } => {
                write!(f, "MCP session is not ready (state: {state})")
            }
            SessionError::UnknownTool(name) => write!(f, "Unknown MCP tool: {name}"),
            SessionError::InvalidArguments { tool, reason } => {
                write!(f, "Invalid arguments for {tool}: {reason}")
            }
            SessionError::ToolCall(err) => write!(f, "MCP tool call failed: {err}"),
            SessionError::InvalidTransition(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for SessionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SessionError::Token(err) => Some(err),
            SessionError::Connect(err) | SessionError::ToolCall(err) => Some(err),
            SessionError::CatalogFetch(err) => Some(err),
            SessionError::InvalidTransition(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        SessionError::Token(err)
    }
}

impl From<CatalogFetchError> for SessionError {
    fn from(err: CatalogFetchError) -> Self {
        SessionError::CatalogFetch(err)
    }
}

impl From<InvalidTransition> for SessionError {
    fn from(err: InvalidTransition) -> Self {
        SessionError::InvalidTransition(err)
    }
}

/// A connected tool session. The token's secret stays in memory for the
/// lifetime of the session and is never logged.
pub struct McpToolSession {
    token: GatewayToken,
    remote_url: String,
    catalog: ToolCatalog,
    state: SessionState,
    transport: Box<dyn McpTransport>,
}

impl fmt::Debug for McpToolSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpToolSession")
            .field("token", &self.token)
            .field("remote_url", &self.remote_url)
            .field("tools", &self.catalog.len())
            .field("state", &self.state)
            .finish()
    }
}

impl McpToolSession {
    pub fn token(&self) -> &GatewayToken {
        &self.token
    }

    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn tools(&self) -> &[Tool] {
        self.catalog.tools()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<CallToolResult, SessionError> {
        if self.state != SessionState::Ready {
            return Err(SessionError::NotReady { state: self.state });
        }
        let schema = self
            .catalog
            .input_schema(name)
            .ok_or_else(|| SessionError::UnknownTool(name.to_string()))?;
        validate_arguments(name, &schema, arguments.as_ref())?;

        let mut params = CallToolRequestParams::new(name);
        if let Some(arguments) = arguments {
            params = params.with_arguments(arguments);
        }
        debug!(tool = name, remote_url = %self.remote_url, "Calling MCP tool");
        self.transport
            .call_tool(params)
            .await
            .map_err(SessionError::ToolCall)
    }

    /// Best-effort teardown. Failures are logged, never returned, and the
    /// session ends up `Closed` either way.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if let Err(err) = self.transport.close().await {
            warn!(remote_url = %self.remote_url, error = %err, "Failed to close MCP session");
        }
        self.state = SessionState::Closed;
        debug!(remote_url = %self.remote_url, token_id = %self.token.id, "Closed MCP session");
    }
}

impl Drop for McpToolSession {
    fn drop(&mut self) {
        if self.state == SessionState::Ready {
            warn!(remote_url = %self.remote_url, "MCP session dropped without close");
        }
    }
}

fn validate_arguments(
    tool: &str,
    schema: &Value,
    arguments: Option<&Map<String, Value>>,
) -> Result<(), SessionError> {
    let validator = match jsonschema::validator_for(schema) {
        Ok(validator) => validator,
        Err(err) => {
            // The server's schema is its own business; let it judge the call.
            debug!(tool, error = %err, "Skipping argument validation for uncompilable schema");
            return Ok(());
        }
    };
    let instance = Value::Object(arguments.cloned().unwrap_or_default());
    let reasons: Vec<String> = validator
        .iter_errors(&instance)
        .map(|err| err.to_string())
        .collect();
    if reasons.is_empty() {
        Ok(())
    } else {
        Err(SessionError::InvalidArguments {
            tool: tool.to_string(),
            reason: reasons.join("; "),
        })
    }
}

/// Opens tool sessions through the gateway.
pub struct McpSessionManager<C = StreamableHttpConnector> {
    broker: SessionTokenBroker,
    connector: C,
}

impl McpSessionManager<StreamableHttpConnector> {
    pub fn new(client: reqwest::Client, gateway_base_url: impl Into<String>) -> Self {
        let connector = StreamableHttpConnector::new(client.clone());
        Self::with_connector(SessionTokenBroker::new(client, gateway_base_url), connector)
    }
}

impl<C: McpConnector> McpSessionManager<C> {
    pub fn with_connector(broker: SessionTokenBroker, connector: C) -> Self {
        Self { broker, connector }
    }

    pub async fn open(
        &self,
        session: &SessionIdentity,
        remote_url: &str,
        token_name: &str,
    ) -> Result<McpToolSession, SessionError> {
        self.open_with_cancel(session, remote_url, token_name, &CancellationToken::new())
            .await
    }

    /// Like [`open`](Self::open), but gives up with [`SessionError::Cancelled`]
    /// as soon as `cancel` fires. A transport that was already connected is
    /// closed before returning.
    pub async fn open_with_cancel(
        &self,
        session: &SessionIdentity,
        remote_url: &str,
        token_name: &str,
        cancel: &CancellationToken,
    ) -> Result<McpToolSession, SessionError> {
        let mut state = SessionState::Uninitialized;

        let token = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(remote_url)),
            issued = self.broker.issue_token(session, token_name) => issued?,
        };
        state.advance(SessionState::TokenIssued)?;

        let mut transport = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(remote_url)),
            connected = self.connector.connect(remote_url, &token) => {
                connected.map_err(SessionError::Connect)?
            }
        };

        let setup = async {
            let initialize = transport
                .initialize()
                .await
                .map_err(SessionError::Connect)?;
            debug!(
                remote_url,
                server = %initialize.server_info.name,
                protocol_version = %initialize.protocol_version,
                "Initialized MCP session"
            );
            fetch_catalog(transport.as_mut())
                .await
                .map_err(SessionError::from)
        };
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(cancelled(remote_url)),
            fetched = setup => fetched,
        };
        let catalog = match outcome {
            Ok(catalog) => catalog,
            Err(err) => {
                // The server may already hold a session for this transport.
                // The issued token is left in place; the next open overwrites it.
                if let Err(close_err) = transport.close().await {
                    debug!(remote_url, error = %close_err, "Failed to close MCP transport");
                }
                return Err(err);
            }
        };
        state.advance(SessionState::Ready)?;
        info!(
            remote_url,
            token_id = %token.id,
            tools = catalog.len(),
            "MCP session ready"
        );

        Ok(McpToolSession {
            token,
            remote_url: remote_url.to_string(),
            catalog,
            state,
            transport,
        })
    }

    pub async fn close(&self, session: &mut McpToolSession) {
        session.close().await;
    }
}

fn cancelled(remote_url: &str) -> SessionError {
    debug!(remote_url, "MCP session setup cancelled");
    SessionError::Cancelled
}

async fn fetch_catalog(
    transport: &mut dyn McpTransport,
) -> Result<ToolCatalog, CatalogFetchError> {
    let mut tools = Vec::new();
    let mut cursor = None;

    for _ in 0..MAX_CATALOG_PAGES {
        let page = transport.list_tools(cursor.take()).await?;
        tools.extend(page.tools);
        if tools.len() >= MAX_CATALOG_TOOLS {
            tools.truncate(MAX_CATALOG_TOOLS);
            break;
        }
        match page.next_cursor {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => break,
        }
    }

    Ok(ToolCatalog::from_tools(tools))
}
