use super::{empty_list_tools, is_method_not_found, McpConnector, McpTransport, TransportError};
use crate::gateway::tokens::GatewayToken;
use crate::mcp::protocol::{
    client_details, parse_call_tool, parse_initialize_result, parse_list_tools,
};
use crate::utils::url::parse_absolute_url;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use rust_mcp_schema::schema_utils::{
    ClientMessage, FromMessage, MessageFromClient, NotificationFromClient, RequestFromClient,
    ServerMessage,
};
use rust_mcp_schema::{
    CallToolRequestParams, CallToolResult, InitializeResult, ListToolsResult,
    PaginatedRequestParams, RequestId, LATEST_PROTOCOL_VERSION,
};
use tracing::{debug, trace};

const MCP_JSON_CONTENT_TYPE: &str = "application/json";
const MCP_JSON_AND_SSE_ACCEPT: &str = "application/json, text/event-stream";
const MCP_PROTOCOL_VERSION_HEADER: &str = "MCP-Protocol-Version";
const MCP_SESSION_ID_HEADER: &str = "mcp-session-id";

/// Splits an SSE byte stream into trimmed, non-empty lines.
#[derive(Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        self.drain_lines(false)
    }

    pub fn finish(&mut self) -> Vec<String> {
        self.drain_lines(true)
    }

    fn drain_lines(&mut self, flush: bool) -> Vec<String> {
        let mut lines = Vec::new();
        let mut start = 0;

        while let Some(offset) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            push_trimmed_line(&mut lines, &self.buffer[start..end]);
            start = end + 1;
        }

        if flush {
            push_trimmed_line(&mut lines, &self.buffer[start..]);
            self.buffer.clear();
        } else if start > 0 {
            self.buffer.drain(..start);
        }

        lines
    }
}

fn push_trimmed_line(lines: &mut Vec<String>, bytes: &[u8]) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
}

pub fn is_event_stream_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|value| value.eq_ignore_ascii_case("text/event-stream"))
}

pub fn sse_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}

/// Read an SSE response until the first JSON-RPC response or error. Server
/// requests and notifications interleaved before it are skipped.
async fn next_sse_server_message(response: reqwest::Response) -> Result<ServerMessage, TransportError> {
    let mut stream = response.bytes_stream();
    let mut buffer = SseLineBuffer::default();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| TransportError::Http(err.to_string()))?;
        for line in buffer.push(&chunk) {
            if let Some(message) = decode_sse_line(&line)? {
                return Ok(message);
            }
        }
    }

    for line in buffer.finish() {
        if let Some(message) = decode_sse_line(&line)? {
            return Ok(message);
        }
    }

    Err(TransportError::Protocol(
        "Empty event-stream response.".to_string(),
    ))
}

fn decode_sse_line(line: &str) -> Result<Option<ServerMessage>, TransportError> {
    let Some(payload) = sse_data_payload(line).filter(|payload| !payload.is_empty()) else {
        return Ok(None);
    };

    let message = serde_json::from_str::<ServerMessage>(payload)
        .map_err(|err| TransportError::Protocol(err.to_string()))?;
    match message {
        ServerMessage::Response(_) | ServerMessage::Error(_) => Ok(Some(message)),
        other => {
            trace!(message = ?other, "Skipping interleaved MCP server message");
            Ok(None)
        }
    }
}

/// MCP over streamable HTTP, authenticated with the session's gateway token.
pub struct StreamableHttpTransport {
    client: reqwest::Client,
    endpoint: String,
    authorization: HeaderValue,
    session_id: Option<String>,
    negotiated_protocol_version: Option<String>,
    next_request_id: i64,
}

impl StreamableHttpTransport {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        token: &GatewayToken,
    ) -> Result<Self, TransportError> {
        parse_absolute_url(endpoint).map_err(TransportError::Http)?;
        let mut authorization = HeaderValue::from_str(&token.bearer()).map_err(|_| {
            TransportError::Http("MCP token is not a valid header value".to_string())
        })?;
        authorization.set_sensitive(true);

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            authorization,
            session_id: None,
            negotiated_protocol_version: None,
            next_request_id: 0,
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn protocol_version(&self) -> &str {
        match self.negotiated_protocol_version.as_deref() {
            Some(version) if !version.trim().is_empty() => version,
            _ => LATEST_PROTOCOL_VERSION,
        }
    }

    fn with_session_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header(MCP_PROTOCOL_VERSION_HEADER, self.protocol_version())
            .header(AUTHORIZATION, self.authorization.clone());
        match &self.session_id {
            Some(session_id) => request.header(MCP_SESSION_ID_HEADER, session_id),
            None => request,
        }
    }

    fn post(&self, payload: String) -> reqwest::RequestBuilder {
        self.with_session_headers(
            self.client
                .post(&self.endpoint)
                .header(CONTENT_TYPE, MCP_JSON_CONTENT_TYPE)
                .header(ACCEPT, MCP_JSON_AND_SSE_ACCEPT),
        )
        .body(payload)
    }

    fn remember_session_id(&mut self, response: &reqwest::Response) {
        if let Some(session_id) = response
            .headers()
            .get(MCP_SESSION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            self.session_id = Some(session_id.to_string());
        }
    }

    async fn send_request(
        &mut self,
        request: RequestFromClient,
    ) -> Result<ServerMessage, TransportError> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        let message = ClientMessage::from_message(
            MessageFromClient::RequestFromClient(request),
            Some(RequestId::Integer(request_id)),
        )
        .map_err(|err| TransportError::Protocol(err.to_string()))?;
        let payload =
            serde_json::to_string(&message).map_err(|err| TransportError::Protocol(err.to_string()))?;

        debug!(url = %self.endpoint, request_id, "Sending MCP HTTP request");
        let response = self
            .post(payload)
            .send()
            .await
            .map_err(|err| TransportError::Http(err.to_string()))?;
        if !response.status().is_success() {
            return Err(TransportError::Http(format!(
                "HTTP error: {}",
                response.status()
            )));
        }
        self.remember_session_id(&response);

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        if is_event_stream_content_type(&content_type) {
            next_sse_server_message(response).await
        } else {
            let body = response
                .bytes()
                .await
                .map_err(|err| TransportError::Http(err.to_string()))?;
            serde_json::from_slice::<ServerMessage>(&body)
                .map_err(|err| TransportError::Protocol(err.to_string()))
        }
    }

    async fn send_notification(
        &mut self,
        notification: NotificationFromClient,
    ) -> Result<(), TransportError> {
        let message = ClientMessage::from_message(
            MessageFromClient::NotificationFromClient(notification),
            None,
        )
        .map_err(|err| TransportError::Protocol(err.to_string()))?;
        let payload =
            serde_json::to_string(&message).map_err(|err| TransportError::Protocol(err.to_string()))?;

        let response = self
            .post(payload)
            .send()
            .await
            .map_err(|err| TransportError::Http(err.to_string()))?;
        if !response.status().is_success() {
            return Err(TransportError::Http(format!(
                "HTTP error: {}",
                response.status()
            )));
        }
        self.remember_session_id(&response);
        Ok(())
    }
}

#[async_trait]
impl McpTransport for StreamableHttpTransport {
    async fn initialize(&mut self) -> Result<InitializeResult, TransportError> {
        let response = self
            .send_request(RequestFromClient::InitializeRequest(client_details(
                LATEST_PROTOCOL_VERSION,
            )))
            .await?;
        let initialize = parse_initialize_result(response)?;
        self.negotiated_protocol_version = Some(initialize.protocol_version.clone());
        self.send_notification(NotificationFromClient::InitializedNotification(None))
            .await?;
        Ok(initialize)
    }

    async fn list_tools(
        &mut self,
        cursor: Option<String>,
    ) -> Result<ListToolsResult, TransportError> {
        let params = cursor.map(|cursor| PaginatedRequestParams {
            cursor: Some(cursor),
            meta: None,
        });
        let response = self
            .send_request(RequestFromClient::ListToolsRequest(params))
            .await?;
        if is_method_not_found(&response) {
            return Ok(empty_list_tools());
        }
        parse_list_tools(response)
    }

    async fn call_tool(
        &mut self,
        params: CallToolRequestParams,
    ) -> Result<CallToolResult, TransportError> {
        let response = self
            .send_request(RequestFromClient::CallToolRequest(params))
            .await?;
        parse_call_tool(response)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.session_id.is_none() {
            return Ok(());
        }

        let response = self
            .with_session_headers(self.client.delete(&self.endpoint))
            .send()
            .await
            .map_err(|err| TransportError::Http(err.to_string()))?;
        self.session_id = None;

        let status = response.status();
        // 405: the server does not support client-initiated termination.
        if status.is_success() || status == StatusCode::METHOD_NOT_ALLOWED {
            Ok(())
        } else {
            Err(TransportError::Http(format!("HTTP error: {status}")))
        }
    }
}

/// Opens [`StreamableHttpTransport`]s. Connecting is local; the first network
/// round trip is the initialize handshake.
#[derive(Clone)]
pub struct StreamableHttpConnector {
    client: reqwest::Client,
}

impl StreamableHttpConnector {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl McpConnector for StreamableHttpConnector {
    async fn connect(
        &self,
        remote_url: &str,
        token: &GatewayToken,
    ) -> Result<Box<dyn McpTransport>, TransportError> {
        let transport = StreamableHttpTransport::new(self.client.clone(), remote_url, token)?;
        Ok(Box::new(transport))
    }
}
