//! Session-bound MCP token issuance.
//!
//! Tokens are issued with `overwrite: true`, so re-issuing under the same name
//! (page reloads, reconnects) replaces the previous token on the gateway
//! instead of piling up live ones. The plaintext secret is only ever returned
//! by this call and lives in memory for the chat session.

use super::session_cookie;
use crate::core::session::SessionIdentity;
use crate::utils::url::gateway_endpoint;
use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use tracing::{debug, info};

pub const MCP_TOKENS_PATH: &str = "/api/auth/mcp-tokens";

#[derive(Serialize)]
struct IssueTokenRequest<'a> {
    name: &'a str,
    overwrite: bool,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayToken {
    pub id: String,
    #[serde(rename = "token")]
    pub plaintext_secret: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl GatewayToken {
    /// `Authorization` header value for the MCP transport.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.plaintext_secret)
    }
}

impl fmt::Debug for GatewayToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayToken")
            .field("id", &self.id)
            .field("plaintext_secret", &"<redacted>")
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("revoked_at", &self.revoked_at)
            .finish()
    }
}

/// The gateway refused to issue a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCreationError {
    pub status: u16,
}

impl TokenCreationError {
    /// The session identity was not accepted; the user must sign in again.
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED.as_u16()
    }
}

impl fmt::Display for TokenCreationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unauthorized() {
            write!(f, "Failed to create MCP token: session is not authorized ({})", self.status)
        } else {
            write!(f, "Failed to create MCP token: {}", self.status)
        }
    }
}

impl StdError for TokenCreationError {}

#[derive(Debug)]
pub enum TokenError {
    Creation(TokenCreationError),
    Transport(reqwest::Error),
    InvalidResponse(String),
    InvalidSessionIdentity,
}

impl TokenError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TokenError::Creation(err) if err.is_unauthorized())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TokenError::Creation(err) => Some(err.status),
            _ => None,
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Creation(err) => write!(f, "{err}"),
            TokenError::Transport(err) => write!(f, "Token request failed: {err}"),
            TokenError::InvalidResponse(reason) => {
                write!(f, "Unexpected token response: {reason}")
            }
            TokenError::InvalidSessionIdentity => {
                write!(f, "Session identity is not a valid cookie value")
            }
        }
    }
}

impl StdError for TokenError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TokenError::Creation(err) => Some(err),
            TokenError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TokenCreationError> for TokenError {
    fn from(err: TokenCreationError) -> Self {
        TokenError::Creation(err)
    }
}

/// Mints tool-access tokens by talking directly to the gateway (never through
/// the AI proxy).
#[derive(Clone)]
pub struct SessionTokenBroker {
    client: reqwest::Client,
    gateway_base_url: String,
}

impl SessionTokenBroker {
    pub fn new(client: reqwest::Client, gateway_base_url: impl Into<String>) -> Self {
        Self {
            client,
            gateway_base_url: gateway_base_url.into(),
        }
    }

    pub fn gateway_base_url(&self) -> &str {
        &self.gateway_base_url
    }

    /// One request, no retry.
    pub async fn issue_token(
        &self,
        session: &SessionIdentity,
        token_name: &str,
    ) -> Result<GatewayToken, TokenError> {
        let url = gateway_endpoint(&self.gateway_base_url, MCP_TOKENS_PATH);
        let cookie = session_cookie(session).map_err(|_| TokenError::InvalidSessionIdentity)?;
        debug!(url = %url, token_name, "Requesting MCP token");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(COOKIE, cookie)
            .json(&IssueTokenRequest {
                name: token_name,
                overwrite: true,
            })
            .send()
            .await
            .map_err(TokenError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TokenCreationError {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(TokenError::Transport)?;
        let token: GatewayToken = serde_json::from_slice(&body)
            .map_err(|err| TokenError::InvalidResponse(err.to_string()))?;
        info!(token_id = %token.id, token_name = %token.name, "Issued MCP token");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{MockHttpServer, MockResponse};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn token_body(id: &str, token: &str, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "token": token,
            "name": name,
            "createdAt": "2026-10-19T12:00:00Z"
        })
    }

    #[tokio::test]
    async fn created_response_yields_token_with_plaintext_secret() {
        let server =
            MockHttpServer::start(|_, _| MockResponse::json(201, token_body("t1", "abc", "n")))
                .await;
        let broker = SessionTokenBroker::new(reqwest::Client::new(), &server.base_url);

        let token = broker
            .issue_token(&SessionIdentity::new("sid=1"), "n")
            .await
            .expect("token should be issued");

        assert_eq!(token.plaintext_secret, "abc");
        assert_eq!(token.id, "t1");
        assert_eq!(token.name, "n");
        assert_eq!(token.expires_at, None);
        assert_eq!(token.bearer(), "Bearer abc");
        assert!(!format!("{token:?}").contains("abc"));

        let captured = server.captured().await;
        assert_eq!(captured.len(), 1);
        let request = &captured[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.target, MCP_TOKENS_PATH);
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("cookie"), Some("sid=1"));
        assert_eq!(
            request.json_body(),
            serde_json::json!({"name": "n", "overwrite": true})
        );
    }

    #[tokio::test]
    async fn error_statuses_yield_creation_error_without_token() {
        for status in [400_u16, 401, 403, 404, 500] {
            let server =
                MockHttpServer::start(move |_, _| MockResponse::text(status, "nope")).await;
            let broker = SessionTokenBroker::new(reqwest::Client::new(), &server.base_url);

            let err = broker
                .issue_token(&SessionIdentity::new("sid=1"), "n")
                .await
                .expect_err("status should fail");

            assert_eq!(err.status(), Some(status));
            assert_eq!(err.is_unauthorized(), status == 401);
            // One attempt only.
            assert_eq!(server.captured().await.len(), 1);
        }
    }

    #[tokio::test]
    async fn malformed_success_body_is_reported() {
        let server =
            MockHttpServer::start(|_, _| MockResponse::json(201, serde_json::json!({"id": 1})))
                .await;
        let broker = SessionTokenBroker::new(reqwest::Client::new(), &server.base_url);

        let err = broker
            .issue_token(&SessionIdentity::new("sid=1"), "n")
            .await
            .expect_err("body should be rejected");
        assert!(matches!(err, TokenError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn reissuing_with_overwrite_keeps_one_live_token_per_name() {
        let live: Arc<Mutex<HashMap<String, String>>> = Arc::new(Mutex::new(HashMap::new()));
        let gateway_state = Arc::clone(&live);
        let server = MockHttpServer::start(move |request, index| {
            let body = request.json_body();
            let name = body["name"].as_str().unwrap_or_default().to_string();
            let overwrite = body["overwrite"].as_bool().unwrap_or(false);
            let mut live = gateway_state.lock().expect("gateway state");
            if live.contains_key(&name) && !overwrite {
                return MockResponse::json(409, serde_json::json!({"error": "exists"}));
            }
            let id = format!("t{index}");
            live.insert(name.clone(), id.clone());
            MockResponse::json(201, token_body(&id, &format!("secret-{index}"), &name))
        })
        .await;
        let broker = SessionTokenBroker::new(reqwest::Client::new(), &server.base_url);
        let session = SessionIdentity::new("sid=1");

        let first = broker.issue_token(&session, "chat").await.expect("first");
        let second = broker.issue_token(&session, "chat").await.expect("second");
        let third = broker.issue_token(&session, "chat").await.expect("third");

        assert_ne!(first.id, second.id);
        assert_ne!(second.plaintext_secret, third.plaintext_secret);
        let live = live.lock().expect("gateway state");
        assert_eq!(live.len(), 1);
        assert_eq!(live.get("chat"), Some(&third.id));
    }
}
