//! Everything that talks to the trusted gateway.
//!
//! The gateway holds the real provider credentials and mints tool tokens; the
//! client only ever presents the human's session identity as a cookie.
//! - [`proxy`] rewrites outbound provider calls to go through the gateway.
//! - [`tokens`] mints the session-bound MCP token.
//! - [`settings`] reads backend chat-tool settings.

pub mod proxy;
pub mod settings;
pub mod tokens;

use crate::core::config::ClientConfig;
use crate::core::session::SessionIdentity;
use reqwest::header::{HeaderValue, InvalidHeaderValue};
use std::time::Duration;

const GATEWAY_HTTP_POOL_IDLE_TIMEOUT_SECONDS: u64 = 90;
const GATEWAY_HTTP_POOL_MAX_IDLE_PER_HOST: usize = 8;

/// Build the HTTP client shared by the proxy, broker, settings fetch and MCP
/// transport.
pub fn build_gateway_http_client(config: &ClientConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_seconds()))
        .timeout(Duration::from_secs(config.request_timeout_seconds()))
        .pool_idle_timeout(Duration::from_secs(GATEWAY_HTTP_POOL_IDLE_TIMEOUT_SECONDS))
        .pool_max_idle_per_host(GATEWAY_HTTP_POOL_MAX_IDLE_PER_HOST)
        .build()
}

/// Cookie header carrying the session identity, flagged sensitive so HTTP
/// debug output never prints it.
pub(crate) fn session_cookie(identity: &SessionIdentity) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(identity.as_str())?;
    value.set_sensitive(true);
    Ok(value)
}
