//! Credential-stripping rewrite of outbound provider calls.
//!
//! Every provider request leaves the client addressed to the gateway's
//! `/api/ai-proxy` endpoint, with the original URL carried in the `target`
//! query parameter. Provider credentials are removed and the session cookie is
//! the only identity the gateway sees; it attaches the real API key itself.

use super::session_cookie;
use crate::core::session::SessionIdentity;
use crate::utils::url::{gateway_endpoint, parse_absolute_url};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use reqwest::{Method, Url};
use std::error::Error as StdError;
use std::fmt;
use tracing::debug;

pub const AI_PROXY_PATH: &str = "/api/ai-proxy";
pub const TARGET_PARAM: &str = "target";
pub const PROVIDER_PARAM: &str = "provider";

/// Headers that carry provider credentials or caller identity. Compared
/// case-insensitively; nothing else is ever removed.
const STRIPPED_CREDENTIAL_HEADERS: [&str; 3] = ["authorization", "x-api-key", "x-goog-api-key"];

pub fn is_stripped_header(name: &str) -> bool {
    STRIPPED_CREDENTIAL_HEADERS
        .iter()
        .any(|stripped| stripped.eq_ignore_ascii_case(name))
}

/// Provider tag sent to the gateway. Unrecognised tags are passed through
/// untouched; the gateway decides whether it accepts them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Provider {
    Anthropic,
    OpenAi,
    Google,
    Other(String),
}

impl Provider {
    pub fn tag(&self) -> &str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
            Provider::Google => "google",
            Provider::Other(tag) => tag,
        }
    }
}

impl From<&str> for Provider {
    fn from(tag: &str) -> Self {
        match tag {
            "anthropic" => Provider::Anthropic,
            "openai" => Provider::OpenAi,
            "google" => Provider::Google,
            other => Provider::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The caller's original request URL, either already parsed or as text.
#[derive(Debug, Clone)]
pub enum RequestTarget {
    Url(Url),
    Raw(String),
}

impl RequestTarget {
    /// Absolute URL string to forward. Raw strings are validated but passed
    /// on exactly as written so the gateway sees the caller's URL unchanged.
    fn resolve(&self) -> Result<String, ProxyError> {
        match self {
            RequestTarget::Url(url) => Ok(url.as_str().to_string()),
            RequestTarget::Raw(raw) => {
                parse_absolute_url(raw).map_err(ProxyError::InvalidTarget)?;
                Ok(raw.clone())
            }
        }
    }
}

impl From<Url> for RequestTarget {
    fn from(url: Url) -> Self {
        RequestTarget::Url(url)
    }
}

impl From<&Url> for RequestTarget {
    fn from(url: &Url) -> Self {
        RequestTarget::Url(url.clone())
    }
}

impl From<String> for RequestTarget {
    fn from(raw: String) -> Self {
        RequestTarget::Raw(raw)
    }
}

impl From<&str> for RequestTarget {
    fn from(raw: &str) -> Self {
        RequestTarget::Raw(raw.to_string())
    }
}

/// What the provider SDK would have sent: method, headers and body.
#[derive(Debug, Clone, Default)]
pub struct ProxyRequestInit {
    pub method: Option<Method>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ProxyRequestInit {
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A provider call rewritten to target the gateway.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub target_url: Url,
    pub provider: Provider,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl ProviderRequest {
    /// Decoded `target` query parameter: the caller's original URL.
    pub fn original_target(&self) -> Option<String> {
        self.target_url
            .query_pairs()
            .find(|(name, _)| name == TARGET_PARAM)
            .map(|(_, value)| value.into_owned())
    }
}

#[derive(Debug)]
pub enum ProxyError {
    /// The caller's URL is not absolute.
    InvalidTarget(String),
    /// The configured gateway base URL does not form a valid endpoint.
    InvalidGateway(String),
    /// A caller header name or value is not valid HTTP.
    InvalidHeader { name: String },
    /// The session identity cannot be carried in a cookie header.
    InvalidSessionIdentity,
    /// The request never produced a response.
    Transport(reqwest::Error),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::InvalidTarget(reason) => write!(f, "Invalid provider URL: {reason}"),
            ProxyError::InvalidGateway(reason) => write!(f, "Invalid gateway URL: {reason}"),
            ProxyError::InvalidHeader { name } => write!(f, "Invalid request header: {name}"),
            ProxyError::InvalidSessionIdentity => {
                write!(f, "Session identity is not a valid cookie value")
            }
            ProxyError::Transport(err) => write!(f, "Gateway request failed: {err}"),
        }
    }
}

impl StdError for ProxyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ProxyError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// Rewrite a provider request so it is addressed to the gateway and carries
/// no provider credentials.
pub fn build_proxied_request(
    gateway_base_url: &str,
    session: &SessionIdentity,
    provider: &Provider,
    input: impl Into<RequestTarget>,
    init: Option<ProxyRequestInit>,
) -> Result<ProviderRequest, ProxyError> {
    let original = input.into().resolve()?;
    let init = init.unwrap_or_default();

    let mut target_url = Url::parse(&gateway_endpoint(gateway_base_url, AI_PROXY_PATH))
        .map_err(|err| ProxyError::InvalidGateway(err.to_string()))?;
    target_url
        .query_pairs_mut()
        .append_pair(TARGET_PARAM, &original)
        .append_pair(PROVIDER_PARAM, provider.tag());

    let mut headers = HeaderMap::with_capacity(init.headers.len() + 1);
    for (name, value) in &init.headers {
        if is_stripped_header(name) {
            continue;
        }
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ProxyError::InvalidHeader { name: name.clone() })?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| ProxyError::InvalidHeader { name: name.clone() })?;
        headers.append(header_name, header_value);
    }
    // `insert` drops every caller-supplied cookie value.
    headers.insert(
        COOKIE,
        session_cookie(session).map_err(|_| ProxyError::InvalidSessionIdentity)?,
    );

    Ok(ProviderRequest {
        target_url,
        provider: provider.clone(),
        method: init.method.unwrap_or(Method::POST),
        headers,
        body: init.body,
    })
}

/// Sends provider calls through the gateway on behalf of one session.
#[derive(Clone)]
pub struct CredentialProxy {
    client: reqwest::Client,
    gateway_base_url: String,
    session: SessionIdentity,
}

impl CredentialProxy {
    pub fn new(
        client: reqwest::Client,
        gateway_base_url: impl Into<String>,
        session: SessionIdentity,
    ) -> Self {
        Self {
            client,
            gateway_base_url: gateway_base_url.into(),
            session,
        }
    }

    pub fn build(
        &self,
        provider: &Provider,
        input: impl Into<RequestTarget>,
        init: Option<ProxyRequestInit>,
    ) -> Result<ProviderRequest, ProxyError> {
        build_proxied_request(&self.gateway_base_url, &self.session, provider, input, init)
    }

    /// Perform exactly one request. Non-success statuses are returned as the
    /// untouched response; only transport failures become errors.
    pub async fn fetch(
        &self,
        provider: &Provider,
        input: impl Into<RequestTarget>,
        init: Option<ProxyRequestInit>,
    ) -> Result<reqwest::Response, ProxyError> {
        let request = self.build(provider, input, init)?;
        debug!(
            provider = %request.provider,
            method = %request.method,
            "Forwarding provider request through gateway"
        );

        let mut builder = self
            .client
            .request(request.method, request.target_url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        builder.send().await.map_err(ProxyError::Transport)
    }
}
