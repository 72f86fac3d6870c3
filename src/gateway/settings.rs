use super::session_cookie;
use crate::core::config::resolver::{resolve, ChatToolConfig, ConfigEntry};
use crate::core::session::SessionIdentity;
use crate::utils::url::gateway_endpoint;
use reqwest::header::{ACCEPT, COOKIE};
use serde::Deserialize;
use std::error::Error as StdError;
use std::fmt;
use tracing::debug;

pub const SETTINGS_PATH: &str = "/settings";

#[derive(Deserialize)]
struct SettingsResponse {
    #[serde(default)]
    items: Vec<ConfigEntry>,
}

#[derive(Debug)]
pub enum SettingsError {
    Status(u16),
    Transport(reqwest::Error),
    InvalidResponse(String),
    InvalidSessionIdentity,
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Status(status) => write!(f, "Settings request failed: {status}"),
            SettingsError::Transport(err) => write!(f, "Settings request failed: {err}"),
            SettingsError::InvalidResponse(reason) => {
                write!(f, "Unexpected settings response: {reason}")
            }
            SettingsError::InvalidSessionIdentity => {
                write!(f, "Session identity is not a valid cookie value")
            }
        }
    }
}

impl StdError for SettingsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SettingsError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// Reads the backend's setting rows once at chat-session start.
#[derive(Clone)]
pub struct SettingsClient {
    client: reqwest::Client,
    backend_base_url: String,
}

impl SettingsClient {
    pub fn new(client: reqwest::Client, backend_base_url: impl Into<String>) -> Self {
        Self {
            client,
            backend_base_url: backend_base_url.into(),
        }
    }

    pub async fn fetch_entries(
        &self,
        session: &SessionIdentity,
    ) -> Result<Vec<ConfigEntry>, SettingsError> {
        let url = gateway_endpoint(&self.backend_base_url, SETTINGS_PATH);
        let cookie =
            session_cookie(session).map_err(|_| SettingsError::InvalidSessionIdentity)?;
        debug!(url = %url, "Fetching chat settings");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(COOKIE, cookie)
            .send()
            .await
            .map_err(SettingsError::Transport)?;
        if !response.status().is_success() {
            return Err(SettingsError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await.map_err(SettingsError::Transport)?;
        let settings: SettingsResponse = serde_json::from_slice(&body)
            .map_err(|err| SettingsError::InvalidResponse(err.to_string()))?;
        debug!(count = settings.items.len(), "Fetched chat settings");
        Ok(settings.items)
    }

    pub async fn fetch_chat_tool_config(
        &self,
        session: &SessionIdentity,
    ) -> Result<ChatToolConfig, SettingsError> {
        let entries = self.fetch_entries(session).await?;
        Ok(resolve(&entries))
    }
}
