use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_TOKEN_NAME: &str = "chatgate-session";
pub const DEFAULT_TOOL_OUTPUT_LIMIT: usize = 10_000;
pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 60;

/// Per-deployment client settings, read from `config.toml`.
///
/// Everything here is local wiring (where the gateway lives, which MCP
/// server to open). Chat-tool behaviour comes from the backend settings and
/// is resolved separately by [`super::resolver::resolve`].
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the trusted gateway (token issuance and AI proxy).
    pub gateway_url: Option<String>,
    /// Base URL of the settings backend; the gateway when unset.
    pub backend_url: Option<String>,
    /// Remote MCP endpoint opened at chat-session start.
    pub mcp_url: Option<String>,
    /// Name under which the session's tool token is issued.
    pub token_name: Option<String>,
    /// Character limit above which tool output is replaced by a preview.
    pub tool_output_limit: Option<usize>,
    pub connect_timeout_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
}

impl ClientConfig {
    pub fn gateway_url(&self) -> &str {
        self.gateway_url.as_deref().unwrap_or(DEFAULT_GATEWAY_URL)
    }

    pub fn backend_url(&self) -> &str {
        self.backend_url
            .as_deref()
            .unwrap_or_else(|| self.gateway_url())
    }

    pub fn token_name(&self) -> &str {
        self.token_name.as_deref().unwrap_or(DEFAULT_TOKEN_NAME)
    }

    pub fn tool_output_limit(&self) -> usize {
        self.tool_output_limit.unwrap_or(DEFAULT_TOOL_OUTPUT_LIMIT)
    }

    pub fn connect_timeout_seconds(&self) -> u64 {
        self.connect_timeout_seconds
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECONDS)
    }

    pub fn request_timeout_seconds(&self) -> u64 {
        self.request_timeout_seconds
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS)
    }
}

/// Get a user-friendly display string for a path, using `~` for the home
/// directory on Unix-like systems.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
