//! Command-line interface parsing and handling
//!
//! A small diagnostic front end over the library: each subcommand exercises
//! one piece of the gateway trust boundary against a live deployment.

pub mod event_replay;
pub mod proxy_target;
pub mod settings_show;
pub mod tool_list;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::event_replay::replay_events;
use crate::cli::proxy_target::show_proxy_target;
use crate::cli::settings_show::show_settings;
use crate::cli::tool_list::list_tools;
use crate::core::config::ClientConfig;
use crate::core::session::SessionIdentity;
use crate::gateway::build_gateway_http_client;
use crate::logging::init_tracing;

pub const SESSION_ENV_VAR: &str = "CHATGATE_SESSION";

#[derive(Parser)]
#[command(name = "chatgate")]
#[command(version)]
#[command(about = "Inspect the chat gateway: settings, MCP tools, and proxied provider requests")]
#[command(
    long_about = "chatgate talks to the trusted chat gateway the same way the chat client does: \
provider calls are rewritten to the gateway's AI proxy with credentials stripped, MCP tool \
sessions are opened with a session-bound token, and tool-call events are rendered with output \
truncation applied.\n\n\
Environment Variables:\n\
  CHATGATE_SESSION  Session identity (cookie value) presented to the gateway\n\
  RUST_LOG          Log filter (default: chatgate=info,warn)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file (defaults to the platform config directory)
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Session identity presented to the gateway as the cookie header
    #[arg(long, global = true, env = SESSION_ENV_VAR, hide_env_values = true)]
    pub session: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch backend settings and print the resolved chat tool configuration
    Settings,
    /// Open an MCP session through the gateway and list its tools
    Tools {
        /// MCP endpoint (defaults to mcp_url from the config file)
        url: Option<String>,
        /// Name to issue the session token under
        #[arg(long)]
        token_name: Option<String>,
    },
    /// Show how a provider request is rewritten for the gateway
    ProxyTarget {
        /// Provider tag (anthropic, openai, google, or any other tag)
        provider: String,
        /// Absolute provider URL the SDK would have called
        url: String,
        /// HTTP method; POST when omitted
        #[arg(short = 'X', long)]
        method: Option<String>,
        /// Caller header, repeatable
        #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
        headers: Vec<String>,
    },
    /// Replay newline-delimited tool-call events and print what the UI shows
    Events {
        /// File with one JSON event per line; stdin when omitted
        path: Option<PathBuf>,
        /// Override the tool output limit from the config file
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<ClientConfig, Box<dyn Error>> {
    match path.or_else(ClientConfig::default_config_path) {
        Some(path) => Ok(ClientConfig::load_from_path(&path)?),
        None => Ok(ClientConfig::default()),
    }
}

fn require_session(session: Option<String>) -> Result<SessionIdentity, Box<dyn Error>> {
    match session.filter(|value| !value.trim().is_empty()) {
        Some(value) => Ok(SessionIdentity::new(value)),
        None => Err(format!("No session identity: pass --session or set {SESSION_ENV_VAR}").into()),
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = load_config(args.config)?;

    match args.command {
        Commands::Settings => {
            let session = require_session(args.session)?;
            let client = build_gateway_http_client(&config)?;
            show_settings(client, &config, &session).await
        }
        Commands::Tools { url, token_name } => {
            let session = require_session(args.session)?;
            let client = build_gateway_http_client(&config)?;
            let url = match url.or_else(|| config.mcp_url.clone()) {
                Some(url) => url,
                None => return Err("No MCP endpoint: pass a URL or set mcp_url in the config file".into()),
            };
            let token_name = token_name.unwrap_or_else(|| config.token_name().to_string());
            list_tools(client, &config, &session, &url, &token_name).await
        }
        Commands::ProxyTarget {
            provider,
            url,
            method,
            headers,
        } => {
            let session = require_session(args.session)?;
            show_proxy_target(&config, &session, &provider, &url, method.as_deref(), &headers)
        }
        Commands::Events { path, limit } => {
            let limit = limit.unwrap_or_else(|| config.tool_output_limit());
            replay_events(path.as_deref(), limit)
        }
    }
}
