//! chatgate is the client half of a chat application's trust boundary.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`gateway`] rewrites provider calls so they go through the trusted
//!   gateway with credentials stripped, mints session-bound MCP tokens, and
//!   reads backend chat settings.
//! - [`mcp`] opens tool sessions with those tokens over streamable HTTP and
//!   fetches the tool catalog.
//! - [`tools`] tracks streamed tool-call events and produces display-safe
//!   output, truncating oversized results.
//! - [`core`] holds the session identity, the client config file, and the
//!   resolver that turns backend setting rows into tool-calling limits.
//!
//! The `chatgate` binary routes through [`crate::cli::main`], a diagnostic
//! front end over these layers.

pub mod cli;
pub mod core;
pub mod gateway;
pub mod logging;
pub mod mcp;
pub mod tools;
pub mod utils;
