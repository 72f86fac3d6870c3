//! Model Context Protocol client side: transports, catalog, and sessions
//! opened through the gateway.

pub mod catalog;
pub mod protocol;
pub mod session;
pub mod transport;

pub use catalog::ToolCatalog;
pub use session::{
    CatalogFetchError, McpSessionManager, McpToolSession, SessionError, SessionState,
};
