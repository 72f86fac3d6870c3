pub mod data;
pub mod defaults;
pub mod io;
pub mod resolver;

pub use data::ClientConfig;
pub use io::ConfigError;
pub use resolver::{resolve, ChatToolConfig, ConfigEntry};
