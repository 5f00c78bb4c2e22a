//! Configuration loading and schema

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{expand_home, ChatConfig, Config, LoggingConfig, ServerConfig};
