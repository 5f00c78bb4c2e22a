//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Root configuration for the Intervue client
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat behavior settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the conversational backend
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Chat behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Directory holding the persisted session and message log
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
    /// Greeting used when a reset response carries no text;
    /// `{username}` is replaced with the session's username
    #[serde(default = "default_reset_greeting")]
    pub reset_greeting: String,
}

fn default_state_dir() -> String {
    "~/.intervue/state".to_string()
}

fn default_reset_greeting() -> String {
    "Chat has been reset. How can I help you, {username}?".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            reset_greeting: default_reset_greeting(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "~/.intervue/logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
        }
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path.to_string()
}
