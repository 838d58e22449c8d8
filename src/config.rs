//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Persistence configuration
    pub persistence: PersistenceConfig,
    /// Chat configuration
    pub chat: ChatConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Directory holding the storage slot files
    pub data_dir: PathBuf,
}

/// Chat configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Delay before the simulated reply is appended (in milliseconds)
    pub reply_delay_ms: u64,
}

impl ChatConfig {
    /// Reply delay as a `Duration`
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 8080,
                host: "127.0.0.1".to_string(),
            },
            persistence: PersistenceConfig {
                data_dir: default_data_dir(),
            },
            chat: ChatConfig {
                reply_delay_ms: 1000,
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.server.port),
                host: env::var("HOST").unwrap_or(defaults.server.host),
            },
            persistence: PersistenceConfig {
                data_dir: env::var_os("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.persistence.data_dir),
            },
            chat: ChatConfig {
                reply_delay_ms: env::var("REPLY_DELAY_MS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(defaults.chat.reply_delay_ms),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// Default to ~/.agent-hub or the current directory
fn default_data_dir() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".agent-hub"),
        None => PathBuf::from(".agent-hub"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 4] = ["PORT", "HOST", "DATA_DIR", "REPLY_DELAY_MS"];

    fn clear_vars() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_vars();
        let config = Config::from_env();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.chat.reply_delay(), Duration::from_millis(1000));
        assert!(config.persistence.data_dir.ends_with(".agent-hub"));
        assert_eq!(config.server_addr(), "127.0.0.1:8080");
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_vars();
        env::set_var("PORT", "9090");
        env::set_var("HOST", "0.0.0.0");
        env::set_var("DATA_DIR", "/tmp/agent-hub-test");
        env::set_var("REPLY_DELAY_MS", "25");

        let config = Config::from_env();
        assert_eq!(config.server_addr(), "0.0.0.0:9090");
        assert_eq!(config.persistence.data_dir, PathBuf::from("/tmp/agent-hub-test"));
        assert_eq!(config.chat.reply_delay_ms, 25);
        clear_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_unparsable_numbers() {
        clear_vars();
        env::set_var("PORT", "not-a-port");
        env::set_var("REPLY_DELAY_MS", "-5");

        let config = Config::from_env();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.chat.reply_delay_ms, 1000);
        clear_vars();
    }
}
