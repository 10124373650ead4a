use serde::{Deserialize, Serialize};

/// Focus daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusConfig {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,
    /// Gateway listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Identity verification settings
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Ticker period in milliseconds (one elapsed second per tick)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// How long a new connection may take to present its credential
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_ms: u64,
}

/// Gateway listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Listener port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Socket address string for the listener
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Identity verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to validate connection credentials
    #[serde(default = "default_auth_secret")]
    pub secret: String,
}

impl AuthConfig {
    /// True while the built-in development secret is still in place
    pub fn is_dev_secret(&self) -> bool {
        self.secret == default_auth_secret()
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_tick_interval() -> u64 {
    1000
}

fn default_handshake_timeout() -> u64 {
    5000
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_auth_secret() -> String {
    "dev-secret-change-in-production".to_string()
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tick_interval_ms: default_tick_interval(),
            handshake_timeout_ms: default_handshake_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_auth_secret(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = FocusConfig::default();
        assert_eq!(config.global.log_level, "info");
        assert_eq!(config.global.tick_interval_ms, 1000);
        assert_eq!(config.global.handshake_timeout_ms, 5000);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert!(config.auth.is_dev_secret());
    }

    #[test]
    fn test_config_serialization() {
        let config = FocusConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: FocusConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.server.port, config.server.port);
        assert_eq!(deserialized.global.tick_interval_ms, config.global.tick_interval_ms);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: FocusConfig = toml::from_str(
            r#"
            [server]
            port = 6100
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 6100);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.global.tick_interval_ms, 1000);
    }

    #[test]
    fn test_server_addr() {
        let server = ServerConfig {
            bind: "0.0.0.0".to_string(),
            port: 7000,
        };
        assert_eq!(server.addr(), "0.0.0.0:7000");
    }

    #[test]
    fn test_custom_secret_not_dev() {
        let auth = AuthConfig {
            secret: "something-else".to_string(),
        };
        assert!(!auth.is_dev_secret());
    }
}
