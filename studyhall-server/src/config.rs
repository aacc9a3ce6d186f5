// Copyright 2025 Studyhall Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Studyhall server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP API listen address (e.g., "127.0.0.1:8700")
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    /// Upper bound on streaming handler execution, in seconds
    #[serde(default = "default_stream_timeout")]
    pub stream_timeout_secs: u64,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://studyhall.db")
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Enable authentication (default: false for development)
    #[serde(default)]
    pub enabled: bool,

    /// JWT secret for token validation (required if auth enabled)
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Groq API key (OpenAI-compatible hosted endpoint)
    pub groq_api_key: Option<String>,

    /// Groq API base URL
    #[serde(default = "default_groq_base_url")]
    pub groq_base_url: String,

    /// Ollama base URL (e.g., "http://localhost:11434")
    pub ollama_base_url: Option<String>,

    /// Provider used for completions: "groq" or "ollama"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier sent with every completion request
    #[serde(default = "default_model")]
    pub model: String,
}

// Default values
fn default_http_addr() -> String {
    "127.0.0.1:8700".to_string()
}

fn default_stream_timeout() -> u64 {
    30
}

fn default_enable_cors() -> bool {
    true
}

fn default_database_url() -> String {
    "sqlite://studyhall.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_provider() -> String {
    "groq".to_string()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
            stream_timeout_secs: default_stream_timeout(),
            enable_cors: default_enable_cors(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            jwt_secret: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            groq_base_url: default_groq_base_url(),
            ollama_base_url: None,
            provider: default_provider(),
            model: default_model(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - STUDYHALL_HTTP_ADDR: HTTP listen address
    /// - STUDYHALL_DATABASE_URL: database URL
    /// - STUDYHALL_AUTH_ENABLED: enable authentication
    /// - STUDYHALL_JWT_SECRET: JWT secret for token validation
    /// - STUDYHALL_STREAM_TIMEOUT: streaming handler timeout in seconds
    /// - STUDYHALL_ENABLE_CORS: enable CORS
    /// - STUDYHALL_LLM_PROVIDER / STUDYHALL_LLM_MODEL: completion routing
    /// - GROQ_API_KEY, GROQ_BASE_URL, OLLAMA_BASE_URL: provider credentials
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("STUDYHALL_HTTP_ADDR") {
            config.server.listen_addr = addr;
        }

        if let Ok(timeout) = std::env::var("STUDYHALL_STREAM_TIMEOUT") {
            if let Ok(val) = timeout.parse() {
                config.server.stream_timeout_secs = val;
            }
        }

        if let Ok(cors) = std::env::var("STUDYHALL_ENABLE_CORS") {
            config.server.enable_cors = cors.parse().unwrap_or(true);
        }

        if let Ok(url) = std::env::var("STUDYHALL_DATABASE_URL") {
            config.database.url = url;
        }

        if let Ok(enabled) = std::env::var("STUDYHALL_AUTH_ENABLED") {
            config.auth.enabled = enabled.parse().unwrap_or(false);
        }

        if let Ok(secret) = std::env::var("STUDYHALL_JWT_SECRET") {
            config.auth.jwt_secret = Some(secret);
        }

        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            config.llm.groq_api_key = Some(key);
        }

        if let Ok(base_url) = std::env::var("GROQ_BASE_URL") {
            config.llm.groq_base_url = base_url;
        }

        if let Ok(base_url) = std::env::var("OLLAMA_BASE_URL") {
            config.llm.ollama_base_url = Some(base_url);
        }

        if let Ok(provider) = std::env::var("STUDYHALL_LLM_PROVIDER") {
            config.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("STUDYHALL_LLM_MODEL") {
            config.llm.model = model;
        }

        config
    }

    /// Load configuration with priority: file > env > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::from_env()
            }
        } else {
            Self::from_env()
        };

        // Credentials always come through from the environment, even when a
        // config file is present but silent on them.
        if config.llm.groq_api_key.is_none() {
            if let Ok(key) = std::env::var("GROQ_API_KEY") {
                config.llm.groq_api_key = Some(key);
            }
        }
        if config.auth.jwt_secret.is_none() {
            if let Ok(secret) = std::env::var("STUDYHALL_JWT_SECRET") {
                config.auth.jwt_secret = Some(secret);
            }
        }

        Ok(config)
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        if self.auth.enabled && self.auth.jwt_secret.is_none() {
            anyhow::bail!("Authentication enabled but no JWT secret configured");
        }

        match self.llm.provider.as_str() {
            "groq" | "ollama" => {}
            other => anyhow::bail!("Unknown completion provider: {}", other),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:8700");
        assert_eq!(config.database.url, "sqlite://studyhall.db");
        assert!(!config.auth.enabled);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_requires_secret() {
        let mut config = ServerConfig::default();
        config.auth.enabled = true;
        assert!(config.validate().is_err());

        config.auth.jwt_secret = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config: ServerConfig = toml::from_str(
            r#"
            [server]
            listen_addr = "0.0.0.0:9000"

            [llm]
            provider = "ollama"
            ollama_base_url = "http://localhost:11434"
            model = "llama2"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model, "llama2");
        // Untouched sections fall back to defaults
        assert_eq!(config.database.max_connections, 5);
    }
}
