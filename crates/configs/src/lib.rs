//! quillpress/crates/configs/src/lib.rs
//!
//! Layered application configuration: built-in defaults, an optional
//! `quillpress.toml`, then environment variables with a `QP__` prefix
//! (e.g. `QP__SERVER__PORT=8080`). Secrets stay wrapped in
//! `secrecy::SecretString` so they never land in debug output.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string; unused under the in-memory profile.
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the external identity provider.
    pub session_secret: SecretString,
    pub session_ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// tracing-subscriber env-filter directive, e.g. "info,services=debug".
    pub filter: String,
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Defaults → `quillpress.toml` (optional) → `QP__*` environment.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "postgres://localhost/quillpress")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_secret", "dev-session-secret")?
            .set_default("auth.session_ttl_hours", 24 * 7)?
            .set_default("log.filter", "info")?
            .set_default("log.json", false)?
            .add_source(config::File::with_name("quillpress").required(false))
            .add_source(config::Environment::with_prefix("QP").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
