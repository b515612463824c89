use std::path::PathBuf;

use axum::http::HeaderValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a port number, got {0:?}")]
    InvalidPort(String),
    #[error("USERS_STORE must be `memory` or `file`, got {0:?}")]
    UnknownStore(String),
    #[error("CORS_ORIGIN is not a valid header value: {0:?}")]
    InvalidOrigin(String),
}

/// Which key-value backend holds the user collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    File { dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigin {
    Any,
    Exact(HeaderValue),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub cors_origin: CorsOrigin,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port = match var("APP_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 8080,
        };

        let store = match var("USERS_STORE").as_deref().unwrap_or("memory") {
            "memory" => StoreConfig::Memory,
            "file" => StoreConfig::File {
                dir: var("USERS_STORE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./data")),
            },
            other => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        let origin = var("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".into());
        let cors_origin = if origin == "*" {
            CorsOrigin::Any
        } else {
            HeaderValue::from_str(&origin)
                .map(CorsOrigin::Exact)
                .map_err(|_| ConfigError::InvalidOrigin(origin))?
        };

        Ok(Self {
            host,
            port,
            store,
            cors_origin,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
