// src/config.rs
use std::net::IpAddr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub db_max_connections: u32,
    pub cors_allow_origin: Option<String>,
}

impl AppConfig {
    /// Reads `.env` (when present) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let host = match lookup("HOST") {
            Some(h) => h
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::Invalid { key: "HOST", value: h })?,
            None => IpAddr::from([127, 0, 0, 1]),
        };

        let port = match lookup("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: p })?,
            None => 3000,
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(n) => match n.parse::<u32>() {
                Ok(v) if v > 0 => v,
                _ => return Err(ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", value: n }),
            },
            None => 10,
        };

        let cors_allow_origin = lookup("CORS_ALLOW_ORIGIN").filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url,
            jwt_secret,
            host,
            port,
            db_max_connections,
            cors_allow_origin,
        })
    }
}
