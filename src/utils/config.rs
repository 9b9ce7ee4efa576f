use std::env;
use std::path::PathBuf;

use crate::utils::errors::ConfigError;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    pub bind_host: String,
    pub bind_port: u16,
    pub jwt_secret: String,
    pub cors_origin: Option<String>,
}

impl Settings {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Settings, ConfigError> {
        dotenv::dotenv().ok();
        Settings::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = read("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let bind_port = match read("BIND_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "BIND_PORT",
                value: raw,
            })?,
            None => 8080,
        };

        Ok(Settings {
            database_path: read("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("jobboard.db")),
            bind_host: read("BIND_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            bind_port,
            jwt_secret,
            cors_origin: read("CORS_ORIGIN"),
        })
    }
}
