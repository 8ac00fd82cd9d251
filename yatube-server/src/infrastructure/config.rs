use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub http_port: u16,
    pub media_root: PathBuf,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first to honour a local `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;

        let http_port = match lookup("HTTP_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("HTTP_PORT is not a valid port: {raw}"))?,
            None => 3000,
        };

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(5);

        let media_root = lookup("MEDIA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("media"));

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            http_port,
            media_root,
        })
    }

    pub fn http_addr(&self) -> String {
        format!("0.0.0.0:{}", self.http_port)
    }
}
