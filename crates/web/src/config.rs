use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use export::logo::DEFAULT_LOGO_URL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("Unknown STORE_BACKEND '{}', expected postgres or memory", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub public_base_url: String,
    pub logo_url: String,
    pub assets_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = get("HOST").context("Cannot load HOST env variable")?;
        let port: u16 = get("PORT")
            .context("Cannot load PORT env variable")?
            .parse()
            .context("PORT must be a number")?;

        let store_backend = match get("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::Postgres,
        };

        let database_url = get("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("Cannot load DATABASE_URL env variable"));
        }

        Ok(Self {
            public_base_url: get("PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port)),
            logo_url: get("LOGO_URL").unwrap_or_else(|| DEFAULT_LOGO_URL.to_string()),
            assets_dir: get("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets")),
            host,
            port,
            store_backend,
            database_url,
        })
    }
}
