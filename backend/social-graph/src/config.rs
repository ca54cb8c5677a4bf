//! Configuration for the social graph service
//!
//! Loads settings from environment variables, with `.env` support for local
//! development.

use anyhow::{bail, Context, Result};
use document_store::StoreConfig;
use std::env;
use std::str::FromStr;
use tracing::warn;

use crate::security::HashingConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Document store selection and pool settings
    pub store: StoreSettings,

    /// Credential hashing cost
    pub hashing: HashingConfig,

    /// GraphQL configuration
    pub graphql: GraphQLConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local store; contents are lost on restart
    Memory,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other => bail!("unknown STORE_BACKEND `{other}` (expected `memory` or `postgres`)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    /// Present iff `backend` is `Postgres`
    pub postgres: Option<StoreConfig>,
}

#[derive(Debug, Clone)]
pub struct GraphQLConfig {
    /// Serve GraphiQL on `GET /graphql`
    pub playground: bool,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present)
    ///
    /// `STORE_BACKEND` defaults to `postgres` when `DATABASE_URL` is set and
    /// to `memory` otherwise.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let backend = match env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) if env::var("DATABASE_URL").is_ok() => StoreBackend::Postgres,
            Err(_) => {
                warn!("STORE_BACKEND and DATABASE_URL not set, using in-memory store");
                StoreBackend::Memory
            }
        };

        let postgres = match backend {
            StoreBackend::Postgres => Some(
                StoreConfig::from_env()
                    .map_err(anyhow::Error::msg)
                    .context("postgres store selected")?,
            ),
            StoreBackend::Memory => None,
        };

        let hashing_defaults = HashingConfig::default();

        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env_parse("SERVER_PORT", 8080)?,
                workers: env_parse("SERVER_WORKERS", num_cpus::get())?,
            },
            store: StoreSettings { backend, postgres },
            hashing: HashingConfig {
                memory_kib: env_parse("PASSWORD_HASH_MEMORY_KIB", hashing_defaults.memory_kib)?,
                iterations: env_parse("PASSWORD_HASH_ITERATIONS", hashing_defaults.iterations)?,
                parallelism: env_parse("PASSWORD_HASH_PARALLELISM", hashing_defaults.parallelism)?,
            },
            graphql: GraphQLConfig {
                playground: env_parse("GRAPHQL_PLAYGROUND", true)?,
            },
        })
    }
}

/// Parse an optional variable; set-but-malformed is an error, not a default
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw}: {e}")),
        Err(_) => Ok(default),
    }
}
