//! PostgreSQL document backend
//!
//! All collections share one `documents` table keyed by `(collection, id)`
//! with the fields in a JSONB `body`. Filters map onto JSONB operators:
//! - `FieldEquals`  -> `body -> field = value`
//! - `FieldContains` -> `body @> {field: [value]}` (served by the GIN index)
//! - `IdIn`         -> `id = ANY(ids)`

use async_trait::async_trait;
use serde_json::Value;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::Postgres;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    Collection, Document, DocumentId, DocumentStore, FieldUpdateSet, Filter, StoreError,
    StoreResult, StoreSession, StoredDocument,
};

/// Connection pool configuration for the PostgreSQL backend
#[derive(Clone)]
pub struct StoreConfig {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection creation timeout
    pub connect_timeout_secs: u64,
    /// Session acquisition timeout (get connection from pool)
    pub acquire_timeout_secs: u64,
    /// Connection idle timeout
    pub idle_timeout_secs: u64,
    /// Connection maximum lifetime
    pub max_lifetime_secs: u64,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .finish()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout_secs: 5,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

impl StoreConfig {
    /// Read pool settings from the environment; `DATABASE_URL` is required
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable not set".to_string())?;
        let defaults = Self::default();

        Ok(Self {
            database_url,
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: env_or("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connect_timeout_secs: env_or("DB_CONNECT_TIMEOUT_SECS", defaults.connect_timeout_secs)?,
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout_secs)?,
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
            max_lifetime_secs: env_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs)?,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    parse_setting(key, std::env::var(key).ok(), default)
}

/// Unset falls back to `default`; set-but-malformed is an error
fn parse_setting<T>(key: &str, raw: Option<String>, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("invalid {key}={raw}: {e}")),
        None => Ok(default),
    }
}

/// PostgreSQL-backed [`DocumentStore`]
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build the pool and verify it with a round-trip
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        debug!(
            max = config.max_connections,
            min = config.min_connections,
            acquire_timeout_secs = config.acquire_timeout_secs,
            "Creating document store pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .test_before_acquire(true)
            .connect(&config.database_url)
            .await?;

        match tokio::time::timeout(
            Duration::from_secs(config.connect_timeout_secs),
            sqlx::query("SELECT 1").execute(&pool),
        )
        .await
        {
            Ok(Ok(_)) => {
                info!("Document store pool created and verified");
                Ok(Self::new(pool))
            }
            Ok(Err(e)) => {
                error!(error = %e, "Document store connection verification failed");
                Err(e.into())
            }
            Err(_) => {
                error!(
                    timeout_secs = config.connect_timeout_secs,
                    "Document store connection verification timeout"
                );
                Err(StoreError::Unavailable(format!(
                    "connection verification timed out after {}s",
                    config.connect_timeout_secs
                )))
            }
        }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Document store migrations applied");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn open_session(&self) -> StoreResult<Box<dyn StoreSession>> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgSession { conn }))
    }
}

/// Session holding one pooled connection; the connection returns to the
/// pool when the session is dropped.
struct PgSession {
    conn: PoolConnection<Postgres>,
}

type Row = (Uuid, Json<Document>);

fn into_stored((id, Json(body)): Row) -> StoredDocument {
    StoredDocument {
        id: DocumentId::new(id.to_string()),
        body,
    }
}

/// Identifiers that are not UUIDs cannot name a row in this backend
fn parse_id(id: &DocumentId) -> Option<Uuid> {
    Uuid::parse_str(id.as_str()).ok()
}

#[async_trait]
impl StoreSession for PgSession {
    async fn create(
        &mut self,
        collection: Collection,
        body: Document,
    ) -> StoreResult<StoredDocument> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&body))
        .execute(&mut *self.conn)
        .await?;

        Ok(StoredDocument {
            id: DocumentId::new(id.to_string()),
            body,
        })
    }

    async fn find_all(&mut self, collection: Collection) -> StoreResult<Vec<StoredDocument>> {
        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT id, body FROM documents
            WHERE collection = $1
            ORDER BY seq
            "#,
        )
        .bind(collection.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(into_stored).collect())
    }

    async fn find_by_id(
        &mut self,
        collection: Collection,
        id: &DocumentId,
    ) -> StoreResult<Option<StoredDocument>> {
        let Some(uuid) = parse_id(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, Row>(
            r#"
            SELECT id, body FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(uuid)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(into_stored))
    }

    async fn find_by_filter(
        &mut self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Vec<StoredDocument>> {
        let rows = match filter {
            Filter::FieldEquals { field, value } => {
                sqlx::query_as::<_, Row>(
                    r#"
                    SELECT id, body FROM documents
                    WHERE collection = $1 AND body -> $2::text = $3
                    ORDER BY seq
                    "#,
                )
                .bind(collection.as_str())
                .bind(*field)
                .bind(Json(value))
                .fetch_all(&mut *self.conn)
                .await?
            }
            Filter::FieldContains { field, value } => {
                let mut probe = Document::new();
                probe.insert(field.to_string(), Value::Array(vec![value.clone()]));
                sqlx::query_as::<_, Row>(
                    r#"
                    SELECT id, body FROM documents
                    WHERE collection = $1 AND body @> $2
                    ORDER BY seq
                    "#,
                )
                .bind(collection.as_str())
                .bind(Json(probe))
                .fetch_all(&mut *self.conn)
                .await?
            }
            Filter::IdIn(ids) => {
                let uuids: Vec<Uuid> = ids.iter().filter_map(parse_id).collect();
                if uuids.is_empty() {
                    return Ok(Vec::new());
                }
                sqlx::query_as::<_, Row>(
                    r#"
                    SELECT id, body FROM documents
                    WHERE collection = $1 AND id = ANY($2)
                    ORDER BY seq
                    "#,
                )
                .bind(collection.as_str())
                .bind(uuids)
                .fetch_all(&mut *self.conn)
                .await?
            }
        };

        Ok(rows.into_iter().map(into_stored).collect())
    }

    async fn update_by_id(
        &mut self,
        collection: Collection,
        id: &DocumentId,
        updates: &FieldUpdateSet,
    ) -> StoreResult<bool> {
        let Some(uuid) = parse_id(id) else {
            return Ok(false);
        };

        let affected = sqlx::query(
            r#"
            UPDATE documents SET body = body || $3
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(uuid)
        .bind(Json(updates.to_document()))
        .execute(&mut *self.conn)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn delete_by_id(&mut self, collection: Collection, id: &DocumentId) -> StoreResult<bool> {
        let Some(uuid) = parse_id(id) else {
            return Ok(false);
        };

        let affected = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(uuid)
        .execute(&mut *self.conn)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }
}
