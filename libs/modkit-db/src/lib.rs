//! ModKit database handle.
//!
//! Wraps one sqlx pool (SQLite or PostgreSQL) together with a SeaORM
//! connection built on top of the same pool. SQLite DSNs may carry PRAGMA
//! settings in the query string (`wal`, `journal_mode`, `synchronous`,
//! `busy_timeout`); they are stripped before the DSN reaches sqlx and applied
//! to every new connection.
//!
//! ```rust,no_run
//! # async fn demo() -> modkit_db::Result<()> {
//! use modkit_db::{ConnectOpts, DbHandle};
//!
//! let db = DbHandle::connect("sqlite://database/agenda.db?wal=true", ConnectOpts::default()).await?;
//! let conn = db.sea();
//! # let _ = conn;
//! db.close().await;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
use std::str::FromStr;
use std::time::Duration;

use sea_orm::DatabaseConnection;
#[cfg(feature = "pg")]
use sea_orm::SqlxPostgresConnector;
#[cfg(feature = "sqlite")]
use sea_orm::SqlxSqliteConnector;
#[cfg(feature = "pg")]
use sqlx::{postgres::PgPoolOptions, PgPool};
#[cfg(feature = "sqlite")]
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle and helpers.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Pool knobs; each driver applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
    /// Used when the DSN does not set `busy_timeout` itself.
    pub sqlite_busy_timeout: Option<Duration>,
    /// For SQLite file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            max_lifetime: None,
            sqlite_busy_timeout: None,
            create_sqlite_dirs: true,
        }
    }
}

#[derive(Clone, Debug)]
enum DbPool {
    #[cfg(feature = "pg")]
    Postgres(PgPool),
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
}

/// Main handle.
#[derive(Debug)]
pub struct DbHandle {
    engine: DbEngine,
    pool: DbPool,
    dsn: String,
    sea: DatabaseConnection,
}

const DEFAULT_SQLITE_BUSY_TIMEOUT_MS: i64 = 5000;

/// Apply the shared pool knobs to any sqlx `PoolOptions`.
macro_rules! apply_pool_opts {
    ($o:expr, $opts:expr) => {{
        let mut o = $o;
        if let Some(n) = $opts.max_conns {
            o = o.max_connections(n);
        }
        if let Some(n) = $opts.min_conns {
            o = o.min_connections(n);
        }
        if let Some(t) = $opts.acquire_timeout {
            o = o.acquire_timeout(t);
        }
        o = o.idle_timeout($opts.idle_timeout);
        o = o.max_lifetime($opts.max_lifetime);
        o
    }};
}

impl DbHandle {
    /// Detect engine by DSN scheme. The tail (credentials etc.) is never inspected.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_dsn(dsn)))
        }
    }

    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        match Self::detect(dsn)? {
            #[cfg(feature = "pg")]
            DbEngine::Postgres => {
                let pool = apply_pool_opts!(PgPoolOptions::new(), opts)
                    .connect(dsn)
                    .await?;
                let sea = SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone());
                tracing::debug!(dsn = %redact_dsn(dsn), "postgres pool ready");
                Ok(Self {
                    engine: DbEngine::Postgres,
                    pool: DbPool::Postgres(pool),
                    dsn: dsn.to_string(),
                    sea,
                })
            }
            #[cfg(feature = "sqlite")]
            DbEngine::Sqlite => Self::connect_sqlite(dsn, opts).await,
            #[cfg(not(feature = "pg"))]
            DbEngine::Postgres => Err(DbError::FeatureDisabled("PostgreSQL feature not enabled")),
            #[cfg(not(feature = "sqlite"))]
            DbEngine::Sqlite => Err(DbError::FeatureDisabled("SQLite feature not enabled")),
        }
    }

    #[cfg(feature = "sqlite")]
    async fn connect_sqlite(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let (clean_dsn, pairs) = sqlite::extract_sqlite_pragmas(dsn);
        let in_memory = sqlite::is_memory_dsn(&clean_dsn);
        sqlite::prepare_sqlite_path(&clean_dsn, opts.create_sqlite_dirs)?;

        let default_busy = opts
            .sqlite_busy_timeout
            .map(|d| d.as_millis() as i64)
            .unwrap_or(DEFAULT_SQLITE_BUSY_TIMEOUT_MS);
        let statements = sqlite::Pragmas::from_pairs(&pairs).statements(in_memory, default_busy);

        let connect_opts = SqliteConnectOptions::from_str(&clean_dsn)?.create_if_missing(true);

        let mut o = apply_pool_opts!(SqlitePoolOptions::new(), opts);
        if in_memory {
            // Every connection to `:memory:` is a separate database.
            o = o
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = o
            .after_connect(move |conn, _meta| {
                let statements = statements.clone();
                Box::pin(async move {
                    for stmt in &statements {
                        sqlx::query(stmt).execute(&mut *conn).await?;
                    }
                    Ok(())
                })
            })
            .connect_with(connect_opts)
            .await?;

        let sea = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());
        tracing::debug!(dsn = %clean_dsn, in_memory, "sqlite pool ready");

        Ok(Self {
            engine: DbEngine::Sqlite,
            pool: DbPool::Sqlite(pool),
            dsn: clean_dsn,
            sea,
        })
    }

    /// Graceful pool close.
    pub async fn close(self) {
        match self.pool {
            #[cfg(feature = "pg")]
            DbPool::Postgres(p) => p.close().await,
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(p) => p.close().await,
        }
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// DSN used for this connection (PRAGMA parameters removed).
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    #[cfg(feature = "pg")]
    pub fn sqlx_postgres(&self) -> Option<&PgPool> {
        match self.pool {
            DbPool::Postgres(ref p) => Some(p),
            #[cfg(feature = "sqlite")]
            _ => None,
        }
    }

    #[cfg(feature = "sqlite")]
    pub fn sqlx_sqlite(&self) -> Option<&SqlitePool> {
        match self.pool {
            DbPool::Sqlite(ref p) => Some(p),
            #[cfg(feature = "pg")]
            _ => None,
        }
    }

    /// SeaORM connection (clone; cheap handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }

    pub fn seaorm(&self) -> &DatabaseConnection {
        &self.sea
    }
}

/// Hide the password component of a URL-shaped DSN.
pub fn redact_dsn(dsn: &str) -> String {
    match url::Url::parse(dsn) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => dsn.to_string(),
    }
}
