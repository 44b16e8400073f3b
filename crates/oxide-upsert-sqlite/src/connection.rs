//! Connection backed by a sqlx `SQLite` pool.

use oxide_upsert::{ColumnMap, Connection, Platform, QuoteLiteral, Result, StandardQuoting};
use sqlx::sqlite::{SqliteArguments, SqlitePool};
use tracing::debug;

use crate::arguments::{rewrite_named_params, to_arguments};

/// Executes upsert statements on a [`SqlitePool`].
#[derive(Debug, Clone)]
pub struct SqliteConnection {
    pool: SqlitePool,
}

impl SqliteConnection {
    /// Creates a connection over `pool`.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl QuoteLiteral for SqliteConnection {
    fn quote_string_literal(&self, value: &str) -> String {
        StandardQuoting.quote_string_literal(value)
    }
}

impl Connection for SqliteConnection {
    fn platform(&self) -> Result<Platform> {
        Ok(Platform::Sqlite)
    }

    async fn execute_statement(&self, sql: &str, params: &ColumnMap) -> Result<u64> {
        let (sql, args) = if params.is_empty() {
            (sql.to_string(), SqliteArguments::default())
        } else {
            let (sql, values) = rewrite_named_params(sql, params)?;
            (sql, to_arguments(values)?)
        };

        debug!(sql = %sql, "Executing statement");
        let result = sqlx::query_with(&sql, args).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
