//! Entity store backed by a sqlx `SQLite` pool.

use oxide_upsert::{ColumnMap, Entity, EntityStore, Result, SqlValue};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::FromRow;
use tracing::debug;

use crate::arguments::to_arguments;

/// Loads and saves entities with plain SQL on a [`SqlitePool`].
///
/// Rows are decoded with the entity's [`FromRow`] implementation, selecting
/// the columns listed in [`Entity::FIELDS`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a store over `pool`.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn execute(&self, sql: &str, values: Vec<SqlValue>) -> Result<u64> {
        debug!(sql = %sql, "Executing statement");
        let result = sqlx::query_with(sql, to_arguments(values)?)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl<E> EntityStore<E> for SqliteStore
where
    E: Entity + for<'r> FromRow<'r, SqliteRow> + Unpin,
{
    /// Updates the row with the entity's identifier, inserting it when no
    /// such row exists yet.
    async fn persist_and_flush(&self, entity: E) -> Result<E> {
        let table = E::table_name();
        let id = entity.id().unwrap_or(SqlValue::Null);
        let values = entity.column_values();

        let (assignments, mut update_values): (Vec<String>, Vec<SqlValue>) = values
            .iter()
            .filter(|(column, _)| column.as_str() != E::ID_COLUMN)
            .map(|(column, value)| (format!("{column} = ?"), value.clone()))
            .unzip();

        let columns = values.keys().map(String::as_str).collect::<Vec<_>>();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let insert_values = values.values().cloned().collect::<Vec<_>>();

        if assignments.is_empty() {
            let sql = format!(
                "INSERT OR IGNORE INTO {table} ({}) VALUES ({placeholders})",
                columns.join(", ")
            );
            self.execute(&sql, insert_values).await?;
            return Ok(entity);
        }

        update_values.push(id);
        let sql = format!(
            "UPDATE {table} SET {} WHERE {} = ?",
            assignments.join(", "),
            E::ID_COLUMN
        );
        if self.execute(&sql, update_values).await? == 0 {
            let sql = format!(
                "INSERT INTO {table} ({}) VALUES ({placeholders})",
                columns.join(", ")
            );
            self.execute(&sql, insert_values).await?;
        }

        Ok(entity)
    }

    async fn load_one(&self, conditions: &ColumnMap) -> Result<Option<E>> {
        let columns = E::FIELDS
            .iter()
            .map(|field| field.column)
            .collect::<Vec<_>>()
            .join(", ");

        let mut filters = Vec::with_capacity(conditions.len());
        let mut values = Vec::with_capacity(conditions.len());
        for (property, value) in conditions {
            let column = E::column_for_property(property).unwrap_or(property.as_str());
            if value.is_null() {
                filters.push(format!("{column} IS NULL"));
            } else {
                filters.push(format!("{column} = ?"));
                values.push(value.clone());
            }
        }

        let mut sql = format!("SELECT {columns} FROM {}", E::table_name());
        if !filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filters.join(" AND "));
        }
        sql.push_str(" LIMIT 1");

        debug!(sql = %sql, entity = E::NAME, "Loading entity");
        let row = sqlx::query_as_with::<_, E, _>(&sql, to_arguments(values)?)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
