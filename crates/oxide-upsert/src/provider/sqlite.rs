//! SQLite-family upsert provider.
//!
//! SQLite needs an explicit conflict target, and a conflict column cannot
//! be reassigned in the `DO UPDATE SET` clause. `excluded.col` refers to
//! the value the row would have been inserted with.

use tracing::warn;

use super::{
    batch_columns, insert_columns, insert_with_literals, insert_with_placeholders,
    update_assignments, UpsertProvider,
};
use crate::connection::QuoteLiteral;
use crate::error::Result;
use crate::platform::Platform;
use crate::value::ColumnMap;

/// `INSERT ... ON CONFLICT(...) DO UPDATE SET` for SQLite (3.24.0+).
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteUpsertProvider;

impl SqliteUpsertProvider {
    /// Creates a new SQLite provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Renders the tail of the statement. An empty assignment list turns into
/// `DO NOTHING`, since `DO UPDATE SET` needs at least one column.
fn on_conflict(conflict: &[&str], assignments: &[String]) -> String {
    let target = conflict.join(", ");
    if assignments.is_empty() {
        format!("ON CONFLICT({target}) DO NOTHING")
    } else {
        format!("ON CONFLICT({target}) DO UPDATE SET {}", assignments.join(", "))
    }
}

fn assign_excluded(columns: &[&str], conflict: &[&str]) -> Vec<String> {
    columns
        .iter()
        .filter(|col| !conflict.contains(*col))
        .map(|col| format!("{col} = excluded.{col}"))
        .collect()
}

impl UpsertProvider for SqliteUpsertProvider {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn supports(&self, platform: &Platform) -> bool {
        matches!(platform, Platform::Sqlite)
    }

    fn upsert_sql(
        &self,
        table: &str,
        insert_data: &ColumnMap,
        update_data: &ColumnMap,
        unique_columns: &[String],
    ) -> Result<String> {
        let columns = insert_columns(insert_data)?;

        let conflict: Vec<&str> = if unique_columns.is_empty() {
            // Only right when the first column is the sole unique key.
            warn!(
                table,
                column = columns[0],
                "No unique columns given, using the first insert column as conflict target"
            );
            vec![columns[0]]
        } else {
            unique_columns.iter().map(String::as_str).collect()
        };

        let assignments = if update_data.is_empty() {
            assign_excluded(&columns, &conflict)
        } else {
            update_assignments(
                update_data
                    .keys()
                    .map(String::as_str)
                    .filter(|col| !conflict.contains(col)),
            )
        };

        Ok(format!(
            "{} {}",
            insert_with_placeholders(table, &columns),
            on_conflict(&conflict, &assignments)
        ))
    }

    fn batch_upsert_sql(
        &self,
        rows: &[ColumnMap],
        table: &str,
        quoter: &dyn QuoteLiteral,
    ) -> Result<Option<String>> {
        if rows.is_empty() {
            return Ok(None);
        }

        let columns = batch_columns(rows)?;
        let insert = insert_with_literals(table, &columns, rows, quoter)?;

        // Batches carry no unique-column list: the first column is the target.
        let conflict = [columns[0]];
        let assignments = assign_excluded(&columns, &conflict);

        Ok(Some(format!("{insert} {}", on_conflict(&conflict, &assignments))))
    }
}
