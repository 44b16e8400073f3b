//! MySQL-family upsert provider.
//!
//! MySQL and MariaDB detect the conflict on any unique index themselves, so
//! no conflict target is rendered and `unique_columns` is not needed.
//! `VALUES(col)` refers to the value the row would have been inserted with.

use super::{
    batch_columns, insert_columns, insert_with_literals, insert_with_placeholders,
    update_assignments, UpsertProvider,
};
use crate::connection::QuoteLiteral;
use crate::error::Result;
use crate::platform::Platform;
use crate::value::ColumnMap;

/// `INSERT ... ON DUPLICATE KEY UPDATE` for MySQL and MariaDB.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlUpsertProvider;

impl MySqlUpsertProvider {
    /// Creates a new MySQL provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn assign_inserted_values(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|col| format!("{col} = VALUES({col})"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl UpsertProvider for MySqlUpsertProvider {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn supports(&self, platform: &Platform) -> bool {
        matches!(platform, Platform::MySql | Platform::MariaDb)
    }

    fn upsert_sql(
        &self,
        table: &str,
        insert_data: &ColumnMap,
        update_data: &ColumnMap,
        _unique_columns: &[String],
    ) -> Result<String> {
        let columns = insert_columns(insert_data)?;

        let update = if update_data.is_empty() {
            assign_inserted_values(&columns)
        } else {
            update_assignments(update_data.keys().map(String::as_str)).join(", ")
        };

        Ok(format!(
            "{} ON DUPLICATE KEY UPDATE {update}",
            insert_with_placeholders(table, &columns)
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

        Ok(Some(format!(
            "{insert} ON DUPLICATE KEY UPDATE {}",
            assign_inserted_values(&columns)
        )))
    }
}
