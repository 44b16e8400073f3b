//! Dialect-specific upsert statement generation.
//!
//! Databases disagree on how an insert that hits a unique key turns into an
//! update. Each [`UpsertProvider`] knows one family of platforms:
//!
//! - [`MySqlUpsertProvider`]: `INSERT ... ON DUPLICATE KEY UPDATE`
//! - [`SqliteUpsertProvider`]: `INSERT ... ON CONFLICT(...) DO UPDATE SET`
//!
//! New platforms are supported by registering another implementation with
//! the [`ProviderRegistry`](crate::ProviderRegistry).

mod mysql;
mod sqlite;

pub use mysql::MySqlUpsertProvider;
pub use sqlite::SqliteUpsertProvider;

use std::fmt;

use crate::connection::QuoteLiteral;
use crate::error::{InvalidUpsertArguments, Result};
use crate::escape::escape;
use crate::platform::Platform;
use crate::value::ColumnMap;

/// Placeholder prefix for insert values.
pub const INSERT_PARAM_PREFIX: &str = "q0_";

/// Placeholder prefix for update values.
pub const UPDATE_PARAM_PREFIX: &str = "q1_";

/// Trait for dialect-specific upsert SQL generation.
pub trait UpsertProvider: fmt::Debug + Send + Sync {
    /// Returns the provider name.
    fn name(&self) -> &'static str;

    /// Returns whether this provider handles `platform`.
    fn supports(&self, platform: &Platform) -> bool;

    /// Builds a single-row upsert with named placeholders.
    ///
    /// Insert values are bound as `:q0_<column>` in `insert_data` order.
    /// When `update_data` is empty the update clause is generated from the
    /// insert columns; otherwise it assigns `:q1_<column>` for each column of
    /// `update_data`.
    fn upsert_sql(
        &self,
        table: &str,
        insert_data: &ColumnMap,
        update_data: &ColumnMap,
        unique_columns: &[String],
    ) -> Result<String>;

    /// Builds a multi-row upsert with every value inlined as a literal.
    ///
    /// Returns `None` when `rows` is empty.
    fn batch_upsert_sql(
        &self,
        rows: &[ColumnMap],
        table: &str,
        quoter: &dyn QuoteLiteral,
    ) -> Result<Option<String>>;
}

/// Returns the insert column names, failing when there are none.
fn insert_columns(insert_data: &ColumnMap) -> Result<Vec<&str>> {
    if insert_data.is_empty() {
        return Err(InvalidUpsertArguments::EmptyColumns.into());
    }
    Ok(insert_data.keys().map(String::as_str).collect())
}

/// Renders `INSERT INTO table (a, b) VALUES (:q0_a, :q0_b)`.
fn insert_with_placeholders(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = columns
        .iter()
        .map(|col| format!(":{INSERT_PARAM_PREFIX}{col}"))
        .collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Renders `col = :q1_col` for each column.
fn update_assignments<'a>(columns: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    columns
        .into_iter()
        .map(|col| format!("{col} = :{UPDATE_PARAM_PREFIX}{col}"))
        .collect()
}

/// Columns of the first row, used for every row of a batch.
fn batch_columns(rows: &[ColumnMap]) -> Result<Vec<&str>> {
    let first = rows.first().ok_or(InvalidUpsertArguments::EmptyColumns)?;
    insert_columns(first)
}

/// Renders `INSERT INTO table (a, b) VALUES (1, 'x'), (2, 'y')`.
///
/// Every row must have exactly the first row's columns.
fn insert_with_literals(
    table: &str,
    columns: &[&str],
    rows: &[ColumnMap],
    quoter: &dyn QuoteLiteral,
) -> Result<String> {
    let mut tuples = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let same_shape =
            row.len() == columns.len() && columns.iter().all(|col| row.contains_key(*col));
        if !same_shape {
            return Err(InvalidUpsertArguments::RowShapeMismatch {
                row: index,
                expected: columns.iter().map(ToString::to_string).collect(),
                found: row.keys().cloned().collect(),
            }
            .into());
        }

        let values = columns
            .iter()
            .map(|col| escape(&row[*col], quoter))
            .collect::<Result<Vec<_>>>()?;
        tuples.push(format!("({})", values.join(", ")));
    }

    Ok(format!(
        "INSERT INTO {table} ({}) VALUES {}",
        columns.join(", "),
        tuples.join(", ")
    ))
}
