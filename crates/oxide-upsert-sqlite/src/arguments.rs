//! Named placeholders to positional arguments.

use std::sync::LazyLock;

use oxide_upsert::{ColumnMap, InvalidUpsertArguments, Result, SqlValue, UpsertError};
use regex::{Captures, Regex};
use sqlx::sqlite::SqliteArguments;
use sqlx::Arguments;

/// Matches a single-quoted literal (skipped) or a `:name` placeholder.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'(?:[^']|'')*'|:([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid placeholder regex")
});

/// Replaces every `:name` outside string literals with `?` and returns the
/// values in placeholder order. A name used twice is bound twice.
pub fn rewrite_named_params(sql: &str, params: &ColumnMap) -> Result<(String, Vec<SqlValue>)> {
    let mut values = Vec::new();
    let mut missing: Option<String> = None;

    let rewritten = PLACEHOLDER.replace_all(sql, |caps: &Captures<'_>| {
        let Some(name) = caps.get(1) else {
            return caps[0].to_string();
        };
        let Some(value) = params.get(name.as_str()) else {
            missing.get_or_insert_with(|| name.as_str().to_string());
            return caps[0].to_string();
        };
        values.push(value.clone());
        String::from("?")
    });

    if let Some(name) = missing {
        return Err(UpsertError::MissingParameter(name));
    }
    Ok((rewritten.into_owned(), values))
}

/// Encodes values as positional `SQLite` arguments.
pub fn to_arguments<'q>(values: Vec<SqlValue>) -> Result<SqliteArguments<'q>> {
    let mut args = SqliteArguments::default();
    for value in values {
        add_value(&mut args, value)?;
    }
    Ok(args)
}

fn add_value(args: &mut SqliteArguments<'_>, value: SqlValue) -> Result<()> {
    let added = match value {
        SqlValue::Null => args.add(Option::<i64>::None),
        SqlValue::Bool(b) => args.add(b),
        SqlValue::Int(i) => args.add(i),
        SqlValue::Float(f) => args.add(f),
        SqlValue::Text(s) => args.add(s),
        SqlValue::Blob(b) => args.add(b),
        SqlValue::Array(_) | SqlValue::Object(_) => {
            return Err(InvalidUpsertArguments::InvalidAttribute(value.type_name()).into());
        }
    };
    added.map_err(|e| UpsertError::Database(sqlx::Error::Encode(e)))
}
