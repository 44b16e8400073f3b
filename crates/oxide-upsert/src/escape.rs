//! Literal rendering for batch statements.
//!
//! The batch path has no parameter binding, so every value is written into
//! the statement text. This is the only place that happens.

use crate::connection::QuoteLiteral;
use crate::error::{InvalidUpsertArguments, Result};
use crate::value::SqlValue;

/// Renders `value` as a SQL literal.
///
/// - integers and floats are written as-is
/// - booleans become `1` / `0`
/// - `NULL` stays `NULL`
/// - strings are escaped by `quoter` and wrapped in single quotes
///
/// Arrays and objects fail with [`InvalidUpsertArguments::InvalidAttribute`];
/// any other value fails with [`InvalidUpsertArguments::NotSupportedAttribute`].
pub fn escape<Q: QuoteLiteral + ?Sized>(value: &SqlValue, quoter: &Q) -> Result<String> {
    let literal = match value {
        SqlValue::Int(n) => n.to_string(),
        SqlValue::Float(f) if f.is_finite() => f.to_string(),
        SqlValue::Text(s) => format!("'{}'", quoter.quote_string_literal(s)),
        SqlValue::Array(_) | SqlValue::Object(_) => {
            return Err(InvalidUpsertArguments::InvalidAttribute(value.type_name()).into());
        }
        SqlValue::Null => String::from("NULL"),
        SqlValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
        SqlValue::Float(_) | SqlValue::Blob(_) => {
            return Err(InvalidUpsertArguments::NotSupportedAttribute.into());
        }
    };
    Ok(literal)
}
