//! The database connection as seen by the upsert engine.
//!
//! The engine never talks to a driver directly: it asks a [`Connection`]
//! for its platform, for string quoting, and to execute finished statements.

use crate::error::Result;
use crate::platform::Platform;
use crate::value::ColumnMap;

/// Driver-specific string escaping.
pub trait QuoteLiteral {
    /// Escapes `value` for use inside a single-quoted SQL string literal.
    ///
    /// Returns the escaped body only; the caller adds the surrounding quotes.
    fn quote_string_literal(&self, value: &str) -> String;
}

/// An open database connection.
#[allow(async_fn_in_trait)]
pub trait Connection: QuoteLiteral + Send + Sync {
    /// Returns the platform of this connection.
    fn platform(&self) -> Result<Platform>;

    /// Executes a statement and returns the number of affected rows.
    ///
    /// `params` maps placeholder names (without the leading `:`) to values.
    /// It is empty for statements with inlined literals.
    async fn execute_statement(&self, sql: &str, params: &ColumnMap) -> Result<u64>;
}

/// Standard SQL quoting: single quotes are doubled.
///
/// Suitable for SQLite and for MySQL with `NO_BACKSLASH_ESCAPES`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardQuoting;

impl QuoteLiteral for StandardQuoting {
    fn quote_string_literal(&self, value: &str) -> String {
        value.replace('\'', "''")
    }
}

/// MySQL quoting: backslashes and single quotes are backslash-escaped,
/// along with the control characters `mysql_real_escape_string` escapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlQuoting;

impl QuoteLiteral for MySqlQuoting {
    fn quote_string_literal(&self, value: &str) -> String {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '\\' => escaped.push_str("\\\\"),
                '\'' => escaped.push_str("\\'"),
                '"' => escaped.push_str("\\\""),
                '\0' => escaped.push_str("\\0"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\x1a' => escaped.push_str("\\Z"),
                _ => escaped.push(c),
            }
        }
        escaped
    }
}
