//! Column values and column maps.
//!
//! A [`ColumnMap`] is the flat, ordered `column -> value` view of a record
//! that every upsert statement is built from. Values are bound as named
//! parameters on the single-row path and rendered as literals on the batch
//! path (see [`crate::escape`]).

use chrono::NaiveDateTime;
use indexmap::IndexMap;

/// Format used when a timestamp is stored as text.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// An ordered mapping from column name to value.
///
/// Insertion order is significant: it is the column order of the generated
/// `INSERT` and of the update clause.
pub type ColumnMap = IndexMap<String, SqlValue>;

/// A value stored in a column.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// A list of values. Never valid as a column value in a batch statement.
    Array(Vec<SqlValue>),
    /// A nested map of values. Never valid as a column value in a batch statement.
    Object(ColumnMap),
}

impl SqlValue {
    /// Returns the name of the value's type, as used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::Blob(_) => "blob",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Returns whether this is `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns whether this is a composite (array or object) value.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.format(DATETIME_FORMAT).to_string())
    }
}

impl ToSqlValue for ColumnMap {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Object(self)
    }
}

impl ToSqlValue for serde_json::Value {
    fn to_sql_value(self) -> SqlValue {
        use serde_json::Value;

        match self {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(b),
            Value::Number(n) => n
                .as_i64()
                .map_or_else(|| SqlValue::Float(n.as_f64().unwrap_or(f64::NAN)), SqlValue::Int),
            Value::String(s) => SqlValue::Text(s),
            Value::Array(items) => {
                SqlValue::Array(items.into_iter().map(ToSqlValue::to_sql_value).collect())
            }
            Value::Object(fields) => SqlValue::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, v.to_sql_value()))
                    .collect(),
            ),
        }
    }
}

/// Builds a [`ColumnMap`] from `column => value` pairs.
///
/// Values go through [`ToSqlValue`], so plain Rust literals work:
///
/// ```rust
/// use oxide_upsert::{column_map, SqlValue};
///
/// let row = column_map! { "id" => 1_i64, "name" => "x", "active" => true };
/// assert_eq!(row["name"], SqlValue::Text("x".into()));
/// assert_eq!(row.keys().collect::<Vec<_>>(), ["id", "name", "active"]);
/// ```
#[macro_export]
macro_rules! column_map {
    () => {
        $crate::ColumnMap::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ColumnMap::new();
        $(
            map.insert(
                ::std::string::String::from($column),
                $crate::ToSqlValue::to_sql_value($value),
            );
        )+
        map
    }};
}
