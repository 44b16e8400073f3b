//! Entity mapping metadata and the store that persists entities.
//!
//! The upsert engine does not inspect types itself. An entity type describes
//! its table, its fields and its unique identity through [`Entity`], and the
//! host ORM loads and saves instances through [`EntityStore`].

use std::fmt;

use crate::error::Result;
use crate::value::{ColumnMap, SqlValue};

/// A mapped field: property name on the type, column name in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Property name.
    pub property: &'static str,
    /// Column name.
    pub column: &'static str,
    /// Whether the column carries a unique marker.
    pub unique: bool,
}

impl Field {
    /// Creates a field whose property and column differ.
    #[must_use]
    pub const fn new(property: &'static str, column: &'static str) -> Self {
        Self {
            property,
            column,
            unique: false,
        }
    }

    /// Creates a field whose property and column share a name.
    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self::new(name, name)
    }

    /// Marks the column unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// A database entity that can be upserted.
///
/// # Example
///
/// ```rust
/// use oxide_upsert::{column_map, ColumnMap, Entity, Field, SqlValue, ToSqlValue};
///
/// #[derive(Debug)]
/// struct Device {
///     id: Option<i64>,
///     serial: String,
/// }
///
/// impl Entity for Device {
///     const NAME: &'static str = "Device";
///     const TABLE: &'static str = "devices";
///     const FIELDS: &'static [Field] = &[Field::named("id"), Field::named("serial").unique()];
///
///     fn id(&self) -> Option<SqlValue> {
///         self.id.map(SqlValue::Int)
///     }
///
///     fn column_values(&self) -> ColumnMap {
///         column_map! { "id" => self.id, "serial" => &self.serial }
///     }
///
///     fn property(&self, name: &str) -> Option<SqlValue> {
///         match name {
///             "id" => Some(self.id.to_sql_value()),
///             "serial" => Some(self.serial.as_str().to_sql_value()),
///             _ => None,
///         }
///     }
/// }
///
/// assert_eq!(Device::unique_column_from_field_markers(), vec!["serial"]);
/// ```
pub trait Entity: fmt::Debug + Send + Sync + Sized + 'static {
    /// Type name, used in logs and errors.
    const NAME: &'static str;

    /// The SQL table name.
    const TABLE: &'static str;

    /// The identifier column.
    const ID_COLUMN: &'static str = "id";

    /// Mapped fields in declaration order.
    const FIELDS: &'static [Field];

    /// Columns of the table-level unique constraint, if one is declared.
    const UNIQUE_CONSTRAINT: &'static [&'static str] = &[];

    /// Whether the type keeps an update timestamp that upserts must refresh.
    const TRACKS_UPDATE_TIME: bool = false;

    /// Returns the table name.
    fn table_name() -> &'static str {
        Self::TABLE
    }

    /// Returns the columns of the declared unique constraint, or an empty list.
    fn unique_constraint_columns() -> Vec<String> {
        Self::UNIQUE_CONSTRAINT
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Returns the column of the first field marked unique, or an empty list.
    ///
    /// Overrides must return at most one column: the result is used as the
    /// complete conflict target, and further marked fields are not combined
    /// into a composite key.
    fn unique_column_from_field_markers() -> Vec<String> {
        Self::FIELDS
            .iter()
            .find(|field| field.unique)
            .map(|field| vec![field.column.to_string()])
            .unwrap_or_default()
    }

    /// Returns the column mapped to `property`, if any.
    fn column_for_property(property: &str) -> Option<&'static str> {
        Self::FIELDS
            .iter()
            .find(|field| field.property == property)
            .map(|field| field.column)
    }

    /// Returns the identifier. `None`, `NULL` and `0` mean "not persisted".
    fn id(&self) -> Option<SqlValue>;

    /// Returns every mapped column with its current value, in field order.
    fn column_values(&self) -> ColumnMap;

    /// Reads a property by name. Returns `None` if there is no such property.
    fn property(&self, name: &str) -> Option<SqlValue>;

    /// Returns whether this instance already has an identifier.
    fn is_persisted(&self) -> bool {
        match self.id() {
            None | Some(SqlValue::Null | SqlValue::Int(0)) => false,
            Some(_) => true,
        }
    }
}

/// Loading and saving entities, as provided by the host ORM.
#[allow(async_fn_in_trait)]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Flattens `entity` into its table name and insert column values.
    ///
    /// # Errors
    ///
    /// Implementations may fail when a value cannot be mapped.
    fn insert_column_map(&self, entity: &E) -> Result<(String, ColumnMap)> {
        Ok((E::table_name().to_string(), entity.column_values()))
    }

    /// Writes an entity that already has an identifier and returns it.
    async fn persist_and_flush(&self, entity: E) -> Result<E>;

    /// Loads at most one entity whose properties equal `conditions`.
    ///
    /// Keys of `conditions` are property names.
    async fn load_one(&self, conditions: &ColumnMap) -> Result<Option<E>>;
}
