//! Error types for upsert operations.

use thiserror::Error;

use crate::platform::Platform;

/// A value or row that cannot be turned into an upsert statement.
#[derive(Debug, Error)]
pub enum InvalidUpsertArguments {
    /// A composite value (array, object) where a scalar was expected.
    #[error("invalid attribute \"{0}\" for upsert")]
    InvalidAttribute(&'static str),

    /// A value with no literal form.
    #[error("invalid data for upsert")]
    NotSupportedAttribute,

    /// No columns were given to insert.
    #[error("no columns to upsert")]
    EmptyColumns,

    /// A batch row whose columns differ from the first row's.
    #[error("batch row {row} has columns [{}], expected [{}]", .found.join(", "), .expected.join(", "))]
    RowShapeMismatch {
        /// Zero-based index of the offending row.
        row: usize,
        /// Columns of the first row.
        expected: Vec<String>,
        /// Columns of the offending row.
        found: Vec<String>,
    },
}

/// Upsert errors.
#[derive(Debug, Error)]
pub enum UpsertError {
    /// No registered provider handles the connection's platform.
    #[error("upsert is not supported on platform {0}")]
    UnsupportedPlatform(Platform),

    /// A value or row cannot be rendered into a statement.
    #[error(transparent)]
    InvalidArguments(#[from] InvalidUpsertArguments),

    /// The entity type declares no unique constraint and no unique field.
    #[error("entity {entity} has no unique constraint and must not be upserted: {record}")]
    NoUniqueColumns {
        /// Entity type name.
        entity: &'static str,
        /// Debug rendering of the rejected record.
        record: String,
    },

    /// A unique column could not be mapped back to a property for re-fetching.
    #[error("cannot re-fetch {entity} after upsert: no property for column {column} (tried {tried})")]
    UnresolvedProperty {
        /// Entity type name.
        entity: &'static str,
        /// The unique column.
        column: String,
        /// The converted property name that was tried last.
        tried: String,
    },

    /// The row written by the upsert could not be found again.
    #[error("cannot re-fetch {entity} after upsert: no row matches {conditions}")]
    NotFoundAfterUpsert {
        /// Entity type name.
        entity: &'static str,
        /// Rendered lookup conditions.
        conditions: String,
    },

    /// The configured update timestamp format is not a valid `strftime` format.
    #[error("invalid timestamp format: {0}")]
    InvalidTimestampFormat(String),

    /// A statement placeholder has no value in the parameter map.
    #[error("missing value for parameter :{0}")]
    MissingParameter(String),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl UpsertError {
    /// Returns whether this is a domain-level failure of the entity upsert
    /// flow (missing unique identity, or a failed re-fetch).
    #[must_use]
    pub const fn is_upsert_exception(&self) -> bool {
        matches!(
            self,
            Self::NoUniqueColumns { .. }
                | Self::UnresolvedProperty { .. }
                | Self::NotFoundAfterUpsert { .. }
        )
    }
}

/// Result type alias for upsert operations.
pub type Result<T> = std::result::Result<T, UpsertError>;
