//! # oxide-upsert
//!
//! Insert-or-update statements for databases that spell conflicts
//! differently.
//!
//! This crate provides:
//! - [`UpsertProvider`] implementations for the MySQL family
//!   (`ON DUPLICATE KEY UPDATE`) and the SQLite family
//!   (`ON CONFLICT(...) DO UPDATE SET`)
//! - a [`ProviderRegistry`] that picks the provider for a connection's
//!   [`Platform`]
//! - [`UpsertManager`], which upserts entities by their unique columns and
//!   loads the stored row back afterwards
//!
//! ## Single rows
//!
//! Single-row statements use named placeholders. Insert values are bound
//! as `:q0_<column>` and update values as `:q1_<column>`, so a column can
//! appear in both phases without the names colliding.
//!
//! ```rust
//! use oxide_upsert::provider::{MySqlUpsertProvider, UpsertProvider};
//! use oxide_upsert::{column_map, ColumnMap};
//!
//! let insert = column_map! { "id" => 1_i64, "name" => "x" };
//! let sql = MySqlUpsertProvider::new()
//!     .upsert_sql("t", &insert, &ColumnMap::new(), &[])
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "INSERT INTO t (id, name) VALUES (:q0_id, :q0_name) \
//!      ON DUPLICATE KEY UPDATE id = VALUES(id), name = VALUES(name)"
//! );
//! ```
//!
//! ## Batches
//!
//! Batch statements inline every value as a literal. Strings are escaped by
//! the connection's [`QuoteLiteral`] implementation; arrays and objects are
//! rejected.
//!
//! ```rust
//! use oxide_upsert::provider::{SqliteUpsertProvider, UpsertProvider};
//! use oxide_upsert::{column_map, StandardQuoting};
//!
//! let rows = vec![
//!     column_map! { "id" => 1_i64, "name" => "O'Brien" },
//!     column_map! { "id" => 2_i64, "name" => "Smith" },
//! ];
//! let sql = SqliteUpsertProvider::new()
//!     .batch_upsert_sql(&rows, "people", &StandardQuoting)
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "INSERT INTO people (id, name) VALUES (1, 'O''Brien'), (2, 'Smith') \
//!      ON CONFLICT(id) DO UPDATE SET name = excluded.name"
//! );
//! ```

mod builder;
mod config;
mod connection;
mod entity;
mod error;
pub mod escape;
mod manager;
mod platform;
pub mod provider;
mod registry;
mod value;

pub use builder::UpsertQueryBuilder;
pub use config::UpsertOptions;
pub use connection::{Connection, MySqlQuoting, QuoteLiteral, StandardQuoting};
pub use entity::{Entity, EntityStore, Field};
pub use error::{InvalidUpsertArguments, Result, UpsertError};
pub use manager::UpsertManager;
pub use platform::Platform;
pub use provider::UpsertProvider;
pub use registry::ProviderRegistry;
pub use value::{ColumnMap, SqlValue, ToSqlValue, DATETIME_FORMAT};
