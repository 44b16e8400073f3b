//! # oxide-upsert-sqlite
//!
//! `SQLite` collaborators for `oxide-upsert`, backed by a sqlx
//! [`SqlitePool`](sqlx::SqlitePool).
//!
//! - [`SqliteConnection`] runs the generated statements. Named `:param`
//!   placeholders are rewritten to positional `?` placeholders before
//!   binding, since sqlx only binds by position on `SQLite`.
//! - [`SqliteStore`] loads and saves entities that implement
//!   [`sqlx::FromRow`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use oxide_upsert::{ProviderRegistry, UpsertManager};
//! use oxide_upsert_sqlite::{SqliteConnection, SqliteStore};
//!
//! let pool = SqlitePool::connect("sqlite://app.db").await?;
//! let manager = UpsertManager::new(
//!     SqliteConnection::new(pool.clone()),
//!     SqliteStore::new(pool),
//!     ProviderRegistry::default(),
//! );
//!
//! manager.upsert(device, false).await?;
//! ```

mod arguments;
mod connection;
mod store;

pub use connection::SqliteConnection;
pub use store::SqliteStore;
