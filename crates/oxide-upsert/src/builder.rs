//! Statement builder bound to one connection.

use std::sync::Arc;

use crate::connection::Connection;
use crate::entity::Entity;
use crate::error::Result;
use crate::provider::UpsertProvider;
use crate::registry::ProviderRegistry;
use crate::value::ColumnMap;

/// Builds upsert statements for the platform of a connection.
///
/// The provider is resolved once, when the builder is created, so an
/// unsupported platform fails here rather than on first use.
#[derive(Debug)]
pub struct UpsertQueryBuilder<'c, C> {
    connection: &'c C,
    provider: Arc<dyn UpsertProvider>,
}

impl<'c, C: Connection> UpsertQueryBuilder<'c, C> {
    /// Creates a builder for `connection`.
    ///
    /// # Errors
    ///
    /// Fails when the connection cannot report its platform, or with
    /// [`UpsertError::UnsupportedPlatform`](crate::UpsertError::UnsupportedPlatform)
    /// when no registered provider supports it.
    pub fn new(connection: &'c C, registry: &ProviderRegistry) -> Result<Self> {
        let platform = connection.platform()?;
        let provider = registry.resolve(&platform)?;
        Ok(Self {
            connection,
            provider,
        })
    }

    /// Returns the resolved provider.
    #[must_use]
    pub fn provider(&self) -> &dyn UpsertProvider {
        self.provider.as_ref()
    }

    /// Builds a single-row upsert with named placeholders.
    ///
    /// # Errors
    ///
    /// Fails when `insert_data` is empty.
    pub fn upsert_query(
        &self,
        table: &str,
        insert_data: &ColumnMap,
        update_data: &ColumnMap,
        unique_columns: &[String],
    ) -> Result<String> {
        self.provider
            .upsert_sql(table, insert_data, update_data, unique_columns)
    }

    /// Builds a multi-row upsert into the table of `E`.
    ///
    /// Returns `None` when `rows` is empty.
    ///
    /// # Errors
    ///
    /// Fails when a row does not match the first row's columns or holds a
    /// value that has no literal form.
    pub fn upsert_batch_query<E: Entity>(&self, rows: &[ColumnMap]) -> Result<Option<String>> {
        if rows.is_empty() {
            return Ok(None);
        }
        self.provider
            .batch_upsert_sql(rows, E::table_name(), self.connection)
    }
}
