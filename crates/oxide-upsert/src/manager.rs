//! The upsert entry points.
//!
//! [`UpsertManager::upsert`] writes an entity with a single
//! insert-or-update statement and then loads it back by its unique columns,
//! so callers get the stored row without checking for existence first.

use std::fmt::Write;

use chrono::Local;
use convert_case::{Case, Casing};
use tracing::{debug, error};

use crate::builder::UpsertQueryBuilder;
use crate::config::UpsertOptions;
use crate::connection::Connection;
use crate::entity::{Entity, EntityStore};
use crate::error::{Result, UpsertError};
use crate::platform::Platform;
use crate::provider::{INSERT_PARAM_PREFIX, UPDATE_PARAM_PREFIX};
use crate::registry::ProviderRegistry;
use crate::value::{ColumnMap, SqlValue};

/// Runs upserts against one connection.
///
/// # Example
///
/// ```ignore
/// use oxide_upsert::{ProviderRegistry, UpsertManager};
///
/// let manager = UpsertManager::new(connection, store, ProviderRegistry::default());
///
/// // Insert or update by the entity's unique columns, then load the stored row.
/// let device = manager.upsert(device, true).await?;
///
/// // Raw column maps.
/// manager.execute("devices", &insert, &ColumnMap::new(), &["serial".into()]).await?;
///
/// // Many rows in one statement.
/// manager.execute_batch::<Device>(&rows).await?;
/// ```
#[derive(Debug)]
pub struct UpsertManager<C, S> {
    connection: C,
    store: S,
    registry: ProviderRegistry,
    options: UpsertOptions,
}

impl<C: Connection, S> UpsertManager<C, S> {
    /// Creates a manager with default options.
    pub fn new(connection: C, store: S, registry: ProviderRegistry) -> Self {
        Self {
            connection,
            store,
            registry,
            options: UpsertOptions::default(),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: UpsertOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the connection.
    pub const fn connection(&self) -> &C {
        &self.connection
    }

    /// Returns the entity store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the options.
    pub const fn options(&self) -> &UpsertOptions {
        &self.options
    }

    /// Inserts `entity`, or updates the row that shares its unique columns.
    ///
    /// An entity that already has an identifier is handed to
    /// [`EntityStore::persist_and_flush`] without generating any SQL.
    ///
    /// With `fetch_again`, the stored row is loaded back by its unique
    /// columns and returned, so the result may be a different instance than
    /// the argument. Without it (and on SQLite unless
    /// [`UpsertOptions::skip_refetch_on_sqlite`] is off) the argument is
    /// returned as-is and its identifier may be stale.
    ///
    /// # Errors
    ///
    /// - [`UpsertError::NoUniqueColumns`] when `E` declares no unique identity
    /// - [`UpsertError::UnresolvedProperty`] / [`UpsertError::NotFoundAfterUpsert`]
    ///   when the re-fetch fails
    /// - any statement building or database error
    pub async fn upsert<E>(&self, entity: E, fetch_again: bool) -> Result<E>
    where
        E: Entity,
        S: EntityStore<E>,
    {
        if entity.is_persisted() {
            debug!(entity = E::NAME, "Entity already has an identifier, persisting directly");
            return self.store.persist_and_flush(entity).await;
        }

        let unique_columns = Self::extract_unique_columns::<E>();
        Self::validate_unique_columns(&unique_columns, &entity)?;

        let (table, insert_data, update_data) = self.prepare_upsert_data(&entity)?;
        self.execute(&table, &insert_data, &update_data, &unique_columns)
            .await?;

        if !fetch_again {
            return Ok(entity);
        }

        if self.options.skip_refetch_on_sqlite && self.connection.platform()? == Platform::Sqlite {
            debug!(entity = E::NAME, "Skipping re-fetch after upsert on SQLite");
            return Ok(entity);
        }

        self.fetch_entity_after_upsert(&entity, &unique_columns)
            .await
    }

    /// Upserts one row from raw column maps and returns the affected row count.
    ///
    /// Insert values are bound as `q0_<column>` and update values as
    /// `q1_<column>`; with an empty `update_data` the insert values are bound
    /// under both prefixes.
    ///
    /// # Errors
    ///
    /// Fails when the platform is unsupported, `insert_data` is empty, or the
    /// statement fails.
    pub async fn execute(
        &self,
        table: &str,
        insert_data: &ColumnMap,
        update_data: &ColumnMap,
        unique_columns: &[String],
    ) -> Result<u64> {
        let builder = UpsertQueryBuilder::new(&self.connection, &self.registry)?;
        let query = builder.upsert_query(table, insert_data, update_data, unique_columns)?;
        let params = prepare_params(insert_data, update_data);

        self.execute_query(Some(&query), &params).await
    }

    /// Upserts many rows of `E` in one statement with inlined values.
    ///
    /// Returns 0 without touching the connection when `rows` is empty.
    ///
    /// # Errors
    ///
    /// Fails when the platform is unsupported, a row does not match the first
    /// row's columns, a value has no literal form, or the statement fails.
    pub async fn execute_batch<E: Entity>(&self, rows: &[ColumnMap]) -> Result<u64> {
        let builder = UpsertQueryBuilder::new(&self.connection, &self.registry)?;
        let query = builder.upsert_batch_query::<E>(rows)?;

        self.execute_query(query.as_deref(), &ColumnMap::new()).await
    }

    fn extract_unique_columns<E: Entity>() -> Vec<String> {
        let columns = E::unique_constraint_columns();
        if !columns.is_empty() {
            return columns;
        }
        E::unique_column_from_field_markers()
    }

    fn validate_unique_columns<E: Entity>(unique_columns: &[String], entity: &E) -> Result<()> {
        if unique_columns.is_empty() {
            error!(
                entity = E::NAME,
                record = ?entity,
                "Entity has no unique constraint and must not be upserted"
            );
            return Err(UpsertError::NoUniqueColumns {
                entity: E::NAME,
                record: format!("{entity:?}"),
            });
        }
        Ok(())
    }

    fn prepare_upsert_data<E>(&self, entity: &E) -> Result<(String, ColumnMap, ColumnMap)>
    where
        E: Entity,
        S: EntityStore<E>,
    {
        let (table, insert_data) = self.store.insert_column_map(entity)?;

        let mut update_data = insert_data.clone();
        update_data.shift_remove(&self.options.id_column);
        update_data.shift_remove(&self.options.create_time_column);

        if E::TRACKS_UPDATE_TIME {
            let mut now = String::new();
            write!(now, "{}", Local::now().format(&self.options.timestamp_format)).map_err(
                |_| UpsertError::InvalidTimestampFormat(self.options.timestamp_format.clone()),
            )?;
            update_data.insert(self.options.update_time_column.clone(), SqlValue::Text(now));
        }

        Ok((table, insert_data, update_data))
    }

    async fn fetch_entity_after_upsert<E>(&self, entity: &E, unique_columns: &[String]) -> Result<E>
    where
        E: Entity,
        S: EntityStore<E>,
    {
        let mut columns: Vec<&str> = Vec::with_capacity(unique_columns.len());
        for column in unique_columns {
            if !columns.contains(&column.as_str()) {
                columns.push(column.as_str());
            }
        }

        let conditions = Self::build_fetch_conditions(entity, &columns)?;

        self.store.load_one(&conditions).await?.ok_or_else(|| {
            error!(entity = E::NAME, conditions = ?conditions, "Upserted entity not found");
            UpsertError::NotFoundAfterUpsert {
                entity: E::NAME,
                conditions: describe_conditions(&conditions),
            }
        })
    }

    /// Maps each unique column to a property of `entity` and its value.
    ///
    /// The column name is tried as a property first, then its camelCase form.
    fn build_fetch_conditions<E: Entity>(entity: &E, columns: &[&str]) -> Result<ColumnMap> {
        let mut conditions = ColumnMap::new();

        for column in columns {
            if let Some(value) = entity.property(column) {
                conditions.insert((*column).to_string(), value);
                continue;
            }

            let property = column.to_case(Case::Camel);
            let Some(value) = entity.property(&property) else {
                error!(
                    entity = E::NAME,
                    record = ?entity,
                    column,
                    tried_property = %property,
                    "Cannot re-fetch entity after upsert"
                );
                return Err(UpsertError::UnresolvedProperty {
                    entity: E::NAME,
                    column: (*column).to_string(),
                    tried: property,
                });
            };
            conditions.insert(property, value);
        }

        Ok(conditions)
    }

    async fn execute_query(&self, query: Option<&str>, params: &ColumnMap) -> Result<u64> {
        let Some(query) = query else {
            return Ok(0);
        };

        debug!(sql = %query, params = params.len(), "Executing upsert");
        self.connection.execute_statement(query, params).await
    }
}

/// Binds insert values as `q0_*` and update values as `q1_*`.
fn prepare_params(insert_data: &ColumnMap, update_data: &ColumnMap) -> ColumnMap {
    let update_source = if update_data.is_empty() {
        insert_data
    } else {
        update_data
    };

    let mut params = ColumnMap::with_capacity(insert_data.len() + update_source.len());
    for (column, value) in insert_data {
        params.insert(format!("{INSERT_PARAM_PREFIX}{column}"), value.clone());
    }
    for (column, value) in update_source {
        params.insert(format!("{UPDATE_PARAM_PREFIX}{column}"), value.clone());
    }
    params
}

fn describe_conditions(conditions: &ColumnMap) -> String {
    conditions
        .iter()
        .map(|(property, value)| format!("{property} = {value:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}
