#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use oxide_upsert::{
    column_map, ColumnMap, Connection, Entity, EntityStore, Field, Platform, QuoteLiteral,
    Result, SqlValue, ToSqlValue,
};

/// A connection that records statements instead of running them.
#[derive(Debug)]
pub struct RecordingConnection {
    platform: Platform,
    affected_rows: u64,
    executed: Mutex<Vec<(String, ColumnMap)>>,
}

impl RecordingConnection {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            affected_rows: 1,
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn affecting(mut self, rows: u64) -> Self {
        self.affected_rows = rows;
        self
    }

    pub fn executed(&self) -> Vec<(String, ColumnMap)> {
        self.executed.lock().unwrap().clone()
    }

    pub fn last_sql(&self) -> String {
        self.executed()
            .last()
            .map(|(sql, _)| sql.clone())
            .expect("no statement executed")
    }
}

impl QuoteLiteral for RecordingConnection {
    fn quote_string_literal(&self, value: &str) -> String {
        value.replace('\'', "''")
    }
}

impl Connection for RecordingConnection {
    fn platform(&self) -> Result<Platform> {
        Ok(self.platform.clone())
    }

    async fn execute_statement(&self, sql: &str, params: &ColumnMap) -> Result<u64> {
        self.executed
            .lock()
            .unwrap()
            .push((sql.to_string(), params.clone()));
        Ok(self.affected_rows)
    }
}

/// An in-memory store holding the rows "in the database".
#[derive(Debug)]
pub struct MemoryStore<E> {
    rows: Mutex<Vec<E>>,
    persisted: Mutex<Vec<E>>,
    lookups: Mutex<Vec<ColumnMap>>,
}

impl<E: Clone> MemoryStore<E> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    pub fn with_rows(rows: Vec<E>) -> Self {
        Self {
            rows: Mutex::new(rows),
            persisted: Mutex::new(Vec::new()),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn persisted(&self) -> Vec<E> {
        self.persisted.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> Vec<ColumnMap> {
        self.lookups.lock().unwrap().clone()
    }
}

impl<E: Entity + Clone> EntityStore<E> for MemoryStore<E> {
    async fn persist_and_flush(&self, entity: E) -> Result<E> {
        self.persisted.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn load_one(&self, conditions: &ColumnMap) -> Result<Option<E>> {
        self.lookups.lock().unwrap().push(conditions.clone());
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|row| {
                conditions
                    .iter()
                    .all(|(property, value)| row.property(property).as_ref() == Some(value))
            })
            .cloned())
    }
}

/// Device keyed by its serial number, with timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: Option<i64>,
    pub serial: String,
    pub name: String,
    pub create_time: String,
}

impl Device {
    pub fn new(serial: &str, name: &str) -> Self {
        Self {
            id: None,
            serial: serial.to_string(),
            name: name.to_string(),
            create_time: String::from("2024-01-01 00:00:00"),
        }
    }
}

impl Entity for Device {
    const NAME: &'static str = "Device";
    const TABLE: &'static str = "devices";
    const FIELDS: &'static [Field] = &[
        Field::named("id"),
        Field::named("serial").unique(),
        Field::named("name").unique(),
        Field::named("create_time"),
    ];
    const TRACKS_UPDATE_TIME: bool = true;

    fn id(&self) -> Option<SqlValue> {
        self.id.map(SqlValue::Int)
    }

    fn column_values(&self) -> ColumnMap {
        column_map! {
            "id" => self.id,
            "serial" => &self.serial,
            "name" => &self.name,
            "create_time" => &self.create_time,
        }
    }

    fn property(&self, name: &str) -> Option<SqlValue> {
        match name {
            "id" => Some(self.id.to_sql_value()),
            "serial" => Some(self.serial.as_str().to_sql_value()),
            "name" => Some(self.name.as_str().to_sql_value()),
            "create_time" => Some(self.create_time.as_str().to_sql_value()),
            _ => None,
        }
    }
}

/// Entity whose properties are camelCase while its columns are snake_case.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: Option<i64>,
    pub protocol_id: String,
    pub tenant_id: i64,
}

impl Entity for Subscription {
    const NAME: &'static str = "Subscription";
    const TABLE: &'static str = "subscriptions";
    const FIELDS: &'static [Field] = &[
        Field::named("id"),
        Field::new("protocolId", "protocol_id"),
        Field::new("tenantId", "tenant_id"),
    ];
    const UNIQUE_CONSTRAINT: &'static [&'static str] = &["protocol_id", "tenant_id", "protocol_id"];

    fn id(&self) -> Option<SqlValue> {
        self.id.map(SqlValue::Int)
    }

    fn column_values(&self) -> ColumnMap {
        column_map! {
            "id" => self.id,
            "protocol_id" => &self.protocol_id,
            "tenant_id" => self.tenant_id,
        }
    }

    fn property(&self, name: &str) -> Option<SqlValue> {
        match name {
            "id" => Some(self.id.to_sql_value()),
            "protocolId" => Some(self.protocol_id.as_str().to_sql_value()),
            "tenantId" => Some(self.tenant_id.to_sql_value()),
            _ => None,
        }
    }
}

/// Entity with a unique column that has no readable property.
#[derive(Debug, Clone, PartialEq)]
pub struct Opaque {
    pub id: Option<i64>,
    pub secret: String,
}

impl Entity for Opaque {
    const NAME: &'static str = "Opaque";
    const TABLE: &'static str = "opaque";
    const FIELDS: &'static [Field] = &[Field::named("id"), Field::named("secret_key").unique()];

    fn id(&self) -> Option<SqlValue> {
        self.id.map(SqlValue::Int)
    }

    fn column_values(&self) -> ColumnMap {
        column_map! { "id" => self.id, "secret_key" => &self.secret }
    }

    fn property(&self, name: &str) -> Option<SqlValue> {
        match name {
            "id" => Some(self.id.to_sql_value()),
            _ => None,
        }
    }
}

/// Entity without any unique identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: Option<i64>,
    pub body: String,
}

impl Entity for Note {
    const NAME: &'static str = "Note";
    const TABLE: &'static str = "notes";
    const FIELDS: &'static [Field] = &[Field::named("id"), Field::named("body")];

    fn id(&self) -> Option<SqlValue> {
        self.id.map(SqlValue::Int)
    }

    fn column_values(&self) -> ColumnMap {
        column_map! { "id" => self.id, "body" => &self.body }
    }

    fn property(&self, name: &str) -> Option<SqlValue> {
        match name {
            "id" => Some(self.id.to_sql_value()),
            "body" => Some(self.body.as_str().to_sql_value()),
            _ => None,
        }
    }
}

/// Collects formatted log output for assertions.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Routes this thread's tracing events into the buffer until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let buffer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || buffer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
