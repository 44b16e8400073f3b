//! End-to-end upserts against an in-memory SQLite database.

use oxide_upsert::{
    column_map, ColumnMap, Entity, Field, ProviderRegistry, SqlValue, ToSqlValue, UpsertManager,
    UpsertOptions,
};
use oxide_upsert_sqlite::{SqliteConnection, SqliteStore};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
struct Device {
    id: Option<i64>,
    serial: String,
    name: String,
    create_time: String,
    update_time: Option<String>,
}

impl Device {
    fn new(serial: &str, name: &str, create_time: &str) -> Self {
        Self {
            id: None,
            serial: serial.to_string(),
            name: name.to_string(),
            create_time: create_time.to_string(),
            update_time: None,
        }
    }
}

impl Entity for Device {
    const NAME: &'static str = "Device";
    const TABLE: &'static str = "devices";
    const FIELDS: &'static [Field] = &[
        Field::named("id"),
        Field::named("serial").unique(),
        Field::named("name"),
        Field::named("create_time"),
        Field::named("update_time"),
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
            "update_time" => self.update_time.as_deref(),
        }
    }

    fn property(&self, name: &str) -> Option<SqlValue> {
        match name {
            "id" => Some(self.id.to_sql_value()),
            "serial" => Some(self.serial.as_str().to_sql_value()),
            "name" => Some(self.name.as_str().to_sql_value()),
            "create_time" => Some(self.create_time.as_str().to_sql_value()),
            "update_time" => Some(self.update_time.as_deref().to_sql_value()),
            _ => None,
        }
    }
}

type Manager = UpsertManager<SqliteConnection, SqliteStore>;

async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    sqlx::query(
        "CREATE TABLE devices (
            id INTEGER PRIMARY KEY,
            serial TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            create_time TEXT NOT NULL,
            update_time TEXT
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool
}

async fn create_manager() -> Manager {
    let pool = create_test_pool().await;
    UpsertManager::new(
        SqliteConnection::new(pool.clone()),
        SqliteStore::new(pool),
        ProviderRegistry::default(),
    )
}

async fn all_devices(manager: &Manager) -> Vec<Device> {
    sqlx::query_as("SELECT id, serial, name, create_time, update_time FROM devices ORDER BY id")
        .fetch_all(manager.connection().pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_upsert_inserts_then_updates() {
    let manager = create_manager().await;

    manager
        .upsert(Device::new("A-1", "Sensor", "2024-01-01 00:00:00"), true)
        .await
        .unwrap();
    let devices = all_devices(&manager).await;
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].update_time, None);

    manager
        .upsert(Device::new("A-1", "Renamed", "2030-01-01 00:00:00"), true)
        .await
        .unwrap();

    let devices = all_devices(&manager).await;
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, Some(1));
    assert_eq!(devices[0].name, "Renamed");
    assert_eq!(devices[0].create_time, "2024-01-01 00:00:00");
    assert!(devices[0].update_time.is_some());
}

#[tokio::test]
async fn test_upsert_skips_refetch_by_default() {
    let manager = create_manager().await;

    let device = manager
        .upsert(Device::new("A-1", "Sensor", "2024-01-01 00:00:00"), true)
        .await
        .unwrap();

    assert_eq!(device.id, None);
}

#[tokio::test]
async fn test_upsert_refetches_when_enabled() {
    let options = UpsertOptions {
        skip_refetch_on_sqlite: false,
        ..UpsertOptions::default()
    };
    let manager = create_manager().await.with_options(options);

    let first = manager
        .upsert(Device::new("A-1", "Sensor", "2024-01-01 00:00:00"), true)
        .await
        .unwrap();
    let second = manager
        .upsert(Device::new("A-1", "Renamed", "2024-01-01 00:00:00"), true)
        .await
        .unwrap();

    assert_eq!(first.id, Some(1));
    assert_eq!(second.id, Some(1));
    assert_eq!(second.name, "Renamed");
}

#[tokio::test]
async fn test_persisted_entity_is_saved_directly() {
    let manager = create_manager().await;
    manager
        .upsert(Device::new("A-1", "Sensor", "2024-01-01 00:00:00"), false)
        .await
        .unwrap();

    let mut device = all_devices(&manager).await.remove(0);
    device.name = String::from("Edited");
    manager.upsert(device, true).await.unwrap();

    let devices = all_devices(&manager).await;
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].name, "Edited");
}

#[tokio::test]
async fn test_execute_batch() {
    let manager = create_manager().await;

    let rows = vec![
        column_map! {
            "id" => 1_i64,
            "serial" => "A-1",
            "name" => "O'Brien",
            "create_time" => "2024-01-01 00:00:00",
        },
        column_map! {
            "id" => 2_i64,
            "serial" => "A-2",
            "name" => "Smith",
            "create_time" => "2024-01-01 00:00:00",
        },
    ];
    let affected = manager.execute_batch::<Device>(&rows).await.unwrap();
    assert_eq!(affected, 2);

    let rows = vec![column_map! {
        "id" => 2_i64,
        "serial" => "A-2",
        "name" => "Jones",
        "create_time" => "2024-01-01 00:00:00",
    }];
    manager.execute_batch::<Device>(&rows).await.unwrap();

    let names: Vec<String> = all_devices(&manager)
        .await
        .into_iter()
        .map(|device| device.name)
        .collect();
    assert_eq!(names, ["O'Brien", "Jones"]);
}

#[tokio::test]
async fn test_execute_batch_empty() {
    let manager = create_manager().await;
    assert_eq!(manager.execute_batch::<Device>(&[]).await.unwrap(), 0);
}

#[tokio::test]
async fn test_execute_with_explicit_update_data() {
    let manager = create_manager().await;

    let insert = column_map! {
        "serial" => "A-1",
        "name" => "Sensor",
        "create_time" => "2024-01-01 00:00:00",
    };
    let unique = [String::from("serial")];
    manager
        .execute("devices", &insert, &ColumnMap::new(), &unique)
        .await
        .unwrap();
    manager
        .execute(
            "devices",
            &insert,
            &column_map! { "name" => "Patched" },
            &unique,
        )
        .await
        .unwrap();

    let devices = all_devices(&manager).await;
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].name, "Patched");
}
