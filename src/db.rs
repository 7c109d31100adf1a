use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::AppData;

/// Fixed key the record is stored under.
pub const APP_DATA_KEY: &str = "cgpa_calculator_app_data";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to migrate schema: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("failed to encode app data: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key-value storage the record is persisted through.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    fn set(&self, key: &str, value: String)
        -> impl Future<Output = Result<(), StorageError>> + Send;
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `url` and brings the schema up to date.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get("value")))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (key) DO UPDATE
            SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Reads the saved record, falling back to the default record when nothing is
/// stored, the read fails, or the stored blob does not parse.
pub async fn load_app_data<S: KeyValueStore>(storage: &S) -> AppData {
    match storage.get(APP_DATA_KEY).await {
        Ok(Some(raw)) => match serde_json::from_str::<AppData>(&raw) {
            Ok(data) => {
                tracing::info!(semesters = data.semesters.len(), "loaded app data");
                data
            }
            Err(error) => {
                tracing::warn!(%error, "stored app data is unreadable, starting from defaults");
                AppData::default()
            }
        },
        Ok(None) => {
            tracing::info!("no saved app data, starting from defaults");
            AppData::default()
        }
        Err(error) => {
            tracing::warn!(%error, "failed to load app data, starting from defaults");
            AppData::default()
        }
    }
}

/// Writes `data` as one complete snapshot under [`APP_DATA_KEY`].
pub async fn save_app_data<S: KeyValueStore>(
    storage: &S,
    data: &AppData,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(data)?;
    let bytes = raw.len();
    storage.set(APP_DATA_KEY, raw).await?;
    tracing::debug!(bytes, "saved app data");
    Ok(())
}

/// Handle to the background task that writes snapshots in submission order.
///
/// Submitting never waits. A failed save is logged and dropped; the in-memory
/// record stays authoritative until the next save succeeds.
pub struct Persister {
    tx: mpsc::UnboundedSender<AppData>,
    handle: JoinHandle<()>,
}

impl Persister {
    pub fn spawn<S: KeyValueStore>(storage: Arc<S>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<AppData>();
        let handle = tokio::spawn(async move {
            while let Some(mut data) = rx.recv().await {
                // Snapshots are complete, so only the newest queued one matters.
                while let Ok(newer) = rx.try_recv() {
                    data = newer;
                }
                if let Err(error) = save_app_data(storage.as_ref(), &data).await {
                    tracing::warn!(%error, "failed to save app data");
                }
            }
        });
        Self { tx, handle }
    }

    pub fn submit(&self, data: AppData) {
        if self.tx.send(data).is_err() {
            tracing::warn!("save writer has stopped, snapshot dropped");
        }
    }

    /// Waits for every submitted snapshot to be written (or to fail).
    pub async fn flush(self) {
        let Persister { tx, handle } = self;
        drop(tx);
        if let Err(error) = handle.await {
            tracing::warn!(%error, "save writer terminated abnormally");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::{KeyValueStore, StorageError};

    /// In-memory store; clones share the same entries.
    #[derive(Clone, Default)]
    pub struct MemoryStore {
        entries: Arc<Mutex<HashMap<String, String>>>,
        writes: Arc<AtomicUsize>,
    }

    impl MemoryStore {
        pub fn with_entry(key: &str, value: &str) -> Self {
            let store = Self::default();
            store
                .entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            store
        }

        pub fn value(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        pub fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl KeyValueStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.value(key))
        }

        async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
            self.entries.lock().unwrap().insert(key.to_string(), value);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Every read and write fails.
    #[derive(Clone, Default)]
    pub struct FailingStore {
        attempts: Arc<AtomicUsize>,
    }

    impl FailingStore {
        pub fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Database(sqlx::Error::PoolClosed))
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::Database(sqlx::Error::PoolClosed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FailingStore, MemoryStore};
    use super::*;
    use crate::models::{Course, LetterGrade, Semester};
    use uuid::Uuid;

    fn sample_data() -> AppData {
        let mut data = AppData::default();
        data.settings.active_grade_scale = data.settings.grade_scales[1].clone();
        data.semesters.push(Semester {
            id: Uuid::new_v4(),
            name: "Spring 2026".to_string(),
            courses: vec![
                Course {
                    id: Uuid::new_v4(),
                    name: "Linear Algebra".to_string(),
                    credit_hours: 3.0,
                    grade: LetterGrade::AMinus,
                    grade_point: 4.7,
                },
                Course {
                    id: Uuid::new_v4(),
                    name: "Seminar".to_string(),
                    credit_hours: 0.5,
                    grade: LetterGrade::CPlus,
                    grade_point: 3.3,
                },
            ],
            gpa: 4.5,
        });
        data
    }

    #[tokio::test]
    async fn missing_record_loads_default() {
        let storage = MemoryStore::default();
        assert_eq!(load_app_data(&storage).await, AppData::default());
    }

    #[tokio::test]
    async fn corrupt_record_loads_default() {
        let storage = MemoryStore::with_entry(APP_DATA_KEY, "{\"semesters\": [oops");
        assert_eq!(load_app_data(&storage).await, AppData::default());
    }

    #[tokio::test]
    async fn failed_read_loads_default() {
        assert_eq!(load_app_data(&FailingStore::default()).await, AppData::default());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let storage = MemoryStore::default();
        let data = sample_data();
        save_app_data(&storage, &data).await.unwrap();
        assert_eq!(load_app_data(&storage).await, data);
    }

    #[tokio::test]
    async fn sqlite_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("record.db").display());

        let storage = SqliteStore::connect(&url).await.unwrap();
        assert_eq!(storage.get(APP_DATA_KEY).await.unwrap(), None);

        save_app_data(&storage, &AppData::default()).await.unwrap();
        let data = sample_data();
        save_app_data(&storage, &data).await.unwrap();
        drop(storage);

        let reopened = SqliteStore::connect(&url).await.unwrap();
        assert_eq!(load_app_data(&reopened).await, data);
    }

    #[tokio::test]
    async fn persister_writes_latest_snapshot() {
        let storage = MemoryStore::default();
        let persister = Persister::spawn(Arc::new(storage.clone()));

        let mut data = sample_data();
        persister.submit(data.clone());
        data.semesters[0].name = "Renamed".to_string();
        persister.submit(data.clone());
        persister.flush().await;

        let saved: AppData =
            serde_json::from_str(&storage.value(APP_DATA_KEY).unwrap()).unwrap();
        assert_eq!(saved, data);
        assert!(storage.writes() >= 1);
    }

    #[tokio::test]
    async fn persister_swallows_save_failures() {
        let storage = FailingStore::default();
        let persister = Persister::spawn(Arc::new(storage.clone()));
        persister.submit(sample_data());
        persister.flush().await;
        assert_eq!(storage.attempts(), 1);
    }
}
