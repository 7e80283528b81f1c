//! Persistent storage for notification history.
//!
//! Two backends are provided:
//! - JSON file: a single array of events, rewritten on every save
//! - SQLite: one row per event, replaced in a transaction on every save

use crate::error::{AppError, Result};
use crate::types::NotificationEvent;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Storage backend for the bounded notification history.
pub trait HistoryStore: Send {
    /// Load persisted events, oldest first. Missing storage is an empty history.
    fn load(&self) -> Result<Vec<NotificationEvent>>;

    /// Replace the persisted history with `events`.
    fn save(&self, events: &[NotificationEvent]) -> Result<()>;
}

/// Open the store for `path`: SQLite when `sqlite` is set, JSON otherwise.
pub fn open_history_store(path: &Path, sqlite: bool) -> Result<Box<dyn HistoryStore>> {
    if sqlite {
        Ok(Box::new(SqliteHistoryStore::new(path)?))
    } else {
        Ok(Box::new(JsonHistoryStore::new(path)))
    }
}

/// History kept in a JSON file.
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Result<Vec<NotificationEvent>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No history file at {:?}", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(AppError::Persistence(format!("reading {:?}: {}", self.path, e))),
        };

        let events: Vec<NotificationEvent> = serde_json::from_str(&content)
            .map_err(|e| AppError::Persistence(format!("parsing {:?}: {}", self.path, e)))?;

        info!("Loaded {} notifications from history", events.len());
        Ok(events)
    }

    fn save(&self, events: &[NotificationEvent]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string(events)?;
        fs::write(&self.path, content)
            .map_err(|e| AppError::Persistence(format!("writing {:?}: {}", self.path, e)))?;

        debug!("Saved {} notifications to history", events.len());
        Ok(())
    }
}

/// History kept in a SQLite table.
pub struct SqliteHistoryStore {
    conn: Mutex<Connection>,
}

impl SqliteHistoryStore {
    /// Open (or create) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let store = Self {
            conn: Mutex::new(Connection::open(path)?),
        };
        store.init_schema()?;
        info!("SQLite history store initialized");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Persistence("history connection poisoned".to_string()))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS notification_history (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL,
                type TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn load(&self) -> Result<Vec<NotificationEvent>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT event_json FROM notification_history ORDER BY seq ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut events = Vec::new();
        for row in rows {
            let json = row?;
            let event = serde_json::from_str(&json)
                .map_err(|e| AppError::Persistence(format!("corrupt history row: {}", e)))?;
            events.push(event);
        }

        info!("Loaded {} notifications from history", events.len());
        Ok(events)
    }

    fn save(&self, events: &[NotificationEvent]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM notification_history", [])?;
        for event in events {
            tx.execute(
                "INSERT INTO notification_history (id, type, timestamp, event_json)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    event.id.to_string(),
                    event.notification_type.as_str(),
                    event.timestamp.to_rfc3339(),
                    serde_json::to_string(event)?,
                ],
            )?;
        }
        tx.commit()?;

        debug!("Saved {} notifications to history", events.len());
        Ok(())
    }
}
