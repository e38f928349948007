//! JSON-file-backed store.
//!
//! One JSON document holds every record, loaded on open and written through
//! on each `set`. The file is shared between processes: every read and
//! write first folds in foreign changes from disk, and a daemon can run
//! [`JsonFileStore::watch`] to surface them as change events without
//! waiting for its next read. Durability is best-effort single-user: there
//! is no file locking, so two simultaneous writers can still lose one
//! record write.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use super::{ChangeEvent, StateStore};
use crate::error::{Result, StoreError};

const CHANGE_CAPACITY: usize = 64;

pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<Map<String, Value>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl JsonFileStore {
    /// Open the store, loading any existing document.
    ///
    /// A missing file starts the store empty; an unparsable one is treated
    /// as empty rather than fatal, since the store is the only persistence
    /// mechanism and refusing to start would brick the coordinator.
    ///
    /// # Errors
    ///
    /// Returns an error when the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::OpenFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        }
        let records = Self::read_document(&path);
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Ok(Self {
            path,
            records: Mutex::new(records),
            changes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(path: &Path) -> Map<String, Value> {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str::<Value>(&content)
                .ok()
                .and_then(|v| v.as_object().cloned())
                .unwrap_or_default(),
            Err(_) => Map::new(),
        }
    }

    /// Fold writes made by other processes into this instance, publishing
    /// one change event per record that differs. A vanished document reads
    /// as empty, so external deletion surfaces as removals.
    pub fn sync(&self) {
        let mut records = self.records.lock().unwrap();
        self.sync_locked(&mut records);
    }

    fn sync_locked(&self, records: &mut Map<String, Value>) {
        let disk = Self::read_document(&self.path);
        if disk == *records {
            return;
        }
        for (key, old) in records.iter() {
            if disk.get(key) != Some(old) {
                let _ = self.changes.send(ChangeEvent {
                    key: key.clone(),
                    old_value: Some(old.clone()),
                    new_value: disk.get(key).cloned(),
                });
            }
        }
        for (key, new) in disk.iter() {
            if !records.contains_key(key) {
                let _ = self.changes.send(ChangeEvent {
                    key: key.clone(),
                    old_value: None,
                    new_value: Some(new.clone()),
                });
            }
        }
        *records = disk;
    }

    /// Poll the backing file so foreign writes surface as change events
    /// even when this process never reads. Aborting the returned handle
    /// stops the watcher.
    pub fn watch(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = time::interval(period);
            loop {
                ticker.tick().await;
                store.sync();
            }
        })
    }

    fn write_document(&self, records: &Map<String, Value>, key: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(&Value::Object(records.clone()))?;
        std::fs::write(&self.path, content).map_err(|e| {
            StoreError::WriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut records = self.records.lock().unwrap();
        self.sync_locked(&mut records);
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        // Take the on-disk document as the basis first, so the rewrite
        // below cannot clobber records another process added since our
        // last read.
        self.sync_locked(&mut records);
        let old_value = records.insert(key.to_string(), value.clone());
        if let Err(error) = self.write_document(&records, key) {
            // Roll back so memory matches the durable document.
            match old_value {
                Some(old) => records.insert(key.to_string(), old),
                None => records.remove(key),
            };
            return Err(error);
        }
        let _ = self.changes.send(ChangeEvent {
            key: key.to_string(),
            old_value,
            new_value: Some(value),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
