//! In-memory store for tests and single-process harnesses.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

use super::{ChangeEvent, StateStore};
use crate::error::Result;

const CHANGE_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Value>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            records: Mutex::new(HashMap::new()),
            changes,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let old_value = self
            .records
            .lock()
            .unwrap()
            .insert(key.to_string(), value.clone());
        // No receivers is fine; the event is simply unobserved.
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_set_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("settings").unwrap().is_none());
        store.set("settings", json!({"goal": 1800})).unwrap();
        assert_eq!(store.get("settings").unwrap(), Some(json!({"goal": 1800})));
    }

    #[tokio::test]
    async fn change_events_carry_old_and_new_values() {
        let store = MemoryStore::new();
        let mut changes = store.subscribe();

        store.set("settings", json!({"goal": 1800})).unwrap();
        store.set("settings", json!({"goal": 2000})).unwrap();

        let first = changes.recv().await.unwrap();
        assert_eq!(first.key, "settings");
        assert!(first.old_value.is_none());
        assert_eq!(first.new_value, Some(json!({"goal": 1800})));

        let second = changes.recv().await.unwrap();
        assert_eq!(second.old_value, Some(json!({"goal": 1800})));
        assert_eq!(second.new_value, Some(json!({"goal": 2000})));
    }
}
