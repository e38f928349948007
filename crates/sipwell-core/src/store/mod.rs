//! State store boundary.
//!
//! The store is a durable key→JSON mapping and the single shared mutable
//! resource in the system. Serialization of writes comes from convention,
//! not locks: only the coordinator writes the `settings` record and the
//! date-keyed day records; UI contexts hold a request sender and nothing
//! else. Every write is announced on a change-notification stream so the
//! coordinator reacts to settings edits regardless of which context made
//! them.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::Result;

/// Store record holding the settings singleton.
pub const SETTINGS_KEY: &str = "settings";

/// One store mutation, keyed by record name.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// Durable key→JSON mapping with change notifications.
pub trait StateStore: Send + Sync + 'static {
    /// Read a record.
    ///
    /// # Errors
    ///
    /// Returns a store error when the underlying read is rejected.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a record, overwriting any prior content for that key.
    ///
    /// # Errors
    ///
    /// Returns a store error when the underlying write is rejected; a
    /// rejected write publishes no change event.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Subscribe to the change-notification stream.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
