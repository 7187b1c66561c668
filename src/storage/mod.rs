pub mod json_backend;
pub mod memory;

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::BudgetError;

pub type Result<T> = std::result::Result<T, BudgetError>;

/// Storage key for the transaction collection.
pub const TRANSACTIONS_KEY: &str = "transactions";
/// Storage key for the category → limit map.
pub const BUDGETS_KEY: &str = "budgets";
/// Storage key for recurring rules.
pub const RECURRING_KEY: &str = "recurring";

/// Minimal key-value persistence. Each collection is stored independently as
/// a JSON document under its own key.
pub trait StorageBackend: Send + Sync {
    /// Returns the raw document for `key`, or `None` when nothing was stored.
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, data: &str) -> Result<()>;
}

/// Reads and decodes one collection. Missing, unreadable, or corrupt entries
/// fall back to `T::default()` with a warning; startup never fails on them.
pub fn load_or_default<T>(backend: &dyn StorageBackend, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match backend.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read stored collection; starting empty");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, error = %err, "stored collection is corrupt; starting empty");
            T::default()
        }
    }
}

/// Encodes and writes one collection.
pub fn save<T>(backend: &dyn StorageBackend, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string_pretty(value)?;
    backend.write(key, &json)
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
