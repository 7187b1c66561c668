use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::errors::BudgetError;

use super::{Result, StorageBackend};

/// In-process store. Clones share the same entries, which lets a test reopen
/// a session against the data a previous session wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write` calls seen so far, across all keys.
    pub fn writes(&self) -> usize {
        self.lock().map(|guard| guard.writes).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| BudgetError::StorageError("memory store lock poisoned".into()))
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn write(&self, key: &str, data: &str) -> Result<()> {
        let mut guard = self.lock()?;
        guard.entries.insert(key.to_string(), data.to_string());
        guard.writes += 1;
        Ok(())
    }
}
