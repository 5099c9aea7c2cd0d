//! In-memory cache of processor output.
//!
//! Each key owns its own slot lock: concurrent requests for the same
//! (mode, text, path) wait for the first writer, requests for other keys
//! proceed independently. Failures are not cached.

use super::Processed;
use crate::error::Result;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub mode: String,
    pub text: String,
    pub path: Option<PathBuf>,
}

type Slot = Arc<Mutex<Option<Processed>>>;

#[derive(Debug, Default)]
pub struct ProcessCache {
    slots: DashMap<CacheKey, Slot>,
}

impl ProcessCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it with `compute` on a miss.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Result<Processed>
    where
        F: FnOnce() -> Result<Processed>,
    {
        // The shard guard must be gone before the slot is locked.
        let slot = Arc::clone(self.slots.entry(key).or_default().value());
        let mut entry = slot.lock();
        if let Some(hit) = entry.as_ref() {
            return Ok(hit.clone());
        }
        let value = compute()?;
        *entry = Some(value.clone());
        Ok(value)
    }

    /// Number of keys holding a value.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = self
            .slots
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        slots.iter().filter(|slot| slot.lock().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots.clear();
    }
}
