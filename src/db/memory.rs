use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{bail, Result};

use super::Storage;

/// Process-local storage. Nothing survives a restart.
#[derive(Default)]
pub(crate) struct MemoryStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStorage {
    fn blobs(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Successful saves so far.
    #[cfg(test)]
    pub(crate) fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub(crate) fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&self, key: &str, value: &[u8]) {
        self.blobs().insert(key.to_string(), value.to_vec());
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            bail!("storage unavailable while loading '{key}'");
        }
        Ok(self.blobs().get(key).cloned())
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            bail!("storage unavailable while saving '{key}'");
        }
        self.blobs().insert(key.to_string(), value.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
