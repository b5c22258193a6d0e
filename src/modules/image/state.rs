use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::OwnedMutexGuard;

use crate::modules::image::model::Code;

/// Upload time per code. Lives only as long as the process; codes stored
/// before a restart report no timestamp.
#[derive(Default)]
pub struct UploadTimes {
    inner: RwLock<HashMap<Code, DateTime<Utc>>>,
}

impl UploadTimes {
    pub fn get(&self, code: &Code) -> Option<DateTime<Utc>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).get(code).copied()
    }

    pub fn set(&self, code: Code, at: DateTime<Utc>) {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).insert(code, at);
    }
}

/// One async mutex per code, held across the delete-then-write sequence.
/// Entries are never evicted; there are at most 10^4 codes.
#[derive(Default)]
pub struct CodeLocks {
    inner: Mutex<HashMap<Code, Arc<tokio::sync::Mutex<()>>>>,
}

impl CodeLocks {
    pub async fn lock(&self, code: &Code) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(code.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}
