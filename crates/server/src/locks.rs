use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tokio::task::JoinError;

/// Per-exam read/write locks keyed by the exam's storage directory.
///
/// Uploads take the write lock for the whole receive + extract sequence and
/// listings take the read lock, so a listing never observes a half-replaced
/// extraction tree.
#[derive(Clone, Default)]
pub struct ExamLocks {
    inner: Arc<Mutex<HashMap<PathBuf, Arc<RwLock<()>>>>>,
}

impl ExamLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, key: &Path) -> Arc<RwLock<()>> {
        let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        // Drop locks nobody is holding or waiting on.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(key.to_path_buf()).or_default().clone()
    }

    pub async fn write(&self, key: &Path) -> OwnedRwLockWriteGuard<()> {
        self.lock_for(key).write_owned().await
    }

    pub async fn read(&self, key: &Path) -> OwnedRwLockReadGuard<()> {
        self.lock_for(key).read_owned().await
    }

    /// Run `work` on the blocking pool under the exam's write lock.
    ///
    /// The guard moves into the blocking task, so the lock stays held until
    /// `work` returns even when the awaiting request future is dropped.
    pub async fn run_exclusive<F, T>(&self, key: &Path, work: F) -> Result<T, JoinError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.write(key).await;
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            work()
        })
        .await
    }

    /// Like [`ExamLocks::run_exclusive`] but under the read lock.
    pub async fn run_shared<F, T>(&self, key: &Path, work: F) -> Result<T, JoinError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.read(key).await;
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            work()
        })
        .await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
