//! Named critical sections keyed by `toggle_answer_<topic_id>`.
//!
//! Two backends, picked from `lock.backend`:
//! - [`LocalTopicLock`]: keyed async mutex table, correct inside one process only.
//! - [`DatabaseTopicLock`]: lease rows in `distributed_locks`, shared by every process
//!   using the same database. A lease outlives a crashed holder by at most
//!   `lock.lease_seconds`.
//!
//! Acquisition waits at most `lock.wait_timeout_ms` and then fails with
//! [`LockError::Timeout`], which callers surface as a retryable failure.

use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

use crate::config::{LockBackend, LockConfig};
use crate::db::LockRepository;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("Timed out waiting for lock {key}")]
    Timeout { key: String },

    #[error("Lock backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

#[async_trait::async_trait]
pub trait TopicLock: Send + Sync {
    /// Blocks until `key` is held by the caller or the wait timeout expires.
    async fn acquire(&self, key: &str) -> Result<LockGuard, LockError>;
}

/// Proof of holding a named lock. Call [`LockGuard::release`] when done. A guard dropped
/// without release (a cancelled request, say) frees a local slot at once and hands a
/// database lease to a background release task.
#[must_use = "the lock is released when the guard is released or dropped"]
#[derive(Debug)]
pub struct LockGuard {
    key: String,
    inner: Option<GuardInner>,
}

#[derive(Debug)]
enum GuardInner {
    Local(OwnedMutexGuard<()>),
    Database {
        conn: DatabaseConnection,
        token: String,
    },
}

impl LockGuard {
    const fn new(key: String, inner: GuardInner) -> Self {
        Self {
            key,
            inner: Some(inner),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn release(mut self) {
        match self.inner.take() {
            Some(GuardInner::Database { conn, token }) => {
                release_lease(&conn, &self.key, &token).await;
            }
            Some(GuardInner::Local(guard)) => drop(guard),
            None => {}
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let Some(GuardInner::Database { conn, token }) = self.inner.take() else {
            return;
        };

        let key = std::mem::take(&mut self.key);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(key = %key, "Lock guard dropped, releasing lease in background");
                handle.spawn(async move {
                    release_lease(&conn, &key, &token).await;
                });
            }
            Err(_) => warn!(key = %key, "Lock guard dropped outside a runtime, lease will expire"),
        }
    }
}

async fn release_lease(conn: &DatabaseConnection, key: &str, token: &str) {
    match LockRepository::new(conn).release(key, token).await {
        Ok(true) => {}
        Ok(false) => warn!(key, "Lock lease expired before release"),
        Err(e) => warn!(key, error = %e, "Failed to release lock"),
    }
}

#[must_use]
pub fn build_topic_lock(config: &LockConfig, conn: DatabaseConnection) -> Arc<dyn TopicLock> {
    match config.backend {
        LockBackend::Local => Arc::new(LocalTopicLock::new(Duration::from_millis(
            config.wait_timeout_ms,
        ))),
        LockBackend::Database => Arc::new(DatabaseTopicLock::new(conn, config)),
    }
}

pub struct LocalTopicLock {
    wait_timeout: Duration,
    slots: Mutex<HashMap<String, Weak<tokio::sync::Mutex<()>>>>,
}

impl LocalTopicLock {
    #[must_use]
    pub fn new(wait_timeout: Duration) -> Self {
        Self {
            wait_timeout,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some(existing) = slots.get(key).and_then(Weak::upgrade) {
            return existing;
        }

        slots.retain(|_, slot| slot.strong_count() > 0);
        let slot = Arc::new(tokio::sync::Mutex::new(()));
        slots.insert(key.to_string(), Arc::downgrade(&slot));
        slot
    }
}

#[async_trait::async_trait]
impl TopicLock for LocalTopicLock {
    async fn acquire(&self, key: &str) -> Result<LockGuard, LockError> {
        let slot = self.slot(key);

        match tokio::time::timeout(self.wait_timeout, slot.lock_owned()).await {
            Ok(guard) => Ok(LockGuard::new(key.to_string(), GuardInner::Local(guard))),
            Err(_) => Err(LockError::Timeout {
                key: key.to_string(),
            }),
        }
    }
}

pub struct DatabaseTopicLock {
    conn: DatabaseConnection,
    wait_timeout: Duration,
    lease: Duration,
    retry_interval: Duration,
}

impl DatabaseTopicLock {
    #[must_use]
    pub fn new(conn: DatabaseConnection, config: &LockConfig) -> Self {
        Self {
            conn,
            wait_timeout: Duration::from_millis(config.wait_timeout_ms),
            lease: Duration::from_secs(config.lease_seconds),
            retry_interval: Duration::from_millis(config.retry_interval_ms.max(1)),
        }
    }
}

#[async_trait::async_trait]
impl TopicLock for DatabaseTopicLock {
    async fn acquire(&self, key: &str) -> Result<LockGuard, LockError> {
        let token = uuid::Uuid::new_v4().to_string();
        let lease_ms = i64::try_from(self.lease.as_millis()).unwrap_or(i64::MAX);
        let deadline = tokio::time::Instant::now() + self.wait_timeout;
        let repo = LockRepository::new(&self.conn);

        loop {
            let now_ms = chrono::Utc::now().timestamp_millis();
            if repo.try_acquire(key, &token, now_ms, lease_ms).await? {
                debug!(key, "Acquired database lock");
                return Ok(LockGuard::new(
                    key.to_string(),
                    GuardInner::Database {
                        conn: self.conn.clone(),
                        token,
                    },
                ));
            }

            if tokio::time::Instant::now() + self.retry_interval > deadline {
                return Err(LockError::Timeout {
                    key: key.to_string(),
                });
            }

            tokio::time::sleep(self.retry_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn local_lock_times_out_while_held() {
        let lock = LocalTopicLock::new(Duration::from_millis(50));
        let guard = lock.acquire("toggle_answer_1").await.unwrap();

        let err = lock.acquire("toggle_answer_1").await.unwrap_err();
        assert!(matches!(err, LockError::Timeout { .. }));

        // Other keys are independent.
        let other = lock.acquire("toggle_answer_2").await.unwrap();
        other.release().await;

        guard.release().await;
        let again = lock.acquire("toggle_answer_1").await.unwrap();
        assert_eq!(again.key(), "toggle_answer_1");
        again.release().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn local_lock_serializes_holders() {
        let lock = Arc::new(LocalTopicLock::new(Duration::from_secs(5)));
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let lock = Arc::clone(&lock);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            handles.push(tokio::spawn(async move {
                let guard = lock.acquire("toggle_answer_7").await.unwrap();
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
                guard.release().await;
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropped_local_guard_frees_the_key() {
        let lock = LocalTopicLock::new(Duration::from_millis(50));

        let held = tokio::time::timeout(Duration::from_millis(20), async {
            let _guard = lock.acquire("toggle_answer_3").await.unwrap();
            std::future::pending::<()>().await;
        })
        .await;
        assert!(held.is_err());

        let again = lock.acquire("toggle_answer_3").await.unwrap();
        again.release().await;
    }

    #[test]
    fn released_slots_are_pruned() {
        let lock = LocalTopicLock::new(Duration::from_millis(10));
        drop(lock.slot("a"));
        let _b = lock.slot("b");
        assert_eq!(lock.slots.lock().unwrap().len(), 1);
    }
}
