//! Process-wide cache of categories with accepted answers enabled.
//!
//! The set is materialised by a single query on the first read after construction or
//! invalidation. No lock is held across that query: concurrent misses may rebuild the
//! set twice. Every invalidation bumps a generation counter, and a rebuild only
//! publishes its result when no invalidation happened while it was querying.

use anyhow::Result;
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::db::CategoryRepository;
use crate::services::category_service::CategorySaveObserver;

pub struct CategoryAllowlistCache {
    conn: DatabaseConnection,
    enabled: RwLock<Option<Arc<HashSet<i32>>>>,
    generation: AtomicU64,
}

impl CategoryAllowlistCache {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            enabled: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn is_enabled(&self, category_id: i32) -> Result<bool> {
        Ok(self.enabled_ids().await?.contains(&category_id))
    }

    /// The cached set, rebuilding it when unset.
    pub async fn enabled_ids(&self) -> Result<Arc<HashSet<i32>>> {
        if let Some(cached) = self.cached() {
            return Ok(cached);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let ids: HashSet<i32> = CategoryRepository::new(&self.conn)
            .enabled_ids()
            .await?
            .into_iter()
            .collect();
        let ids = Arc::new(ids);

        if self.publish(generation, Arc::clone(&ids)) {
            debug!(count = ids.len(), "Rebuilt accepted-answer category allowlist");
        } else {
            debug!("Allowlist invalidated during rebuild, not caching");
        }

        Ok(ids)
    }

    /// Drops the cached set; the next read rebuilds it.
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.enabled.write() {
            self.generation.fetch_add(1, Ordering::AcqRel);
            *guard = None;
        }
    }

    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.cached().is_some()
    }

    fn cached(&self) -> Option<Arc<HashSet<i32>>> {
        self.enabled.read().ok().and_then(|guard| guard.clone())
    }

    /// Stores `ids` unless the cache was invalidated after `generation` was read.
    fn publish(&self, generation: u64, ids: Arc<HashSet<i32>>) -> bool {
        let Ok(mut guard) = self.enabled.write() else {
            return false;
        };
        if self.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        *guard = Some(ids);
        true
    }
}

impl CategorySaveObserver for CategoryAllowlistCache {
    fn category_saved(&self, category_id: i32) {
        debug!(category_id, "Category saved, invalidating allowlist");
        self.invalidate();
    }
}
