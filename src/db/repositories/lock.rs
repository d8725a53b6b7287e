use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::entities::distributed_locks;

/// Lease rows of the database-backed named lock.
pub struct LockRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> LockRepository<'c, C> {
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Takes the lease on `key` unless a live lease is held. Expired leases are reclaimed.
    pub async fn try_acquire(
        &self,
        key: &str,
        token: &str,
        now_ms: i64,
        lease_ms: i64,
    ) -> Result<bool> {
        distributed_locks::Entity::delete_many()
            .filter(distributed_locks::Column::Key.eq(key))
            .filter(distributed_locks::Column::ExpiresAt.lte(now_ms))
            .exec(self.conn)
            .await?;

        let inserted = distributed_locks::Entity::insert(distributed_locks::ActiveModel {
            key: Set(key.to_string()),
            token: Set(token.to_string()),
            expires_at: Set(now_ms + lease_ms),
        })
        .on_conflict(
            OnConflict::column(distributed_locks::Column::Key)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.conn)
        .await?;

        Ok(inserted == 1)
    }

    /// Drops the lease if `token` still owns it.
    pub async fn release(&self, key: &str, token: &str) -> Result<bool> {
        let result = distributed_locks::Entity::delete_many()
            .filter(distributed_locks::Column::Key.eq(key))
            .filter(distributed_locks::Column::Token.eq(token))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn holder(&self, key: &str) -> Result<Option<distributed_locks::Model>> {
        Ok(distributed_locks::Entity::find_by_id(key.to_string())
            .one(self.conn)
            .await?)
    }
}
