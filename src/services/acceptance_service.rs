//! Accept/unaccept state transitions of a topic's answer.
//!
//! Per topic the state moves `Unsolved -> Solved(post) -> Unsolved`, or directly from
//! `Solved(a)` to `Solved(b)`. Transitions for one topic are serialized on the named
//! lock `toggle_answer_<topic_id>`; callers authorize and rate-limit beforehand.

use crate::domain::SolvedStatus;
use crate::models::post::Post;
use crate::models::solution::Solution;
use crate::models::topic::Topic;
use crate::models::user::User;
use crate::services::topic_lock::LockError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcceptanceError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Rate limited, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Not found: {0}")]
    NotFound(String),

    /// The topic lock was busy for the whole wait timeout. Safe to retry the whole
    /// operation, re-checking permissions first.
    #[error("Topic {topic_id} is busy, try again")]
    LockTimeout { topic_id: i32 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AcceptanceError {
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout { .. } | Self::RateLimited { .. })
    }

    pub(crate) fn from_lock(err: LockError, topic_id: i32) -> Self {
        match err {
            LockError::Timeout { .. } => Self::LockTimeout { topic_id },
            LockError::Backend(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<sea_orm::DbErr> for AcceptanceError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AcceptanceError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(db_err) = err.downcast_ref::<sea_orm::DbErr>() {
            return Self::Database(db_err.to_string());
        }
        Self::Internal(err.to_string())
    }
}

/// Domain service for accepted answers.
///
/// # Examples
///
/// ```rust,ignore
/// use solved::services::{AcceptanceError, AcceptanceService};
/// use std::sync::Arc;
///
/// async fn example(service: Arc<dyn AcceptanceService>, post: Post, user: User, topic: Topic)
///     -> Result<(), AcceptanceError>
/// {
///     service.accept(&post, &user, &topic).await?;
///     service.unaccept(&post, &topic).await?;
///     Ok(())
/// }
/// ```
#[async_trait::async_trait]
pub trait AcceptanceService: Send + Sync {
    /// Makes `post` the accepted answer of `topic`, replacing any previous answer.
    ///
    /// # Errors
    ///
    /// - [`AcceptanceError::Validation`] if the post belongs to another topic
    /// - [`AcceptanceError::Conflict`] if the post already answers another topic
    /// - [`AcceptanceError::LockTimeout`] if the topic lock stayed busy
    async fn accept(
        &self,
        post: &Post,
        acting_user: &User,
        topic: &Topic,
    ) -> Result<Solution, AcceptanceError>;

    /// Removes `post` as the accepted answer of `topic`. A no-op when it is not the answer.
    ///
    /// # Errors
    ///
    /// Returns [`AcceptanceError::LockTimeout`] if the topic lock stayed busy.
    async fn unaccept(&self, post: &Post, topic: &Topic) -> Result<(), AcceptanceError>;

    /// Cleanup hook for a destroyed post: drops the solution it backs, if any.
    async fn post_destroyed(&self, post_id: i32) -> Result<(), AcceptanceError>;

    async fn status(&self, topic_id: i32) -> Result<SolvedStatus, AcceptanceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(AcceptanceError::LockTimeout { topic_id: 1 }.is_retryable());
        assert!(AcceptanceError::RateLimited { retry_after_secs: 3 }.is_retryable());
        assert!(!AcceptanceError::PermissionDenied.is_retryable());
        assert!(!AcceptanceError::Conflict("taken".into()).is_retryable());
    }

    #[test]
    fn lock_timeouts_keep_their_topic() {
        let err = AcceptanceError::from_lock(
            LockError::Timeout {
                key: "toggle_answer_12".into(),
            },
            12,
        );
        assert!(matches!(err, AcceptanceError::LockTimeout { topic_id: 12 }));
    }
}
