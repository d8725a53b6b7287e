//! `SeaORM` implementation of the [`AcceptanceService`] trait.
//!
//! Every transition runs in two phases while the topic lock is held:
//! 1. all row changes (solution, user actions, notifications, timer) in one database
//!    transaction, so a uniqueness failure leaves nothing behind;
//! 2. after commit, web hook payloads and bus events.

use chrono::Utc;
use sea_orm::DatabaseTransaction;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::config::{Config, SolvedConfig};
use crate::constants::{notifications::ACCEPTED_MESSAGE, toggle_answer_lock_key};
use crate::db::{
    NewNotification, NotificationRepository, PostRepository, SolutionRepository, Store,
    TimerRepository, TopicRepository, UserActionRepository, format_timestamp,
    is_unique_violation, parse_timestamp,
};
use crate::domain::events::SolvedEvent;
use crate::domain::{NotificationKind, SolvedStatus};
use crate::models::post::Post;
use crate::models::solution::Solution;
use crate::models::topic::Topic;
use crate::models::user::User;
use crate::services::acceptance_service::{AcceptanceError, AcceptanceService};
use crate::services::topic_lock::{LockGuard, TopicLock};
use crate::services::webhooks::WebhookService;

pub struct SeaOrmAcceptanceService {
    store: Store,
    config: Arc<RwLock<Config>>,
    lock: Arc<dyn TopicLock>,
    webhooks: Arc<WebhookService>,
    event_bus: broadcast::Sender<SolvedEvent>,
}

/// Result of the transactional part of `accept`.
struct Accepted {
    solution: Solution,
    timer_scheduled: bool,
}

impl SeaOrmAcceptanceService {
    #[must_use]
    pub fn new(
        store: Store,
        config: Arc<RwLock<Config>>,
        lock: Arc<dyn TopicLock>,
        webhooks: Arc<WebhookService>,
        event_bus: broadcast::Sender<SolvedEvent>,
    ) -> Self {
        Self {
            store,
            config,
            lock,
            webhooks,
            event_bus,
        }
    }

    async fn lock_topic(&self, topic_id: i32) -> Result<LockGuard, AcceptanceError> {
        self.lock
            .acquire(&toggle_answer_lock_key(topic_id))
            .await
            .map_err(|e| {
                metrics::counter!("solved_lock_timeouts_total").increment(1);
                warn!(topic_id, error = %e, "Could not acquire topic lock");
                AcceptanceError::from_lock(e, topic_id)
            })
    }

    async fn category_auto_close_override(
        &self,
        topic: &Topic,
    ) -> Result<Option<i32>, AcceptanceError> {
        let Some(category_id) = topic.category_id else {
            return Ok(None);
        };

        Ok(self
            .store
            .get_category(category_id)
            .await?
            .and_then(|c| c.solved_topics_auto_close_hours))
    }

    async fn accept_in_transaction(
        &self,
        post: &Post,
        acting_user: &User,
        topic: &Topic,
        solved: &SolvedConfig,
        auto_close_hours: i32,
    ) -> Result<Accepted, AcceptanceError> {
        let (_writer, txn) = self.store.begin_write().await?;

        let solutions = SolutionRepository::new(&txn);
        let actions = UserActionRepository::new(&txn);

        let previous = solutions.find_by_topic(topic.id).await?;
        if let Some(previous) = &previous
            && previous.answer_post_id != post.id
        {
            let removed = actions
                .delete_solved_for_post(previous.answer_post_id)
                .await?;
            debug!(
                topic_id = topic.id,
                previous_post_id = previous.answer_post_id,
                removed,
                "Replacing accepted answer"
            );
        }
        let previous_timer = previous.as_ref().and_then(|s| s.topic_timer_id);

        let solution = match solutions
            .upsert(topic.id, post.id, Some(acting_user.id), previous_timer)
            .await
        {
            Ok(solution) => solution,
            Err(e) if is_unique_violation(&e) => {
                return Err(AcceptanceError::Conflict(format!(
                    "Post {} is already the accepted answer of another topic",
                    post.id
                )));
            }
            Err(e) => return Err(e.into()),
        };

        actions
            .log_solved(post.user_id, acting_user.id, post.id, topic.id)
            .await?;

        self.notify(&txn, post, acting_user, topic, solved).await?;

        let timer_scheduled = self
            .schedule_auto_close(&txn, topic, solved, auto_close_hours, previous_timer)
            .await?;

        let solution = solutions.find_by_topic(topic.id).await?.unwrap_or(solution);

        txn.commit().await?;

        Ok(Accepted {
            solution,
            timer_scheduled,
        })
    }

    async fn notify(
        &self,
        txn: &DatabaseTransaction,
        post: &Post,
        acting_user: &User,
        topic: &Topic,
        solved: &SolvedConfig,
    ) -> Result<(), AcceptanceError> {
        let notifications = NotificationRepository::new(txn);
        let data = json!({
            "message": ACCEPTED_MESSAGE,
            "display_username": acting_user.username,
            "topic_title": topic.title,
        });

        let mut recipients = Vec::with_capacity(2);
        if acting_user.id != post.user_id {
            recipients.push(post.user_id);
        }
        if solved.notify_on_staff_accept_solved && acting_user.id != topic.user_id {
            recipients.push(topic.user_id);
        }

        for user_id in recipients {
            let created = notifications
                .create_once(&NewNotification {
                    kind: NotificationKind::Custom,
                    user_id,
                    topic_id: topic.id,
                    post_number: Some(post.post_number),
                    data: data.clone(),
                })
                .await?;
            if created {
                debug!(user_id, topic_id = topic.id, "Created accepted answer notification");
            }
        }

        Ok(())
    }

    /// Creates or reschedules the close timer, or drops a timer carried over from a
    /// replaced solution. Returns whether a timer is now scheduled.
    async fn schedule_auto_close(
        &self,
        txn: &DatabaseTransaction,
        topic: &Topic,
        solved: &SolvedConfig,
        hours: i32,
        previous_timer: Option<i32>,
    ) -> Result<bool, AcceptanceError> {
        let timers = TimerRepository::new(txn);
        let solutions = SolutionRepository::new(txn);

        // The caller's copy may predate a concurrent close or a new post.
        let current = TopicRepository::new(txn).get_with_deleted(topic.id).await?;
        let (closed, last_posted_at) = current.map_or_else(
            || (topic.closed, topic.last_posted_at.clone()),
            |t| (t.closed, t.last_posted_at),
        );

        if hours > 0 && !closed {
            let last_post = parse_timestamp(&last_posted_at).unwrap_or_else(Utc::now);
            let execute_at = last_post + chrono::Duration::hours(i64::from(hours));

            let timer = timers
                .set_or_create(
                    topic.id,
                    solved.auto_close_mode,
                    &format_timestamp(execute_at),
                    hours.saturating_mul(60),
                    true,
                )
                .await?;
            solutions.set_timer(topic.id, Some(timer.id)).await?;

            debug!(
                topic_id = topic.id,
                timer_id = timer.id,
                execute_at = %timer.execute_at,
                kind = solved.auto_close_mode.as_str(),
                "Scheduled auto-close timer"
            );
            return Ok(true);
        }

        if let Some(timer_id) = previous_timer {
            timers.delete(timer_id).await?;
            solutions.set_timer(topic.id, None).await?;
        }

        Ok(false)
    }

    /// Removes the topic's solution when it points at `post` or at a post that no
    /// longer exists. Returns the removed solution.
    async fn unaccept_in_transaction(
        &self,
        post: &Post,
        topic: &Topic,
    ) -> Result<Option<Solution>, AcceptanceError> {
        let (_writer, txn) = self.store.begin_write().await?;

        let solutions = SolutionRepository::new(&txn);
        let actions = UserActionRepository::new(&txn);
        let timers = TimerRepository::new(&txn);

        let mut removed = None;
        if let Some(existing) = solutions.find_by_topic(topic.id).await? {
            let points_here = existing.answer_post_id == post.id;
            let dangling = !points_here
                && PostRepository::new(&txn)
                    .get_live(existing.answer_post_id)
                    .await?
                    .is_none();

            if points_here || dangling {
                solutions.remove(topic.id).await?;
                if let Some(timer_id) = existing.topic_timer_id {
                    timers.delete(timer_id).await?;
                }
                if dangling {
                    info!(
                        topic_id = topic.id,
                        answer_post_id = existing.answer_post_id,
                        "Repaired solution pointing at a missing post"
                    );
                    actions
                        .delete_solved_for_post(existing.answer_post_id)
                        .await?;
                }
                removed = Some(existing);
            }
        }

        actions.delete_solved_for_post(post.id).await?;

        let notifications = NotificationRepository::new(&txn);
        notifications
            .delete(
                NotificationKind::Custom,
                post.user_id,
                topic.id,
                Some(post.post_number),
            )
            .await?;
        // A staff accept may also have told the topic author.
        if topic.user_id != post.user_id {
            notifications
                .delete(
                    NotificationKind::Custom,
                    topic.user_id,
                    topic.id,
                    Some(post.post_number),
                )
                .await?;
        }

        txn.commit().await?;
        Ok(removed)
    }

    async fn publish(&self, event: SolvedEvent, post: &Post) {
        if let Err(e) = self.webhooks.enqueue(&event, post).await {
            warn!(event = event.name(), error = %e, "Failed to queue web hook events");
        }
        let _ = self.event_bus.send(event);
    }

    async fn remove_orphaned_solution(
        &self,
        solution: &Solution,
        post_id: i32,
    ) -> Result<(), AcceptanceError> {
        let guard = self.lock_topic(solution.topic_id).await?;

        let result = async {
            let (_writer, txn) = self.store.begin_write().await?;
            if let Some(removed) = SolutionRepository::new(&txn)
                .remove_by_post(post_id)
                .await?
                && let Some(timer_id) = removed.topic_timer_id
            {
                TimerRepository::new(&txn).delete(timer_id).await?;
            }
            UserActionRepository::new(&txn)
                .delete_solved_for_post(post_id)
                .await?;
            txn.commit().await?;
            Ok::<_, AcceptanceError>(())
        }
        .await;

        guard.release().await;
        result
    }
}

#[async_trait::async_trait]
impl AcceptanceService for SeaOrmAcceptanceService {
    async fn accept(
        &self,
        post: &Post,
        acting_user: &User,
        topic: &Topic,
    ) -> Result<Solution, AcceptanceError> {
        if post.topic_id != topic.id {
            return Err(AcceptanceError::Validation(format!(
                "Post {} does not belong to topic {}",
                post.id, topic.id
            )));
        }

        let solved = self.config.read().await.solved.clone();
        let auto_close_hours =
            solved.auto_close_hours(self.category_auto_close_override(topic).await?);

        let guard = self.lock_topic(topic.id).await?;

        let result = async {
            let accepted = self
                .accept_in_transaction(post, acting_user, topic, &solved, auto_close_hours)
                .await?;

            if accepted.timer_scheduled {
                let _ = self
                    .event_bus
                    .send(SolvedEvent::TopicReload { topic_id: topic.id });
            }

            self.publish(
                SolvedEvent::AcceptedSolution {
                    topic_id: topic.id,
                    post_id: post.id,
                    accepter_id: acting_user.id,
                },
                post,
            )
            .await;

            Ok::<_, AcceptanceError>(accepted.solution)
        }
        .await;

        guard.release().await;

        match &result {
            Ok(solution) => {
                metrics::counter!("solved_accept_total", "result" => "ok").increment(1);
                info!(
                    topic_id = topic.id,
                    post_id = post.id,
                    accepter_id = acting_user.id,
                    timer_id = ?solution.topic_timer_id,
                    "Accepted answer"
                );
            }
            Err(e) => {
                metrics::counter!("solved_accept_total", "result" => "error").increment(1);
                warn!(topic_id = topic.id, post_id = post.id, error = %e, "Accept failed");
            }
        }

        result
    }

    async fn unaccept(&self, post: &Post, topic: &Topic) -> Result<(), AcceptanceError> {
        let guard = self.lock_topic(topic.id).await?;

        let result = async {
            let removed = self.unaccept_in_transaction(post, topic).await?;

            // Subscribers hear about every unaccept, including no-ops.
            self.publish(
                SolvedEvent::UnacceptedSolution {
                    topic_id: topic.id,
                    post_id: post.id,
                },
                post,
            )
            .await;

            Ok::<_, AcceptanceError>(removed)
        }
        .await;

        guard.release().await;

        let removed = result?;
        metrics::counter!("solved_unaccept_total").increment(1);
        info!(
            topic_id = topic.id,
            post_id = post.id,
            removed = removed.is_some(),
            "Unaccepted answer"
        );

        Ok(())
    }

    async fn post_destroyed(&self, post_id: i32) -> Result<(), AcceptanceError> {
        let Some(solution) = self.store.solutions().find_by_post(post_id).await? else {
            return Ok(());
        };

        let post = self.store.get_post(post_id).await?;
        let topic = self.store.get_topic_with_deleted(solution.topic_id).await?;

        match (post, topic) {
            (Some(post), Some(topic)) => self.unaccept(&post, &topic).await,
            _ => {
                info!(post_id, topic_id = solution.topic_id, "Removing orphaned solution");
                self.remove_orphaned_solution(&solution, post_id).await
            }
        }
    }

    async fn status(&self, topic_id: i32) -> Result<SolvedStatus, AcceptanceError> {
        let Some(solution) = self.store.get_solution(topic_id).await? else {
            return Ok(SolvedStatus::Unsolved);
        };

        // A solution whose answer post is gone reads as unsolved until repaired.
        match self.store.posts().get_live(solution.answer_post_id).await? {
            Some(_) => Ok(SolvedStatus::Solved {
                answer_post_id: solution.answer_post_id,
            }),
            None => Ok(SolvedStatus::Unsolved),
        }
    }
}
