//! Executes due auto-close timers of solved topics.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::constants::toggle_answer_lock_key;
use crate::db::{
    SolutionRepository, Store, TimerRepository, TopicRepository, format_timestamp,
    parse_timestamp,
};
use crate::domain::TimerKind;
use crate::domain::events::SolvedEvent;
use crate::entities::topic_timers;
use crate::services::topic_lock::TopicLock;

/// What happened to a single due timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Closed,
    /// The topic got new posts; the timer moved to `last_posted_at + duration`.
    Rescheduled,
    /// Topic gone or already closed; the timer was dropped.
    Discarded,
    /// Another worker handled or changed the timer first.
    Skipped,
}

pub struct AutoCloseService {
    store: Store,
    lock: Arc<dyn TopicLock>,
    event_bus: broadcast::Sender<SolvedEvent>,
}

impl AutoCloseService {
    #[must_use]
    pub fn new(
        store: Store,
        lock: Arc<dyn TopicLock>,
        event_bus: broadcast::Sender<SolvedEvent>,
    ) -> Self {
        Self {
            store,
            lock,
            event_bus,
        }
    }

    /// Runs every timer due at `now`. Returns the number of topics closed.
    pub async fn run_due(&self, now: DateTime<Utc>) -> Result<usize> {
        let due = self.store.timers().due(&format_timestamp(now)).await?;
        if due.is_empty() {
            return Ok(0);
        }

        debug!(count = due.len(), "Processing due auto-close timers");

        let mut closed = 0;
        for timer in due {
            match self.execute(&timer, now).await {
                Ok(TimerOutcome::Closed) => closed += 1,
                Ok(outcome) => debug!(timer_id = timer.id, ?outcome, "Timer not closed"),
                Err(e) => {
                    warn!(timer_id = timer.id, topic_id = timer.topic_id, error = %e, "Auto-close timer failed");
                }
            }
        }

        if closed > 0 {
            info!(closed, "Auto-closed solved topics");
        }
        Ok(closed)
    }

    async fn execute(&self, timer: &topic_timers::Model, now: DateTime<Utc>) -> Result<TimerOutcome> {
        let guard = self
            .lock
            .acquire(&toggle_answer_lock_key(timer.topic_id))
            .await?;

        let result = self.execute_locked(timer.id, now).await;
        guard.release().await;

        let outcome = result?;
        if outcome == TimerOutcome::Closed {
            let _ = self.event_bus.send(SolvedEvent::TopicAutoClosed {
                topic_id: timer.topic_id,
            });
        }
        Ok(outcome)
    }

    async fn execute_locked(&self, timer_id: i32, now: DateTime<Utc>) -> Result<TimerOutcome> {
        let (_writer, txn) = self.store.begin_write().await?;
        let timers = TimerRepository::new(&txn);
        let topics = TopicRepository::new(&txn);
        let solutions = SolutionRepository::new(&txn);

        // Re-read under the lock: an accept may have moved or removed it.
        let Some(timer) = timers.get(timer_id).await? else {
            return Ok(TimerOutcome::Skipped);
        };
        if parse_timestamp(&timer.execute_at).is_some_and(|at| at > now) {
            return Ok(TimerOutcome::Skipped);
        }

        let topic = topics.get(timer.topic_id).await?;
        let outcome = match topic {
            Some(topic) if !topic.closed => {
                let reopen_at = parse_timestamp(&topic.last_posted_at)
                    .map(|last| last + Duration::minutes(i64::from(timer.duration_minutes)));

                match reopen_at {
                    Some(at) if timer.based_on_last_post && at > now => {
                        timers
                            .set_or_create(
                                timer.topic_id,
                                TimerKind::from_db(&timer.status_type),
                                &format_timestamp(at),
                                timer.duration_minutes,
                                true,
                            )
                            .await?;
                        TimerOutcome::Rescheduled
                    }
                    _ => {
                        let bump = TimerKind::from_db(&timer.status_type) == TimerKind::Close;
                        topics.set_closed(topic.id, true, bump).await?;
                        timers.delete(timer.id).await?;
                        solutions.clear_timer(timer.id).await?;
                        TimerOutcome::Closed
                    }
                }
            }
            _ => {
                timers.delete(timer.id).await?;
                solutions.clear_timer(timer.id).await?;
                TimerOutcome::Discarded
            }
        };

        txn.commit().await?;
        Ok(outcome)
    }
}
