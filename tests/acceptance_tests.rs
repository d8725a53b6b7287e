mod common;

use chrono::{Duration, Utc};
use std::sync::Arc;

use common::{create_category, create_topic, create_user, reply, spawn_state, test_config};
use solved::db::{SolutionRepository, is_unique_violation, parse_timestamp};
use solved::domain::events::SolvedEvent;
use solved::domain::{NotificationKind, SolvedStatus, TimerKind};
use solved::models::category::CategorySolvedSettings;
use solved::services::{AcceptanceError, ReportParams, TrustLevelRequirement};

fn custom_notifications(rows: &[solved::entities::notifications::Model]) -> usize {
    rows.iter()
        .filter(|n| n.notification_type == NotificationKind::Custom.as_str())
        .count()
}

#[tokio::test]
async fn author_accepting_own_topic_notifies_only_the_answerer() {
    let (state, fx) = spawn_state(test_config()).await;

    let solution = state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    assert_eq!(solution.answer_post_id, fx.answer.id);
    assert_eq!(solution.accepter_user_id, Some(fx.author.user.id));

    let answerer_notes = state.store.notifications_for_user(fx.answerer.user.id).await.unwrap();
    assert_eq!(custom_notifications(&answerer_notes), 1);
    assert_eq!(answerer_notes[0].post_number, Some(fx.answer.post_number));

    let author_notes = state.store.notifications_for_user(fx.author.user.id).await.unwrap();
    assert_eq!(custom_notifications(&author_notes), 0);
}

#[tokio::test]
async fn staff_accept_notifies_topic_author_when_enabled() {
    let mut config = test_config();
    config.solved.notify_on_staff_accept_solved = true;
    let (state, fx) = spawn_state(config).await;

    state
        .acceptance
        .accept(&fx.answer, &fx.admin.user, &fx.topic)
        .await
        .unwrap();

    let answerer_notes = state.store.notifications_for_user(fx.answerer.user.id).await.unwrap();
    let author_notes = state.store.notifications_for_user(fx.author.user.id).await.unwrap();
    assert_eq!(custom_notifications(&answerer_notes), 1);
    assert_eq!(custom_notifications(&author_notes), 1);
}

#[tokio::test]
async fn site_auto_close_schedules_silent_close_from_last_post() {
    let mut config = test_config();
    config.solved.solved_topics_auto_close_hours = 2;
    let (state, fx) = spawn_state(config).await;

    let solution = state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    let timer = state.store.timer_for_topic(fx.topic.id).await.unwrap().unwrap();
    assert_eq!(solution.topic_timer_id, Some(timer.id));
    assert_eq!(timer.status_type, TimerKind::SilentClose.as_str());
    assert!(timer.based_on_last_post);
    assert_eq!(timer.duration_minutes, 120);

    let last_posted = parse_timestamp(&fx.topic.last_posted_at).unwrap();
    let execute_at = parse_timestamp(&timer.execute_at).unwrap();
    assert_eq!(execute_at - last_posted, Duration::hours(2));
    assert!((execute_at - (Utc::now() + Duration::hours(2))).num_seconds().abs() < 60);
}

#[tokio::test]
async fn category_auto_close_override_wins() {
    let mut config = test_config();
    config.solved.solved_topics_auto_close_hours = 2;
    let (state, fx) = spawn_state(config).await;

    state
        .categories
        .update_solved_settings(
            fx.support.id,
            &CategorySolvedSettings {
                enable_accepted_answers: None,
                solved_topics_auto_close_hours: Some(4),
            },
        )
        .await
        .unwrap();

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    let timer = state.store.timer_for_topic(fx.topic.id).await.unwrap().unwrap();
    assert_eq!(timer.duration_minutes, 240);
}

#[tokio::test]
async fn closed_topic_gets_no_timer() {
    let mut config = test_config();
    config.solved.solved_topics_auto_close_hours = 2;
    let (state, fx) = spawn_state(config).await;

    state.store.topics().set_closed(fx.topic.id, true, false).await.unwrap();
    let topic = state.store.get_topic(fx.topic.id).await.unwrap().unwrap();

    let solution = state
        .acceptance
        .accept(&fx.answer, &fx.admin.user, &topic)
        .await
        .unwrap();

    assert_eq!(solution.topic_timer_id, None);
    assert!(state.store.timer_for_topic(fx.topic.id).await.unwrap().is_none());
}

#[tokio::test]
async fn accepting_twice_is_idempotent() {
    let (state, fx) = spawn_state(test_config()).await;

    for _ in 0..2 {
        state
            .acceptance
            .accept(&fx.answer, &fx.author.user, &fx.topic)
            .await
            .unwrap();
    }

    let actions = state.store.user_actions();
    assert_eq!(actions.count_solved_for_post(fx.answer.id).await.unwrap(), 1);

    let notes = state.store.notifications_for_user(fx.answerer.user.id).await.unwrap();
    assert_eq!(custom_notifications(&notes), 1);

    let status = state.acceptance.status(fx.topic.id).await.unwrap();
    assert_eq!(
        status,
        SolvedStatus::Solved {
            answer_post_id: fx.answer.id
        }
    );
}

#[tokio::test]
async fn replacing_the_answer_moves_the_solved_action() {
    let mut config = test_config();
    config.solved.solved_topics_auto_close_hours = 2;
    let (state, fx) = spawn_state(config).await;

    let first = state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();
    let second = state
        .acceptance
        .accept(&fx.reply, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    assert_eq!(second.answer_post_id, fx.reply.id);
    assert_eq!(second.topic_timer_id, first.topic_timer_id);

    let actions = state.store.user_actions();
    assert_eq!(actions.count_solved_for_post(fx.answer.id).await.unwrap(), 0);
    assert_eq!(actions.count_solved_for_post(fx.reply.id).await.unwrap(), 1);
    assert!(state.store.solutions().find_by_post(fx.answer.id).await.unwrap().is_none());
}

#[tokio::test]
async fn post_from_another_topic_is_rejected() {
    let (state, fx) = spawn_state(test_config()).await;
    let (other_topic, _) =
        create_topic(&state.store, &fx.author.user, Some(fx.support.id), "Scanner jam", &[]).await;

    let err = state
        .acceptance
        .accept(&fx.answer, &fx.admin.user, &other_topic)
        .await
        .unwrap_err();

    assert!(matches!(err, AcceptanceError::Validation(_)));
    assert!(state.store.get_solution(other_topic.id).await.unwrap().is_none());
}

#[tokio::test]
async fn one_post_cannot_answer_two_topics() {
    let (state, fx) = spawn_state(test_config()).await;
    let (other_topic, _) =
        create_topic(&state.store, &fx.author.user, Some(fx.support.id), "Scanner jam", &[]).await;

    let solutions = SolutionRepository::new(&state.store.conn);
    solutions
        .upsert(fx.topic.id, fx.answer.id, Some(fx.admin.user.id), None)
        .await
        .unwrap();

    let err = solutions
        .upsert(other_topic.id, fx.answer.id, Some(fx.admin.user.id), None)
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));
}

#[tokio::test]
async fn unaccept_clears_every_side_effect() {
    let mut config = test_config();
    config.solved.solved_topics_auto_close_hours = 2;
    let (state, fx) = spawn_state(config).await;

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();
    state.acceptance.unaccept(&fx.answer, &fx.topic).await.unwrap();

    assert!(state.store.get_solution(fx.topic.id).await.unwrap().is_none());
    assert!(state.store.timer_for_topic(fx.topic.id).await.unwrap().is_none());
    assert_eq!(
        state.store.user_actions().count_solved_for_post(fx.answer.id).await.unwrap(),
        0
    );
    let notes = state.store.notifications_for_user(fx.answerer.user.id).await.unwrap();
    assert_eq!(custom_notifications(&notes), 0);

    // Unaccepting again is a no-op.
    state.acceptance.unaccept(&fx.answer, &fx.topic).await.unwrap();
    assert_eq!(
        state.acceptance.status(fx.topic.id).await.unwrap(),
        SolvedStatus::Unsolved
    );
}

#[tokio::test]
async fn staff_reaccept_after_unaccept_notifies_topic_author_again() {
    let mut config = test_config();
    config.solved.notify_on_staff_accept_solved = true;
    let (state, fx) = spawn_state(config).await;

    state
        .acceptance
        .accept(&fx.answer, &fx.admin.user, &fx.topic)
        .await
        .unwrap();
    state.acceptance.unaccept(&fx.answer, &fx.topic).await.unwrap();

    let author_notes = state.store.notifications_for_user(fx.author.user.id).await.unwrap();
    assert_eq!(custom_notifications(&author_notes), 0);

    state
        .acceptance
        .accept(&fx.answer, &fx.admin.user, &fx.topic)
        .await
        .unwrap();

    let author_notes = state.store.notifications_for_user(fx.author.user.id).await.unwrap();
    let answerer_notes = state.store.notifications_for_user(fx.answerer.user.id).await.unwrap();
    assert_eq!(custom_notifications(&author_notes), 1);
    assert_eq!(custom_notifications(&answerer_notes), 1);
}

#[tokio::test]
async fn unaccepting_a_different_post_keeps_the_answer() {
    let (state, fx) = spawn_state(test_config()).await;

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();
    state.acceptance.unaccept(&fx.reply, &fx.topic).await.unwrap();

    assert_eq!(
        state.acceptance.status(fx.topic.id).await.unwrap().answer_post_id(),
        Some(fx.answer.id)
    );
}

#[tokio::test]
async fn deleting_the_answer_post_unsolves_the_topic() {
    let (state, fx) = spawn_state(test_config()).await;

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    state.store.posts().soft_delete(fx.answer.id).await.unwrap();
    // A dangling solution already reads as unsolved.
    assert_eq!(
        state.acceptance.status(fx.topic.id).await.unwrap(),
        SolvedStatus::Unsolved
    );

    state.acceptance.post_destroyed(fx.answer.id).await.unwrap();
    assert!(state.store.get_solution(fx.topic.id).await.unwrap().is_none());
    assert_eq!(
        state.store.user_actions().count_solved_for_post(fx.answer.id).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn events_follow_the_commit() {
    let mut config = test_config();
    config.solved.solved_topics_auto_close_hours = 1;
    let (state, fx) = spawn_state(config).await;
    let mut rx = state.event_bus.subscribe();

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();
    state.acceptance.unaccept(&fx.answer, &fx.topic).await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert!(events.contains(&SolvedEvent::TopicReload {
        topic_id: fx.topic.id
    }));
    assert!(events.contains(&SolvedEvent::AcceptedSolution {
        topic_id: fx.topic.id,
        post_id: fx.answer.id,
        accepter_id: fx.author.user.id,
    }));
    assert_eq!(
        events.last(),
        Some(&SolvedEvent::UnacceptedSolution {
            topic_id: fx.topic.id,
            post_id: fx.answer.id,
        })
    );
}

#[tokio::test]
async fn subscribed_web_hooks_get_a_payload() {
    let (state, fx) = spawn_state(test_config()).await;
    state
        .store
        .create_webhook("https://hooks.example.com/solved", &["solved"], false)
        .await
        .unwrap();
    state
        .store
        .create_webhook("https://hooks.example.com/posts", &["post"], false)
        .await
        .unwrap();

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    let pending = state.store.pending_webhook_events().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].event_name, "accepted_solution");

    let payload: serde_json::Value = serde_json::from_str(&pending[0].payload).unwrap();
    assert_eq!(payload["post"]["id"], fx.answer.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_leave_one_consistent_answer() {
    let (state, fx) = spawn_state(test_config()).await;

    let mut candidates = vec![fx.answer.clone(), fx.reply.clone()];
    for i in 0..4 {
        candidates.push(reply(&state.store, &fx.topic, &fx.other.user, &format!("<p>Try {i}</p>")).await);
    }

    let mut handles = Vec::new();
    for post in candidates.clone() {
        let state = Arc::clone(&state);
        let admin = fx.admin.user.clone();
        let topic = fx.topic.clone();
        handles.push(tokio::spawn(async move {
            state.acceptance.accept(&post, &admin, &topic).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let solution = state.store.get_solution(fx.topic.id).await.unwrap().unwrap();
    let actions = state.store.user_actions();
    let mut with_action = 0;
    for post in &candidates {
        let count = actions.count_solved_for_post(post.id).await.unwrap();
        if count > 0 {
            assert_eq!(post.id, solution.answer_post_id);
            with_action += 1;
        }
    }
    assert_eq!(with_action, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_on_different_topics_all_commit() {
    let mut config = test_config();
    config.solved.solved_topics_auto_close_hours = 2;
    config.solved.notify_on_staff_accept_solved = true;
    let (state, fx) = spawn_state(config).await;

    let mut pairs = Vec::new();
    for i in 0..16 {
        let (topic, _) = create_topic(
            &state.store,
            &fx.author.user,
            Some(fx.support.id),
            &format!("Question {i}"),
            &[],
        )
        .await;
        let answer = reply(&state.store, &topic, &fx.answerer.user, "<p>Try this</p>").await;
        pairs.push((topic, answer));
    }

    let mut handles = Vec::new();
    for (topic, answer) in pairs.clone() {
        let state = Arc::clone(&state);
        let admin = fx.admin.user.clone();
        handles.push(tokio::spawn(async move {
            state.acceptance.accept(&answer, &admin, &topic).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for (topic, answer) in &pairs {
        let solution = state.store.get_solution(topic.id).await.unwrap().unwrap();
        assert_eq!(solution.answer_post_id, answer.id);
        assert!(state.store.timer_for_topic(topic.id).await.unwrap().is_some());
    }
    let notes = state.store.notifications_for_user(fx.answerer.user.id).await.unwrap();
    assert_eq!(custom_notifications(&notes), 16);
}

#[tokio::test]
async fn due_timer_closes_topic_silently() {
    let mut config = test_config();
    config.solved.solved_topics_auto_close_hours = 2;
    let (state, fx) = spawn_state(config).await;

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    assert_eq!(state.auto_close.run_due(Utc::now()).await.unwrap(), 0);

    let mut rx = state.event_bus.subscribe();
    let closed = state
        .auto_close
        .run_due(Utc::now() + Duration::hours(3))
        .await
        .unwrap();
    assert_eq!(closed, 1);

    let topic = state.store.get_topic(fx.topic.id).await.unwrap().unwrap();
    assert!(topic.closed);
    assert!(state.store.timer_for_topic(fx.topic.id).await.unwrap().is_none());

    let solution = state.store.get_solution(fx.topic.id).await.unwrap().unwrap();
    assert_eq!(solution.topic_timer_id, None);
    assert_eq!(
        rx.try_recv().unwrap(),
        SolvedEvent::TopicAutoClosed {
            topic_id: fx.topic.id
        }
    );
}

#[tokio::test]
async fn timer_of_a_deleted_topic_is_discarded() {
    let mut config = test_config();
    config.solved.solved_topics_auto_close_hours = 1;
    let (state, fx) = spawn_state(config).await;

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();
    state.store.topics().soft_delete(fx.topic.id).await.unwrap();

    assert_eq!(
        state
            .auto_close
            .run_due(Utc::now() + Duration::hours(2))
            .await
            .unwrap(),
        0
    );
    assert!(state.store.timer_for_topic(fx.topic.id).await.unwrap().is_none());
}

#[tokio::test]
async fn unresolved_reminders_are_sent_once_per_topic() {
    let mut config = test_config();
    config.solved.unresolved_reminder_delay_days = 1;
    let (state, fx) = spawn_state(config).await;

    let (solved_topic, _) =
        create_topic(&state.store, &fx.other.user, Some(fx.support.id), "Wifi drops", &[]).await;
    let wifi_answer = reply(&state.store, &solved_topic, &fx.answerer.user, "<p>New driver</p>").await;
    state
        .acceptance
        .accept(&wifi_answer, &fx.admin.user, &solved_topic)
        .await
        .unwrap();
    create_topic(&state.store, &fx.other.user, Some(fx.general.id), "Off topic", &[]).await;

    let later = Utc::now() + Duration::days(2);
    assert_eq!(state.reminders.send_reminders(later).await.unwrap(), 1);
    assert_eq!(state.reminders.send_reminders(later).await.unwrap(), 0);

    let notes = state.store.notifications_for_user(fx.author.user.id).await.unwrap();
    assert!(notes.iter().any(|n| {
        n.notification_type == NotificationKind::UnresolvedReminder.as_str()
            && n.topic_id == fx.topic.id
    }));

    // Too early for anything.
    assert_eq!(state.reminders.send_reminders(Utc::now()).await.unwrap(), 0);
}

#[tokio::test]
async fn accepted_solutions_report_counts_per_day() {
    let (state, fx) = spawn_state(test_config()).await;
    let hardware = create_category(&state.store, "Hardware", true).await;

    let (second_topic, _) =
        create_topic(&state.store, &fx.other.user, Some(hardware.id), "Fan noise", &[]).await;
    let fan_answer = reply(&state.store, &second_topic, &fx.answerer.user, "<p>Clean it</p>").await;

    state
        .acceptance
        .accept(&fx.answer, &fx.admin.user, &fx.topic)
        .await
        .unwrap();
    state
        .acceptance
        .accept(&fan_answer, &fx.admin.user, &second_topic)
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    let params = ReportParams {
        start_date: today - Duration::days(7),
        end_date: today,
        category_id: None,
        include_subcategories: false,
    };

    let report = state.reports.accepted_solutions(&params).await.unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.prev30_days, 0);
    assert_eq!(report.data.len(), 1);
    assert_eq!(report.data[0].day, today.to_string());
    assert_eq!(report.data[0].count, 2);

    let report = state
        .reports
        .accepted_solutions(&ReportParams {
            category_id: Some(hardware.id),
            ..params
        })
        .await
        .unwrap();
    assert_eq!(report.total, 1);

    let summary = state.reports.user_summary("answerer").await.unwrap();
    assert_eq!(summary.solved_count, 2);

    let posts = state.reports.solved_posts("answerer", 0, None, 300).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().any(|p| p.excerpt == "Restart the print spooler service."));
}

#[tokio::test]
async fn report_rejects_dates_at_the_calendar_edges() {
    use chrono::NaiveDate;
    use solved::services::ReportError;

    let (state, _fx) = spawn_state(test_config()).await;

    let err = state
        .reports
        .accepted_solutions(&ReportParams {
            start_date: NaiveDate::MAX - Duration::days(3),
            end_date: NaiveDate::MAX,
            category_id: None,
            include_subcategories: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::Validation(_)));

    let err = state
        .reports
        .accepted_solutions(&ReportParams {
            start_date: NaiveDate::MIN,
            end_date: NaiveDate::MIN + Duration::days(3),
            category_id: None,
            include_subcategories: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::Validation(_)));
}

#[tokio::test]
async fn first_accepted_solution_check() {
    let (state, fx) = spawn_state(test_config()).await;
    let veteran = create_user(&state.store, "veteran", 4, false).await;
    let veteran_post = reply(&state.store, &fx.topic, &veteran.user, "<p>Reinstall</p>").await;

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    let reports = &state.reports;
    assert!(
        reports
            .is_first_accepted_solution(&fx.answer, TrustLevelRequirement::Any)
            .await
            .unwrap()
    );
    assert!(
        reports
            .is_first_accepted_solution(
                &fx.answer,
                TrustLevelRequirement::parse("2").unwrap()
            )
            .await
            .unwrap()
    );
    assert!(
        !reports
            .is_first_accepted_solution(
                &veteran_post,
                TrustLevelRequirement::parse("2").unwrap()
            )
            .await
            .unwrap()
    );

    let (second_topic, _) =
        create_topic(&state.store, &fx.other.user, Some(fx.support.id), "Monitor flicker", &[]).await;
    let second_answer = reply(&state.store, &second_topic, &fx.answerer.user, "<p>Cable</p>").await;
    state
        .acceptance
        .accept(&second_answer, &fx.admin.user, &second_topic)
        .await
        .unwrap();

    assert!(
        !reports
            .is_first_accepted_solution(
                &second_answer,
                TrustLevelRequirement::parse("4").unwrap()
            )
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn database_lock_excludes_second_holder_until_released() {
    use solved::config::LockConfig;
    use solved::services::{DatabaseTopicLock, LockError, TopicLock};

    let (state, fx) = spawn_state(test_config()).await;
    let lock = DatabaseTopicLock::new(
        state.store.conn.clone(),
        &LockConfig {
            wait_timeout_ms: 200,
            retry_interval_ms: 20,
            ..LockConfig::default()
        },
    );
    let key = solved::constants::toggle_answer_lock_key(fx.topic.id);

    let guard = lock.acquire(&key).await.unwrap();
    assert_eq!(guard.key(), key);

    let err = lock.acquire(&key).await.unwrap_err();
    assert!(matches!(err, LockError::Timeout { .. }));

    // Other topics are independent.
    let other = lock
        .acquire(&solved::constants::toggle_answer_lock_key(fx.topic.id + 1))
        .await
        .unwrap();
    other.release().await;

    guard.release().await;
    let again = lock.acquire(&key).await.unwrap();
    again.release().await;
}

#[tokio::test]
async fn cancelled_holder_gives_up_the_database_lease() {
    use solved::config::LockConfig;
    use solved::services::{DatabaseTopicLock, TopicLock};

    let (state, fx) = spawn_state(test_config()).await;
    let lock = Arc::new(DatabaseTopicLock::new(
        state.store.conn.clone(),
        &LockConfig {
            wait_timeout_ms: 2000,
            retry_interval_ms: 20,
            // Longer than the test: only the drop can free the key.
            lease_seconds: 600,
            ..LockConfig::default()
        },
    ));
    let key = solved::constants::toggle_answer_lock_key(fx.topic.id);

    let holder = {
        let lock = Arc::clone(&lock);
        let key = key.clone();
        tokio::time::timeout(std::time::Duration::from_millis(100), async move {
            let _guard = lock.acquire(&key).await.unwrap();
            std::future::pending::<()>().await;
        })
    };
    assert!(holder.await.is_err());

    let again = lock.acquire(&key).await.unwrap();
    assert_eq!(again.key(), key);
    again.release().await;
}

#[tokio::test]
async fn accept_works_with_database_lock_backend() {
    let mut config = test_config();
    config.lock.backend = solved::config::LockBackend::Database;
    let (state, fx) = spawn_state(config).await;

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();
    state
        .acceptance
        .accept(&fx.reply, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    assert_eq!(
        state.acceptance.status(fx.topic.id).await.unwrap().answer_post_id(),
        Some(fx.reply.id)
    );
}

#[tokio::test]
async fn manual_scheduler_run_executes_due_work() {
    use solved::services::Scheduler;

    let mut config = test_config();
    config.solved.unresolved_reminder_delay_days = 1;
    let scheduler_config = config.scheduler.clone();
    let (state, fx) = spawn_state(config).await;

    let scheduler = Scheduler::new(Arc::clone(&state), scheduler_config);
    // Disabled in tests: start returns at once.
    scheduler.start().await.unwrap();
    assert!(!scheduler.is_running().await);

    scheduler.run_once().await.unwrap();
    // Nothing is old enough yet.
    let notes = state.store.notifications_for_user(fx.author.user.id).await.unwrap();
    assert!(notes.is_empty());
}
