mod common;

use common::{create_topic, create_user, reply, spawn_state, test_config};
use solved::db::NewCategory;
use solved::models::post::Post;
use solved::models::topic::Topic;
use solved::models::user::User;
use solved::services::AcceptanceError;
use solved::state::SharedState;

async fn can_accept(state: &SharedState, user: &User, topic: &Topic, post: &Post) -> bool {
    let config = state.config().await;
    state
        .policy
        .can_accept(&config.solved, Some(user), Some(topic), Some(post))
        .await
        .unwrap()
}

#[tokio::test]
async fn trust_level_four_may_accept_on_any_topic() {
    let (state, fx) = spawn_state(test_config()).await;
    let veteran = create_user(&state.store, "veteran", 4, false).await;

    assert!(can_accept(&state, &veteran.user, &fx.topic, &fx.answer).await);
    assert!(!can_accept(&state, &fx.other.user, &fx.topic, &fx.answer).await);

    state
        .acceptance
        .accept(&fx.answer, &veteran.user, &fx.topic)
        .await
        .unwrap();
}

#[tokio::test]
async fn trust_threshold_follows_config() {
    let mut config = test_config();
    config.solved.accept_all_solutions_trust_level = 2;
    let (state, fx) = spawn_state(config).await;
    let regular = create_user(&state.store, "regular", 2, false).await;

    assert!(can_accept(&state, &regular.user, &fx.topic, &fx.answer).await);
}

#[tokio::test]
async fn category_group_moderators_may_accept_when_enabled() {
    let mut config = test_config();
    config.solved.enable_category_group_moderation = true;
    let (state, fx) = spawn_state(config).await;

    let moderated = state
        .store
        .create_category(&NewCategory {
            name: "Moderated".to_string(),
            enable_accepted_answers: true,
            reviewable_by_group_id: Some(42),
            ..NewCategory::default()
        })
        .await
        .unwrap();
    let (topic, _) =
        create_topic(&state.store, &fx.author.user, Some(moderated.id), "Jammed tray", &[]).await;
    let answer = reply(&state.store, &topic, &fx.answerer.user, "<p>Open the back</p>").await;
    let helper = create_user(&state.store, "helper", 1, false).await;

    assert!(!can_accept(&state, &helper.user, &topic, &answer).await);

    state.store.users().add_to_group(42, helper.user.id).await.unwrap();
    assert!(can_accept(&state, &helper.user, &topic, &answer).await);

    // Membership only counts in the category the group reviews.
    assert!(!can_accept(&state, &helper.user, &fx.topic, &fx.answer).await);

    let mut config = state.config().await;
    config.solved.enable_category_group_moderation = false;
    *state.config.write().await = config;
    assert!(!can_accept(&state, &helper.user, &topic, &answer).await);
}

#[tokio::test]
async fn author_of_a_closed_topic_is_denied() {
    let (state, fx) = spawn_state(test_config()).await;
    assert!(can_accept(&state, &fx.author.user, &fx.topic, &fx.answer).await);

    state.store.topics().set_closed(fx.topic.id, true, false).await.unwrap();
    let closed = state.store.get_topic(fx.topic.id).await.unwrap().unwrap();

    assert!(!can_accept(&state, &fx.author.user, &closed, &fx.answer).await);
    // Staff still can.
    assert!(can_accept(&state, &fx.admin.user, &closed, &fx.answer).await);
}

#[tokio::test]
async fn author_is_denied_when_author_accepts_are_off() {
    let mut config = test_config();
    config.solved.accept_solutions_topic_author = false;
    let (state, fx) = spawn_state(config).await;

    assert!(!can_accept(&state, &fx.author.user, &fx.topic, &fx.answer).await);
    assert!(can_accept(&state, &fx.admin.user, &fx.topic, &fx.answer).await);
}

#[tokio::test]
async fn accept_times_out_while_the_topic_is_locked() {
    let mut config = test_config();
    config.lock.wait_timeout_ms = 100;
    let (state, fx) = spawn_state(config).await;

    let held = state
        .topic_lock
        .acquire(&solved::constants::toggle_answer_lock_key(fx.topic.id))
        .await
        .unwrap();

    let err = state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap_err();
    assert!(matches!(err, AcceptanceError::LockTimeout { topic_id } if topic_id == fx.topic.id));
    assert!(err.is_retryable());
    assert!(state.store.get_solution(fx.topic.id).await.unwrap().is_none());

    held.release().await;
    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();
}
