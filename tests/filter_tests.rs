mod common;

use common::{create_topic, reply, spawn_state, test_config};
use solved::domain::SolvedFilter;
use solved::models::category::CategorySolvedSettings;
use solved::services::query_filters::parse_search_status;
use solved::state::SharedState;

async fn listed(state: &SharedState, filter: SolvedFilter) -> Vec<String> {
    let config = state.config().await;
    let condition = state
        .query_filters
        .condition_for(&config.solved, filter)
        .await
        .unwrap();
    let mut titles: Vec<String> = state
        .store
        .topics()
        .list(condition, None, 100)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    titles.sort();
    titles
}

#[tokio::test]
async fn solved_and_unsolved_lists_partition_enabled_topics() {
    let (state, fx) = spawn_state(test_config()).await;
    let (wifi, _) =
        create_topic(&state.store, &fx.other.user, Some(fx.support.id), "Wifi drops", &[]).await;
    create_topic(&state.store, &fx.other.user, Some(fx.general.id), "Off topic", &[]).await;

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    assert_eq!(listed(&state, SolvedFilter::Solved).await, vec!["Printer offline"]);
    // Topics in categories without accepted answers are neither solved nor unsolved.
    assert_eq!(listed(&state, SolvedFilter::Unsolved).await, vec![wifi.title]);
}

#[tokio::test]
async fn allow_all_lists_every_unsolved_topic() {
    let mut config = test_config();
    config.solved.allow_solved_on_all_topics = true;
    let (state, fx) = spawn_state(config).await;
    create_topic(&state.store, &fx.other.user, Some(fx.general.id), "Off topic", &[]).await;
    create_topic(&state.store, &fx.other.user, None, "Uncategorized", &[]).await;

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    assert_eq!(
        listed(&state, SolvedFilter::Unsolved).await,
        vec!["Off topic", "Uncategorized"]
    );
}

#[tokio::test]
async fn solved_list_ignores_deleted_answers() {
    let (state, fx) = spawn_state(test_config()).await;
    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    state.store.posts().soft_delete(fx.answer.id).await.unwrap();

    assert!(listed(&state, SolvedFilter::Solved).await.is_empty());
    assert_eq!(
        listed(&state, SolvedFilter::Unsolved).await,
        vec!["Printer offline"]
    );
}

#[tokio::test]
async fn enabled_tags_extend_the_unsolved_list() {
    let mut config = test_config();
    config.solved.enable_solved_tags = vec!["howto".to_string()];
    let (state, fx) = spawn_state(config).await;

    create_topic(
        &state.store,
        &fx.other.user,
        Some(fx.general.id),
        "Tagged question",
        &["howto"],
    )
    .await;
    create_topic(
        &state.store,
        &fx.other.user,
        Some(fx.general.id),
        "Other tag",
        &["chatter"],
    )
    .await;

    assert_eq!(
        listed(&state, SolvedFilter::Unsolved).await,
        vec!["Printer offline", "Tagged question"]
    );

    let topic = state
        .store
        .topics()
        .list(
            sea_orm::Condition::all(),
            Some(fx.general.id),
            10,
        )
        .await
        .unwrap();
    assert_eq!(topic.len(), 2);
}

#[tokio::test]
async fn private_messages_are_never_listed() {
    let (state, fx) = spawn_state(test_config()).await;
    let pm = state
        .store
        .create_topic(&solved::db::NewTopic {
            title: "Secret".to_string(),
            user_id: fx.author.user.id,
            category_id: Some(fx.support.id),
            archetype: solved::domain::Archetype::PrivateMessage,
            tags: Vec::new(),
        })
        .await
        .unwrap();
    reply(&state.store, &pm, &fx.author.user, "<p>hi</p>").await;

    assert!(!listed(&state, SolvedFilter::Unsolved).await.contains(&"Secret".to_string()));
    assert!(!listed(&state, SolvedFilter::Solved).await.contains(&"Secret".to_string()));
}

#[tokio::test]
async fn saving_a_category_refreshes_the_allowlist() {
    let (state, fx) = spawn_state(test_config()).await;
    let (off_topic, _) =
        create_topic(&state.store, &fx.other.user, Some(fx.general.id), "Off topic", &[]).await;

    let config = state.config().await;
    assert!(
        !state
            .policy
            .allow_accepted_answers(&config.solved, off_topic.category_id, &[])
            .await
            .unwrap()
    );
    assert!(state.allowlist.is_populated());

    state
        .categories
        .update_solved_settings(
            fx.general.id,
            &CategorySolvedSettings {
                enable_accepted_answers: Some(true),
                solved_topics_auto_close_hours: None,
            },
        )
        .await
        .unwrap();

    assert!(!state.allowlist.is_populated());
    assert!(
        state
            .policy
            .allow_accepted_answers(&config.solved, off_topic.category_id, &[])
            .await
            .unwrap()
    );
    assert!(
        listed(&state, SolvedFilter::Unsolved)
            .await
            .contains(&"Off topic".to_string())
    );
}

#[tokio::test]
async fn disabled_plugin_allows_nothing() {
    let mut config = test_config();
    config.solved.enabled = false;
    config.solved.allow_solved_on_all_topics = true;
    let (state, fx) = spawn_state(config).await;

    let config = state.config().await;
    assert!(
        !state
            .policy
            .allow_accepted_answers(&config.solved, Some(fx.support.id), &[])
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn status_search_term_filters_results() {
    let (state, fx) = spawn_state(test_config()).await;
    let (wifi, _) =
        create_topic(&state.store, &fx.other.user, Some(fx.support.id), "Wifi drops", &[]).await;
    reply(&state.store, &wifi, &fx.answerer.user, "<p>Restart the router</p>").await;

    state
        .acceptance
        .accept(&fx.answer, &fx.author.user, &fx.topic)
        .await
        .unwrap();

    let (filter, term) = parse_search_status("Restart status:solved");
    assert_eq!(filter, Some(SolvedFilter::Solved));
    assert_eq!(term, "Restart");

    let config = state.config().await;
    let condition = state
        .query_filters
        .condition_for(&config.solved, SolvedFilter::Solved)
        .await
        .unwrap();
    let hits = state.store.posts().search(&term, condition, 50).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].post_id, fx.answer.id);

    let condition = state
        .query_filters
        .condition_for(&config.solved, SolvedFilter::Unsolved)
        .await
        .unwrap();
    let hits = state.store.posts().search("Restart", condition, 50).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].topic_id, wifi.id);
}
