#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use solved::api::AppState;
use solved::config::Config;
use solved::db::{NewCategory, NewTopic, NewUser, Store};
use solved::domain::{Archetype, PostType, TrustLevel};
use solved::models::category::Category;
use solved::models::post::Post;
use solved::models::topic::Topic;
use solved::models::user::User;
use solved::state::SharedState;

/// Config backed by a fresh temp-file database. A pooled `:memory:` database would give
/// every connection its own empty schema.
pub fn test_config() -> Config {
    let path = std::env::temp_dir().join(format!("solved-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}?mode=rwc", path.display());
    config.observability.metrics_enabled = false;
    config.scheduler.enabled = false;
    config.lock.wait_timeout_ms = 2000;
    config
}

pub struct TestUser {
    pub user: User,
    pub api_key: String,
}

/// Users, categories and one topic with three posts:
/// #1 by `author`, #2 (the answer) by `answerer`, #3 by `other`.
pub struct Fixture {
    pub admin: TestUser,
    pub author: TestUser,
    pub answerer: TestUser,
    pub other: TestUser,
    pub support: Category,
    pub general: Category,
    pub topic: Topic,
    pub first_post: Post,
    pub answer: Post,
    pub reply: Post,
}

pub async fn create_user(store: &Store, username: &str, trust_level: u8, admin: bool) -> TestUser {
    let (user, api_key) = store
        .create_user(&NewUser {
            username: username.to_string(),
            name: Some(format!("{username} name")),
            trust_level: TrustLevel::new(trust_level),
            admin,
            moderator: false,
        })
        .await
        .unwrap();

    TestUser { user, api_key }
}

pub async fn create_category(store: &Store, name: &str, enabled: bool) -> Category {
    store
        .create_category(&NewCategory {
            name: name.to_string(),
            enable_accepted_answers: enabled,
            ..NewCategory::default()
        })
        .await
        .unwrap()
}

/// A regular topic with its first post.
pub async fn create_topic(
    store: &Store,
    author: &User,
    category_id: Option<i32>,
    title: &str,
    tags: &[&str],
) -> (Topic, Post) {
    let topic = store
        .create_topic(&NewTopic {
            title: title.to_string(),
            user_id: author.id,
            category_id,
            archetype: Archetype::Regular,
            tags: tags.iter().map(ToString::to_string).collect(),
        })
        .await
        .unwrap();

    let first = reply(store, &topic, author, "<p>How do I fix this?</p>").await;
    let topic = store.get_topic(topic.id).await.unwrap().unwrap();
    (topic, first)
}

pub async fn reply(store: &Store, topic: &Topic, user: &User, cooked: &str) -> Post {
    store
        .create_post(topic.id, user.id, PostType::Regular, cooked)
        .await
        .unwrap()
}

pub async fn seed(store: &Store) -> Fixture {
    let admin = create_user(store, "admin", 1, true).await;
    let author = create_user(store, "author", 1, false).await;
    let answerer = create_user(store, "answerer", 1, false).await;
    let other = create_user(store, "other", 1, false).await;

    let support = create_category(store, "Support", true).await;
    let general = create_category(store, "General", false).await;

    let (topic, first_post) =
        create_topic(store, &author.user, Some(support.id), "Printer offline", &[]).await;
    let answer = reply(
        store,
        &topic,
        &answerer.user,
        "<p>Restart the <strong>print spooler</strong> service.</p>",
    )
    .await;
    let reply_post = reply(store, &topic, &other.user, "<p>Same problem here.</p>").await;
    let topic = store.get_topic(topic.id).await.unwrap().unwrap();

    Fixture {
        admin,
        author,
        answerer,
        other,
        support,
        general,
        topic,
        first_post,
        answer,
        reply: reply_post,
    }
}

pub async fn spawn_state(config: Config) -> (Arc<SharedState>, Fixture) {
    let state = Arc::new(SharedState::new(config).await.unwrap());
    let fixture = seed(&state.store).await;
    (state, fixture)
}

pub async fn spawn_app(config: Config) -> (Router, Arc<AppState>, Fixture) {
    let (shared, fixture) = spawn_state(config).await;
    let state = solved::api::create_app_state(shared, None);
    let app = solved::api::router(state.clone()).await;
    (app, state, fixture)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    api_key: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-Api-Key", key);
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, headers, json)
}
