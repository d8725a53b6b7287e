mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{reply, send, spawn_app, test_config};
use solved::domain::PostType;

#[tokio::test]
async fn health_reports_database() {
    let (app, _state, _fx) = spawn_app(test_config()).await;

    let (status, _, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn unknown_api_key_is_rejected() {
    let (app, _state, _fx) = spawn_app(test_config()).await;

    let (status, _, _) = send(&app, "GET", "/api/topics", Some("not-a-key"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn anonymous_accept_is_forbidden() {
    let (app, state, fx) = spawn_app(test_config()).await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/solution/accept",
        None,
        Some(json!({ "id": fx.answer.id })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert!(state.store().get_solution(fx.topic.id).await.unwrap().is_none());
}

#[tokio::test]
async fn author_accepts_and_topic_view_reflects_it() {
    let (app, _state, fx) = spawn_app(test_config()).await;
    let key = fx.author.api_key.as_str();

    let (status, _, body) = send(
        &app,
        "POST",
        "/api/solution/accept",
        Some(key),
        Some(json!({ "id": fx.answer.id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": null }));

    let uri = format!("/api/topics/{}", fx.topic.id);
    let (status, _, body) = send(&app, "GET", &uri, Some(key), None).await;
    assert_eq!(status, StatusCode::OK);

    let topic = &body["data"];
    assert_eq!(topic["has_accepted_answer"], true);
    assert_eq!(topic["accepted_answers_enabled"], true);
    assert_eq!(
        topic["accepted_answer"]["excerpt"],
        "Restart the print spooler service."
    );

    let posts = topic["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 3);
    // First post: never acceptable.
    assert_eq!(posts[0]["can_accept_answer"], false);
    assert_eq!(posts[1]["accepted_answer"], true);
    assert_eq!(posts[1]["can_accept_answer"], false);
    assert_eq!(posts[1]["can_unaccept_answer"], true);
    assert_eq!(posts[2]["can_accept_answer"], true);

    // An unrelated user sees no controls.
    let (_, _, body) = send(&app, "GET", &uri, Some(&fx.other.api_key), None).await;
    let posts = body["data"]["posts"].as_array().unwrap();
    assert!(posts.iter().all(|p| p["can_accept_answer"] == false));
    assert!(posts.iter().all(|p| p["can_unaccept_answer"] == false));
}

#[tokio::test]
async fn unaccept_returns_plain_success_and_topic_reads_unsolved() {
    let (app, _state, fx) = spawn_app(test_config()).await;
    let key = fx.author.api_key.as_str();
    let body = json!({ "id": fx.answer.id });

    send(&app, "POST", "/api/solution/accept", Some(key), Some(body.clone())).await;
    let (status, _, response) =
        send(&app, "POST", "/api/solution/unaccept", Some(key), Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({ "success": true, "data": null }));

    let uri = format!("/api/topics/{}", fx.topic.id);
    let (_, _, body) = send(&app, "GET", &uri, Some(key), None).await;
    assert_eq!(body["data"]["has_accepted_answer"], false);
    assert!(body["data"]["accepted_answer"].is_null());
}

#[tokio::test]
async fn other_users_cannot_accept() {
    let (app, _state, fx) = spawn_app(test_config()).await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/solution/accept",
        Some(&fx.other.api_key),
        Some(json!({ "id": fx.answer.id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_post_is_not_found() {
    let (app, _state, fx) = spawn_app(test_config()).await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/solution/accept",
        Some(&fx.admin.api_key),
        Some(json!({ "id": 9999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn whispers_cannot_be_accepted() {
    let (app, state, fx) = spawn_app(test_config()).await;
    let whisper = state
        .store()
        .create_post(fx.topic.id, fx.admin.user.id, PostType::Whisper, "<p>psst</p>")
        .await
        .unwrap();

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/solution/accept",
        Some(&fx.admin.api_key),
        Some(json!({ "id": whisper.id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rapid_accepts_are_rate_limited() {
    let (app, _state, fx) = spawn_app(test_config()).await;
    let key = fx.author.api_key.as_str();
    let body = json!({ "id": fx.answer.id });

    for _ in 0..4 {
        let (status, _, _) =
            send(&app, "POST", "/api/solution/accept", Some(key), Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, headers, _) =
        send(&app, "POST", "/api/solution/accept", Some(key), Some(body)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = headers["retry-after"].to_str().unwrap().parse().unwrap();
    assert!((1..=30).contains(&retry_after));
}

#[tokio::test]
async fn busy_topic_returns_service_unavailable_with_retry_after() {
    let mut config = test_config();
    config.lock.wait_timeout_ms = 100;
    let (app, state, fx) = spawn_app(config).await;

    let held = state
        .shared
        .topic_lock
        .acquire(&solved::constants::toggle_answer_lock_key(fx.topic.id))
        .await
        .unwrap();

    let (status, headers, body) = send(
        &app,
        "POST",
        "/api/solution/accept",
        Some(&fx.author.api_key),
        Some(json!({ "id": fx.answer.id })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(headers["retry-after"], "1");
    assert_eq!(body["success"], false);

    held.release().await;
    assert!(state.store().get_solution(fx.topic.id).await.unwrap().is_none());
}

#[tokio::test]
async fn staff_are_not_rate_limited() {
    let (app, _state, fx) = spawn_app(test_config()).await;
    let key = fx.admin.api_key.as_str();
    let body = json!({ "id": fx.answer.id });

    for _ in 0..6 {
        let (status, _, _) =
            send(&app, "POST", "/api/solution/accept", Some(key), Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn trashed_topic_is_only_reachable_by_staff() {
    let (app, state, fx) = spawn_app(test_config()).await;
    state.store().topics().soft_delete(fx.topic.id).await.unwrap();
    let body = json!({ "id": fx.answer.id });

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/solution/accept",
        Some(&fx.author.api_key),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/solution/accept",
        Some(&fx.admin.api_key),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/topics/{}", fx.topic.id);
    let (status, _, _) = send(&app, "GET", &uri, Some(&fx.author.api_key), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, body) = send(&app, "GET", &uri, Some(&fx.admin.api_key), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);
}

#[tokio::test]
async fn deleting_the_answer_unsolves_the_topic() {
    let (app, state, fx) = spawn_app(test_config()).await;

    send(
        &app,
        "POST",
        "/api/solution/accept",
        Some(&fx.author.api_key),
        Some(json!({ "id": fx.answer.id })),
    )
    .await;

    let uri = format!("/api/posts/{}", fx.answer.id);
    let (status, _, _) = send(&app, "DELETE", &uri, Some(&fx.other.api_key), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app, "DELETE", &uri, Some(&fx.answerer.api_key), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(state.store().get_solution(fx.topic.id).await.unwrap().is_none());

    let (_, _, body) = send(&app, "GET", "/api/topics?solved=yes", None, None).await;
    assert!(body["data"]["topics"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn topic_list_filters_by_solved_state() {
    let (app, state, fx) = spawn_app(test_config()).await;
    let (wifi, _) = common::create_topic(
        state.store(),
        &fx.other.user,
        Some(fx.support.id),
        "Wifi drops",
        &[],
    )
    .await;

    send(
        &app,
        "POST",
        "/api/solution/accept",
        Some(&fx.author.api_key),
        Some(json!({ "id": fx.answer.id })),
    )
    .await;

    let (_, _, body) = send(&app, "GET", "/api/topics?solved=yes", None, None).await;
    let topics = body["data"]["topics"].as_array().unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0]["id"], fx.topic.id);
    assert_eq!(topics[0]["has_accepted_answer"], true);

    let (_, _, body) = send(&app, "GET", "/api/topics?solved=no", None, None).await;
    let topics = body["data"]["topics"].as_array().unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0]["id"], wifi.id);

    let (_, _, body) = send(&app, "GET", "/api/topics", None, None).await;
    assert_eq!(body["data"]["topics"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn category_settings_are_staff_only() {
    let (app, _state, fx) = spawn_app(test_config()).await;
    let uri = format!("/api/categories/{}/solved_settings", fx.general.id);
    let settings = json!({
        "enable_accepted_answers": true,
        "solved_topics_auto_close_hours": 12
    });

    let (status, _, _) = send(
        &app,
        "PUT",
        &uri,
        Some(&fx.author.api_key),
        Some(settings.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) =
        send(&app, "PUT", &uri, Some(&fx.admin.api_key), Some(settings)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enable_accepted_answers"], true);
    assert_eq!(body["data"]["solved_topics_auto_close_hours"], 12);

    let (status, _, _) = send(
        &app,
        "PUT",
        &uri,
        Some(&fx.admin.api_key),
        Some(json!({ "solved_topics_auto_close_hours": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn moving_a_topic_changes_acceptability() {
    let (app, _state, fx) = spawn_app(test_config()).await;
    let uri = format!("/api/topics/{}/category", fx.topic.id);

    let (status, _, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&fx.author.api_key),
        Some(json!({ "category_id": fx.general.id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reload_required"], true);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/solution/accept",
        Some(&fx.author.api_key),
        Some(json!({ "id": fx.answer.id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reports_and_user_pages() {
    let (app, state, fx) = spawn_app(test_config()).await;
    let extra = reply(state.store(), &fx.topic, &fx.answerer.user, "<p>Also check cables</p>").await;
    assert_ne!(extra.id, fx.answer.id);

    send(
        &app,
        "POST",
        "/api/solution/accept",
        Some(&fx.author.api_key),
        Some(json!({ "id": fx.answer.id })),
    )
    .await;

    let (status, _, _) = send(
        &app,
        "GET",
        "/api/reports/accepted_solutions",
        Some(&fx.author.api_key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = send(
        &app,
        "GET",
        "/api/reports/accepted_solutions",
        Some(&fx.admin.api_key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["data"][0]["count"], 1);

    let (status, _, _) = send(
        &app,
        "GET",
        "/api/reports/accepted_solutions?start_date=yesterday",
        Some(&fx.admin.api_key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, body) = send(&app, "GET", "/api/users/answerer/summary", None, None).await;
    assert_eq!(body["data"]["solved_count"], 1);

    let (status, _, _) = send(&app, "GET", "/api/users/nobody/summary", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, _, body) = send(&app, "GET", "/api/solution/by_user/answerer", None, None).await;
    let posts = body["data"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["post_id"], fx.answer.id);
    assert_eq!(posts[0]["topic_title"], "Printer offline");
}

#[tokio::test]
async fn search_honours_status_terms() {
    let (app, _state, fx) = spawn_app(test_config()).await;

    send(
        &app,
        "POST",
        "/api/solution/accept",
        Some(&fx.author.api_key),
        Some(json!({ "id": fx.answer.id })),
    )
    .await;

    let (status, _, body) =
        send(&app, "GET", "/api/search?q=spooler%20status:solved", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let hits = body["data"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["post_id"], fx.answer.id);
    assert_eq!(hits[0]["has_accepted_answer"], true);

    let (_, _, body) =
        send(&app, "GET", "/api/search?q=spooler%20status:unsolved", None, None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _, _) = send(&app, "GET", "/api/search?q=status:solved", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
