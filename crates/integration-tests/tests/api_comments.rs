//! Comments: published-posts-only, dual authorship, permission flag.

mod common;

use axum::http::StatusCode;
use domains::UserRole;
use serde_json::json;

#[tokio::test]
async fn humans_comment_on_published_posts() {
    let app = common::spawn();
    let (_owner, session) = app.seed_user("ada", UserRole::Member).await;
    let (_reader, reader_session) = app.seed_user("finn", UserRole::Member).await;
    let id = app.create_post(&session, "Discuss").await;
    app.post(&format!("/api/v1/posts/{id}/publish"), Some(&session), None)
        .await;

    let (status, comment) = app
        .post(
            &format!("/api/v1/posts/{id}/comments"),
            Some(&reader_session),
            Some(json!({ "body": "Great read" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["authorType"], "USER");
    assert_eq!(comment["authorName"], "finn");

    let (status, listed) = app
        .get(&format!("/api/v1/posts/{id}/comments"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn drafts_take_no_comments_and_do_not_reveal_themselves() {
    let app = common::spawn();
    let (_owner, session) = app.seed_user("ada", UserRole::Member).await;
    let (_reader, reader_session) = app.seed_user("finn", UserRole::Member).await;
    let id = app.create_post(&session, "Unfinished").await;

    let (status, body) = app
        .post(
            &format!("/api/v1/posts/{id}/comments"),
            Some(&reader_session),
            Some(json!({ "body": "sneaky" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Post not found");

    let (status, _) = app
        .get(&format!("/api/v1/posts/{id}/comments"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bot_comments_gate_on_the_permission_flag() {
    let app = common::spawn();
    let (_owner, session) = app.seed_user("ada", UserRole::Member).await;
    let id = app.create_post(&session, "Bot thread").await;
    app.post(&format!("/api/v1/posts/{id}/publish"), Some(&session), None)
        .await;

    let (bot_id, key) = app.create_bot(&session, "replier").await;
    let (status, comment) = app
        .post(
            &format!("/api/v1/posts/{id}/comments"),
            Some(&key),
            Some(json!({ "body": "beep" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["authorType"], "BOT");

    app.set_bot_flags(&session, bot_id, json!({ "canComment": false }))
        .await;
    let (status, body) = app
        .post(
            &format!("/api/v1/posts/{id}/comments"),
            Some(&key),
            Some(json!({ "body": "boop" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("comment permission"));
}

#[tokio::test]
async fn blank_comment_bodies_are_rejected() {
    let app = common::spawn();
    let (_owner, session) = app.seed_user("ada", UserRole::Member).await;
    let id = app.create_post(&session, "Strict").await;
    app.post(&format!("/api/v1/posts/{id}/publish"), Some(&session), None)
        .await;

    let (status, _) = app
        .post(
            &format!("/api/v1/posts/{id}/comments"),
            Some(&session),
            Some(json!({ "body": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
