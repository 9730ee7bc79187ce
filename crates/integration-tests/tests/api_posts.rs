//! Post CRUD and owner lifecycle endpoints over the full router.

mod common;

use axum::http::StatusCode;
use domains::UserRole;
use serde_json::json;

#[tokio::test]
async fn human_creates_a_draft_and_publishes_it() {
    let app = common::spawn();
    let (_owner, session) = app.seed_user("ada", UserRole::Member).await;

    let (status, created) = app
        .post(
            "/api/v1/posts",
            Some(&session),
            Some(json!({ "title": "First Post", "body": "Hello world", "tags": ["intro"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "DRAFT");
    assert!(created["slug"].as_str().unwrap().starts_with("first-post-"));
    let id = created["id"].as_str().unwrap();

    let (status, published) = app
        .post(&format!("/api/v1/posts/{id}/publish"), Some(&session), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(published["status"], "PUBLISHED");
    assert!(published["publishedAt"].is_string());

    // the published post is now world-readable
    let (status, detail) = app.get(&format!("/api/v1/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "First Post");
    assert_eq!(detail["authorType"], "USER");
    assert_eq!(detail["tags"], json!(["intro"]));
}

#[tokio::test]
async fn missing_fields_are_a_400_validation_error() {
    let app = common::spawn();
    let (_owner, session) = app.seed_user("ada", UserRole::Member).await;

    let (status, json_body) = app
        .post(
            "/api/v1/posts",
            Some(&session),
            Some(json!({ "title": "No body here" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_body["error"]
        .as_str()
        .unwrap()
        .contains("title and body are required"));
}

#[tokio::test]
async fn bot_without_draft_permission_cannot_create() {
    let app = common::spawn();
    let (_owner, session) = app.seed_user("ada", UserRole::Member).await;
    let (bot_id, key) = app.create_bot(&session, "muzzled").await;
    app.set_bot_flags(&session, bot_id, json!({ "canDraft": false }))
        .await;

    let (status, body) = app
        .post(
            "/api/v1/posts",
            Some(&key),
            Some(json!({ "title": "nope", "body": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("draft permission"));
}

#[tokio::test]
async fn author_edits_a_draft_but_not_a_published_post() {
    let app = common::spawn();
    let (_owner, session) = app.seed_user("ada", UserRole::Member).await;
    let id = app.create_post(&session, "Editable").await;

    let (status, updated) = app
        .patch(
            &format!("/api/v1/posts/{id}"),
            Some(&session),
            json!({ "title": "Edited", "body": "New body" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Edited");

    app.post(&format!("/api/v1/posts/{id}/publish"), Some(&session), None)
        .await;
    let (status, body) = app
        .patch(
            &format!("/api/v1/posts/{id}"),
            Some(&session),
            json!({ "title": "Too late" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("published"));
}

#[tokio::test]
async fn only_the_author_may_edit() {
    let app = common::spawn();
    let (_owner, session) = app.seed_user("ada", UserRole::Member).await;
    let (_other, other_session) = app.seed_user("eve", UserRole::Member).await;
    let id = app.create_post(&session, "Private Draft").await;

    let (status, body) = app
        .patch(
            &format!("/api/v1/posts/{id}"),
            Some(&other_session),
            json!({ "title": "hijack" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("author"));
}

#[tokio::test]
async fn owner_archive_is_a_masked_404_for_strangers() {
    let app = common::spawn();
    let (_owner, session) = app.seed_user("ada", UserRole::Member).await;
    let (_other, other_session) = app.seed_user("eve", UserRole::Member).await;
    let id = app.create_post(&session, "Mine").await;
    app.post(&format!("/api/v1/posts/{id}/publish"), Some(&session), None)
        .await;

    let (status, body) = app
        .delete(&format!("/api/v1/posts/{id}"), Some(&other_session))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Post not found");

    let (status, archived) = app
        .delete(&format!("/api/v1/posts/{id}"), Some(&session))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(archived["status"], "ARCHIVED");
}

#[tokio::test]
async fn view_counter_increments_for_published_posts_only() {
    let app = common::spawn();
    let (_owner, session) = app.seed_user("ada", UserRole::Member).await;
    let id = app.create_post(&session, "Counted").await;

    // drafts do not leak their existence through the view counter
    let (status, _) = app
        .post(&format!("/api/v1/posts/{id}/view"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.post(&format!("/api/v1/posts/{id}/publish"), Some(&session), None)
        .await;
    let (_, first) = app
        .post(&format!("/api/v1/posts/{id}/view"), None, None)
        .await;
    let (_, second) = app
        .post(&format!("/api/v1/posts/{id}/view"), None, None)
        .await;
    assert_eq!(first["viewCount"], 1);
    assert_eq!(second["viewCount"], 2);

    let (status, read) = app.get(&format!("/api/v1/posts/{id}/view"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["viewCount"], 2);
}

#[tokio::test]
async fn pinning_requires_admin() {
    let app = common::spawn();
    let (_owner, session) = app.seed_user("ada", UserRole::Member).await;
    let (_admin, admin_session) = app.seed_user("root", UserRole::Admin).await;
    let id = app.create_post(&session, "Pin me").await;
    app.post(&format!("/api/v1/posts/{id}/publish"), Some(&session), None)
        .await;

    let (status, _) = app
        .post(&format!("/api/v1/posts/{id}/pin"), Some(&session), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, pinned) = app
        .post(&format!("/api/v1/posts/{id}/pin"), Some(&admin_session), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(pinned["pinnedAt"].is_string());

    let (status, unpinned) = app
        .delete(&format!("/api/v1/posts/{id}/pin"), Some(&admin_session))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(unpinned["pinnedAt"].is_null());
}
