//! Integration tests for the watch-progress routes.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};

fn item_json(id: &str, title: &str, watched: f64, duration: f64) -> serde_json::Value {
    serde_json::to_value(fixtures::media_item(id, title, watched, duration)).unwrap()
}

#[tokio::test]
async fn test_progress_requires_auth() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/progress").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_batch_upload_and_list() {
    let fixture = TestFixture::new().await;
    let cookie = fixture.login("user-1");

    let uploaded = fixture
        .put_as(
            "/api/v1/progress",
            json!([
                item_json("603", "The Matrix", 3600.0, 8160.0),
                item_json("604", "The Matrix Reloaded", 120.0, 8300.0),
            ]),
            &cookie,
        )
        .await;

    assert_eq!(uploaded.status, StatusCode::OK);
    assert_eq!(uploaded.body["saved"], 2);

    let listed = fixture.get_as("/api/v1/progress", &cookie).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_is_most_recent_first() {
    let fixture = TestFixture::new().await;
    let cookie = fixture.login("user-1");

    let mut older = item_json("603", "The Matrix", 3600.0, 8160.0);
    older["last_updated"] = json!(1_700_000_000_000_i64);
    let mut newer = item_json("604", "The Matrix Reloaded", 120.0, 8300.0);
    newer["last_updated"] = json!(1_700_000_060_000_i64);

    fixture
        .put_as("/api/v1/progress", json!([older, newer]), &cookie)
        .await;

    let listed = fixture.get_as("/api/v1/progress", &cookie).await;
    assert_eq!(listed.body[0]["media_id"], "604");
    assert_eq!(listed.body[1]["media_id"], "603");
}

#[tokio::test]
async fn test_single_save_path_overrides_body() {
    let fixture = TestFixture::new().await;
    let cookie = fixture.login("user-1");

    // Body claims a different id; the path segment wins
    let response = fixture
        .post_as(
            "/api/v1/progress/movie/603",
            item_json("totally-wrong", "The Matrix", 3600.0, 8160.0),
            &cookie,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["media_id"], "603");
    assert_eq!(response.body["kind"], "movie");
    assert_eq!(response.body["user_id"], "user-1");
    assert_eq!(response.body["watched"], 3600.0);
}

#[tokio::test]
async fn test_single_save_updates_existing_row() {
    let fixture = TestFixture::new().await;
    let cookie = fixture.login("user-1");

    fixture
        .post_as(
            "/api/v1/progress/movie/603",
            item_json("603", "The Matrix", 600.0, 8160.0),
            &cookie,
        )
        .await;
    fixture
        .post_as(
            "/api/v1/progress/movie/603",
            item_json("603", "The Matrix", 4200.0, 8160.0),
            &cookie,
        )
        .await;

    let listed = fixture.get_as("/api/v1/progress", &cookie).await;
    let rows = listed.body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["watched"], 4200.0);
}

#[tokio::test]
async fn test_save_rejects_invalid_kind() {
    let fixture = TestFixture::new().await;
    let cookie = fixture.login("user-1");

    let response = fixture
        .post_as(
            "/api/v1/progress/podcast/603",
            item_json("603", "The Matrix", 600.0, 8160.0),
            &cookie,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_progress() {
    let fixture = TestFixture::new().await;
    let cookie = fixture.login("user-1");

    fixture
        .post_as(
            "/api/v1/progress/movie/603",
            item_json("603", "The Matrix", 600.0, 8160.0),
            &cookie,
        )
        .await;

    let deleted = fixture
        .delete_as("/api/v1/progress/movie/603", &cookie)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["deleted"], true);

    // Second delete finds nothing
    let again = fixture
        .delete_as("/api/v1/progress/movie/603", &cookie)
        .await;
    assert_eq!(again.body["deleted"], false);

    let listed = fixture.get_as("/api/v1/progress", &cookie).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_progress_scoped_per_user() {
    let fixture = TestFixture::new().await;
    let alice = fixture.login("alice");
    let bob = fixture.login("bob");

    fixture
        .post_as(
            "/api/v1/progress/movie/603",
            item_json("603", "The Matrix", 600.0, 8160.0),
            &alice,
        )
        .await;

    let bobs = fixture.get_as("/api/v1/progress", &bob).await;
    assert_eq!(bobs.body.as_array().unwrap().len(), 0);

    // Bob cannot delete Alice's row
    let deleted = fixture.delete_as("/api/v1/progress/movie/603", &bob).await;
    assert_eq!(deleted.body["deleted"], false);
}
