//! Integration tests for nr-web API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - The four bookshelf endpoints: status codes, messages, stored effects
//! - Shelves read used by the bookshelf view
//! - Catalog reads and search over the bundled fixture

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use nr_common::content::{ContentGateway, MemorySpace, SpaceFixture};
use nr_common::management::{CategoryGateway, MemoryIntentLog};
use nr_web::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

const FIXTURE: &str = include_str!("../../fixtures/space.json");

/// Test helper: app over a fresh in-memory space
fn setup_app() -> (axum::Router, Arc<MemorySpace>) {
    let space = Arc::new(MemorySpace::from_fixture(
        SpaceFixture::from_json(FIXTURE).unwrap(),
    ));
    let state = AppState::new(
        ContentGateway::new(space.clone()),
        CategoryGateway::new(space.clone(), Arc::new(MemoryIntentLog::new())),
    );
    (build_router(state), space)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = setup_app();
    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "nr-web");
    assert!(json["uptimeSeconds"].is_u64());
}

// =============================================================================
// isFavorite
// =============================================================================

#[tokio::test]
async fn test_is_favorite_false_without_relation() {
    let (app, _) = setup_app();
    let (status, json) = send(&app, get("/api/my-books/isFavorite?userId=u1&bookId=b9")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"isFavorite": false}));
}

#[tokio::test]
async fn test_is_favorite_true_for_favourite() {
    let (app, _) = setup_app();
    let (status, json) = send(&app, get("/api/my-books/isFavorite?userId=u1&bookId=b4")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["isFavorite"], true);
}

#[tokio::test]
async fn test_is_favorite_missing_parameter() {
    let (app, _) = setup_app();
    for uri in [
        "/api/my-books/isFavorite?userId=u1",
        "/api/my-books/isFavorite?bookId=b1",
        "/api/my-books/isFavorite?userId=&bookId=b1",
    ] {
        let (status, json) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json, json!({"error": "Missing parameters"}));
    }
}

#[tokio::test]
async fn test_is_favorite_unknown_user_is_server_error() {
    let (app, _) = setup_app();
    let (status, json) = send(&app, get("/api/my-books/isFavorite?userId=nobody&bookId=b1")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to fetch favorite status");
}

// =============================================================================
// moveCategory
// =============================================================================

#[tokio::test]
async fn test_move_category_missing_book_id() {
    let (app, space) = setup_app();
    let (status, json) = send(
        &app,
        post_json(
            "/api/my-books/moveCategory",
            json!({"userId": "u1", "oldCategory": "wantToRead", "newCategory": "read"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"error": "Missing parameters"}));
    assert_eq!(space.update_count(), 0);
}

#[tokio::test]
async fn test_move_category_requires_old_category_field() {
    let (app, _) = setup_app();
    let (status, _) = send(
        &app,
        post_json(
            "/api/my-books/moveCategory",
            json!({"userId": "u1", "bookId": "b1", "newCategory": "read"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(
        &app,
        post_json(
            "/api/my-books/moveCategory",
            json!({"userId": "u1", "bookId": "b6", "oldCategory": null, "newCategory": "read"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Category moved successfully");
}

#[tokio::test]
async fn test_move_category_updates_store() {
    let (app, space) = setup_app();
    let (status, json) = send(
        &app,
        post_json(
            "/api/my-books/moveCategory",
            json!({
                "userId": "u1",
                "bookId": "b1",
                "oldCategory": "wantToRead",
                "newCategory": "currentlyReading"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"message": "Category moved successfully"}));
    assert_eq!(space.published_links("u1", "wantToRead").await, vec!["b2"]);
    assert_eq!(
        space.published_links("u1", "currentlyReading").await,
        vec!["b3", "b1"]
    );
}

#[tokio::test]
async fn test_move_category_gateway_failure() {
    let (app, space) = setup_app();
    space.fail_writes(true);

    let (status, json) = send(
        &app,
        post_json(
            "/api/my-books/moveCategory",
            json!({"userId": "u1", "bookId": "b1", "oldCategory": "", "newCategory": "read"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Category update failed"));
}

#[tokio::test]
async fn test_move_category_undecodable_body() {
    let (app, _) = setup_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/my-books/moveCategory")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing parameters");
}

// =============================================================================
// removeFromCategory / updateCategory
// =============================================================================

#[tokio::test]
async fn test_remove_from_category() {
    let (app, space) = setup_app();
    let (status, json) = send(
        &app,
        post_json(
            "/api/my-books/removeFromCategory",
            json!({"userId": "u1", "bookId": "b2", "category": "wantToRead"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Book removed from category");
    assert_eq!(space.published_links("u1", "wantToRead").await, vec!["b1"]);
}

#[tokio::test]
async fn test_remove_from_category_requires_category() {
    let (app, _) = setup_app();
    let (status, json) = send(
        &app,
        post_json(
            "/api/my-books/removeFromCategory",
            json!({"userId": "u1", "bookId": "b2", "category": ""}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing parameters");
}

#[tokio::test]
async fn test_remove_from_invalid_category_is_server_error() {
    let (app, _) = setup_app();
    let (status, json) = send(
        &app,
        post_json(
            "/api/my-books/removeFromCategory",
            json!({"userId": "u1", "bookId": "b2", "category": "shelf"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("Invalid category"));
}

#[tokio::test]
async fn test_update_category_favourite_toggle() {
    let (app, _) = setup_app();

    let (status, json) = send(
        &app,
        post_json(
            "/api/my-books/updateCategory",
            json!({"userId": "u1", "bookId": "b1", "category": "favourites"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Category updated");

    let (_, json) = send(&app, get("/api/my-books/isFavorite?userId=u1&bookId=b1")).await;
    assert_eq!(json["isFavorite"], true);

    let (status, _) = send(
        &app,
        post_json(
            "/api/my-books/updateCategory",
            json!({"userId": "u1", "bookId": "b1", "category": ""}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, get("/api/my-books/isFavorite?userId=u1&bookId=b1")).await;
    assert_eq!(json["isFavorite"], false);
}

#[tokio::test]
async fn test_update_category_missing_user() {
    let (app, _) = setup_app();
    let (status, json) = send(
        &app,
        post_json(
            "/api/my-books/updateCategory",
            json!({"bookId": "b1", "category": "read"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing parameters");
}

// =============================================================================
// Shelves
// =============================================================================

#[tokio::test]
async fn test_shelves_reflect_mutations() {
    let (app, _) = setup_app();

    let (status, json) = send(&app, get("/api/my-books/shelves?userId=u1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["wantToRead"].as_array().unwrap().len(), 2);
    assert_eq!(json["currentlyReading"][0]["id"], "b3");

    send(
        &app,
        post_json(
            "/api/my-books/moveCategory",
            json!({"userId": "u1", "bookId": "b2", "oldCategory": "wantToRead", "newCategory": "read"}),
        ),
    )
    .await;

    let (_, json) = send(&app, get("/api/my-books/shelves?userId=u1")).await;
    assert_eq!(json["wantToRead"].as_array().unwrap().len(), 1);
    assert_eq!(json["read"][0]["id"], "b2");
}

#[tokio::test]
async fn test_shelves_unknown_user() {
    let (app, _) = setup_app();
    let (status, _) = send(&app, get("/api/my-books/shelves?userId=nobody")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/api/my-books/shelves")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_books_paged_and_filtered_by_genre() {
    let (app, _) = setup_app();

    let (status, json) = send(&app, get("/api/books?pageSize=4&page=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalItems"], 6);
    assert_eq!(json["totalPages"], 2);
    assert_eq!(json["items"].as_array().unwrap().len(), 2);

    let (_, json) = send(&app, get("/api/books?genre=classics")).await;
    assert_eq!(json["totalItems"], 2);

    let (status, _) = send(&app, get("/api/books?genre=horror")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_detail_with_series() {
    let (app, _) = setup_app();

    let (status, json) = send(&app, get("/api/books/b2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["book"]["title"], "Dune Messiah");
    assert_eq!(json["series"]["title"], "Dune Chronicles");

    let (_, json) = send(&app, get("/api/books/b3")).await;
    assert!(json["series"].is_null());

    let (status, json) = send(&app, get("/api/books/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_genre_detail() {
    let (app, _) = setup_app();
    let (status, json) = send(&app, get("/api/genres/Fantasy")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["genre"]["id"], "g1");
    assert_eq!(json["books"]["totalItems"], 4);
    assert_eq!(json["lists"][0]["name"], "Award Winners");
}

#[tokio::test]
async fn test_list_detail_pages_books() {
    let (app, _) = setup_app();
    let (status, json) = send(&app, get("/api/lists/l1?pageSize=1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["list"]["name"], "Award Winners");
    assert_eq!(json["list"]["books"].as_array().unwrap().len(), 0);
    assert_eq!(json["books"]["totalItems"], 2);
    assert_eq!(json["books"]["items"][0]["id"], "b1");
}

#[tokio::test]
async fn test_author_routes() {
    let (app, _) = setup_app();

    let (_, json) = send(&app, get("/api/authors")).await;
    assert_eq!(json.as_array().unwrap().len(), 3);

    let (_, json) = send(&app, get("/api/authors/a1/books")).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (_, json) = send(&app, get("/api/authors/a1/series")).await;
    assert_eq!(json[0]["id"], "s1");

    let (status, _) = send(&app, get("/api/authors/zz")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tag_lists_and_user() {
    let (app, _) = setup_app();

    let (_, json) = send(&app, get("/api/tags/summer/lists")).await;
    assert_eq!(json[0]["id"], "l2");

    let (_, json) = send(&app, get("/api/tags/none/lists")).await;
    assert_eq!(json, json!([]));

    let (_, json) = send(&app, get("/api/users/u1")).await;
    assert_eq!(json["fullName"], "Ana Anić");
    assert!(json.get("password").is_none());
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search() {
    let (app, _) = setup_app();

    let (status, json) = send(&app, get("/api/search?q=dune")).await;
    assert_eq!(status, StatusCode::OK);
    let hits = json.as_array().unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0]["type"], "book");
    assert_eq!(hits[0]["href"], "/books/b1");
    assert_eq!(hits[0]["authorName"], "Frank Herbert");

    let (_, json) = send(&app, get("/api/search?q=%20")).await;
    assert_eq!(json, json!([]));

    let (_, json) = send(&app, get("/api/search")).await;
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_search_results_paged() {
    let (app, _) = setup_app();

    let (status, json) = send(&app, get("/api/search/results?q=dune")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["results"]["pageSize"], 6);
    assert_eq!(json["results"]["totalItems"], 2);
    assert_eq!(json["results"]["totalPages"], 1);
    assert_eq!(json["results"]["items"][0]["href"], "/books/b1");
    assert_eq!(json["pages"], json!([]));

    let (_, json) = send(&app, get("/api/search/results?q=dune&page=2&pageSize=1")).await;
    assert_eq!(json["results"]["page"], 2);
    assert_eq!(json["results"]["totalPages"], 2);
    assert_eq!(json["results"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(
        json["pages"],
        json!([{"kind": "number", "page": 1}, {"kind": "number", "page": 2}])
    );

    let (_, json) = send(&app, get("/api/search/results?q=%20")).await;
    assert_eq!(json["results"]["totalItems"], 0);
}
