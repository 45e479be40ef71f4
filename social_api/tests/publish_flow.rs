use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::json;

use social_api::blotato::BlotatoClient;
use social_api::facebook::{FacebookClient, FacebookPublisher};
use social_api::publish::{publish_batch, ImageSource, Publisher};
use social_api::token::TokenStore;

/// Serve a stub upstream on an ephemeral port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .unwrap();
    });

    format!("http://{addr}")
}

fn facebook_client(base_url: String, store: TokenStore) -> FacebookClient {
    FacebookClient::new(
        reqwest::Client::new(),
        base_url,
        "v22.0".to_string(),
        Some("app-id".to_string()),
        Some("app-secret".to_string()),
        store,
    )
}

#[tokio::test]
async fn unconfigured_token_lists_no_pages_and_makes_no_calls() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/v22.0/me/accounts",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "data": [] }))
            }
        }),
    );
    let base_url = serve(router).await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().to_str().unwrap(), None);
    let client = facebook_client(base_url, store);

    let pages = client.list_pages().await.unwrap();

    assert_eq!(pages, vec![]);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stale_token_is_refreshed_once_and_the_listing_retried() {
    let refreshes = Arc::new(AtomicUsize::new(0));

    let refresh_counter = refreshes.clone();
    let router = Router::new()
        .route(
            "/v22.0/me/accounts",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("access_token").map(String::as_str) == Some("fresh") {
                    (
                        StatusCode::OK,
                        Json(json!({
                            "data": [
                                { "id": "p1", "name": "Page One", "access_token": "p1-token" }
                            ]
                        })),
                    )
                } else {
                    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "expired" })))
                }
            }),
        )
        .route(
            "/v22.0/oauth/access_token",
            get(move || {
                let counter = refresh_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "access_token": "fresh" }))
                }
            }),
        );
    let base_url = serve(router).await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().to_str().unwrap(), Some("stale".to_string()));
    let client = facebook_client(base_url, store.clone());

    let pages = client.list_pages().await.unwrap();

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].id, "p1");
    assert_eq!(pages[0].access_token.as_deref(), Some("p1-token"));
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);

    // The renewed token was swapped in and persisted for the next start.
    assert_eq!(client.current_token().await.as_deref(), Some("fresh"));

    let restarted = TokenStore::new(dir.path().to_str().unwrap(), None);
    assert_eq!(restarted.load().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn listing_fails_after_exactly_one_refresh_attempt() {
    let refreshes = Arc::new(AtomicUsize::new(0));

    let refresh_counter = refreshes.clone();
    let router = Router::new()
        .route(
            "/v22.0/me/accounts",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))) }),
        )
        .route(
            "/v22.0/oauth/access_token",
            get(move || {
                let counter = refresh_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::BAD_REQUEST, Json(json!({ "error": "nope" })))
                }
            }),
        );
    let base_url = serve(router).await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().to_str().unwrap(), Some("stale".to_string()));
    let client = facebook_client(base_url, store);

    assert!(client.list_pages().await.is_err());
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn facebook_batch_is_index_aligned_with_one_unresolvable_page() {
    let router = Router::new().route(
        "/v22.0/:page/photos",
        post(|| async { Json(json!({ "id": "published" })) }),
    );
    let base_url = serve(router).await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::new(dir.path().to_str().unwrap(), Some("user-token".to_string()));
    let client = facebook_client(base_url, store);

    let pages = vec![
        types::Destination {
            id: "p1".to_string(),
            name: "Page One".to_string(),
            access_token: Some("p1-token".to_string()),
        },
        types::Destination {
            id: "p3".to_string(),
            name: "Page Three".to_string(),
            access_token: Some("p3-token".to_string()),
        },
    ];
    let publisher = FacebookPublisher::new(&client, pages);

    let ids = vec!["p1".to_string(), "p2".to_string(), "p3".to_string()];
    let image = ImageSource::Url("https://example.invalid/a.png".to_string());

    let results = publish_batch(&publisher, &ids, "caption", &image).await;

    assert_eq!(
        results
            .iter()
            .map(|r| r.destination_id.as_str())
            .collect::<Vec<_>>(),
        vec!["p1", "p2", "p3"]
    );
    assert_eq!(results[0].status, 200);
    assert_eq!(results[1].status, 0);
    assert_eq!(results[2].status, 200);
}

#[tokio::test]
async fn blotato_publishes_media_then_post() {
    let posts = Arc::new(AtomicUsize::new(0));

    let post_counter = posts.clone();
    let router = Router::new()
        .route(
            "/v2/media",
            post(|| async { Json(json!({ "url": "https://cdn.invalid/hosted.png" })) }),
        )
        .route(
            "/v2/posts",
            post(move |Json(body): Json<serde_json::Value>| {
                let counter = post_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(body["post"]["accountId"], json!("3936"));
                    assert_eq!(body["post"]["target"]["pageId"], json!("104013486"));
                    assert_eq!(
                        body["post"]["content"]["mediaUrls"],
                        json!(["https://cdn.invalid/hosted.png"])
                    );
                    (StatusCode::CREATED, Json(json!({ "id": "post-1" })))
                }
            }),
        );
    let base_url = serve(router).await;

    let client = BlotatoClient::new(
        reqwest::Client::new(),
        base_url,
        Some("key".to_string()),
        vec![],
    );
    let image = ImageSource::Url("https://example.invalid/a.png".to_string());

    let result = client.publish("3936:104013486", "caption", &image).await;

    assert_eq!(result.status, 201);
    assert_eq!(posts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_media_upload_skips_the_post_step() {
    let posts = Arc::new(AtomicUsize::new(0));

    let post_counter = posts.clone();
    let router = Router::new()
        .route(
            "/v2/media",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "storage down" })),
                )
            }),
        )
        .route(
            "/v2/posts",
            post(move || {
                let counter = post_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({}))
                }
            }),
        );
    let base_url = serve(router).await;

    let client = BlotatoClient::new(
        reqwest::Client::new(),
        base_url,
        Some("key".to_string()),
        vec![],
    );
    let image = ImageSource::Url("https://example.invalid/a.png".to_string());

    let result = client.publish("3936", "caption", &image).await;

    assert_eq!(result.status, 500);
    assert_eq!(result.response["step"], json!("media"));
    assert_eq!(posts.load(Ordering::SeqCst), 0);
}
