use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// The service's route table, shared by the binary and the tests.
pub fn routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/pages", get(handlers::pages::facebook_pages))
        .route("/linkedin/pages", get(handlers::pages::linkedin_pages))
        .route("/generate", post(handlers::generate::generate))
        .route("/publish", post(handlers::publish::publish_facebook))
        .route(
            "/linkedin/publish",
            post(handlers::publish::publish_linkedin),
        )
        .route("/posts/save", post(handlers::posts::save))
        .route("/posts", get(handlers::posts::list))
        .route("/flyers/save", post(handlers::flyers::save))
        .route("/flyers", get(handlers::flyers::list))
        // Audio memos and image uploads outgrow the default body limit.
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
}
