use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use tracing::instrument;
use types::SavePostRequest;

use crate::error::ApiError;
use crate::models::{NewPost, Post};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn save(
    State(state): State<AppState>,
    Json(body): Json<SavePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    use crate::schema::posts;

    if body.caption.trim().is_empty() {
        return Err(ApiError::InvalidInput("caption is required".to_string()));
    }

    let mut conn = state
        .pool
        .get()
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    let post = diesel::insert_into(posts::table)
        .values(NewPost {
            caption: &body.caption,
            image_url: &body.image_url,
        })
        .returning(Post::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// Most recent first.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    use crate::schema::posts::dsl::{created_at, posts};

    let mut conn = state
        .pool
        .get()
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    let records = posts
        .select(Post::as_select())
        .order(created_at.desc())
        .load(&mut conn)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    Ok(Json(records))
}
