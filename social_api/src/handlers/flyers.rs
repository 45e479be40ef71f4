use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use tracing::instrument;
use types::SaveFlyerRequest;

use crate::error::ApiError;
use crate::models::{Flyer, NewFlyer};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn save(
    State(state): State<AppState>,
    Json(body): Json<SaveFlyerRequest>,
) -> Result<(StatusCode, Json<Flyer>), ApiError> {
    use crate::schema::flyers;

    if body.content.trim().is_empty() {
        return Err(ApiError::InvalidInput("content is required".to_string()));
    }

    let mut conn = state
        .pool
        .get()
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    let flyer = diesel::insert_into(flyers::table)
        .values(NewFlyer {
            content: &body.content,
            image_url: &body.image_url,
            prompt: body.prompt.as_deref(),
            model: body.model.as_deref(),
        })
        .returning(Flyer::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(flyer)))
}

/// Most recent first.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Flyer>>, ApiError> {
    use crate::schema::flyers::dsl::{created_at, flyers};

    let mut conn = state
        .pool
        .get()
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    let records = flyers
        .select(Flyer::as_select())
        .order(created_at.desc())
        .load(&mut conn)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    Ok(Json(records))
}
