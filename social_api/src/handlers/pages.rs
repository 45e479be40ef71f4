use axum::extract::State;
use axum::Json;
use tracing::instrument;
use types::PagesResponse;

use crate::error::ApiError;
use crate::state::AppState;

/// List the Facebook pages the current token can publish to.
#[instrument(skip(state))]
pub async fn facebook_pages(
    State(state): State<AppState>,
) -> Result<Json<PagesResponse>, ApiError> {
    let pages = state.facebook.list_pages().await?;

    Ok(Json(PagesResponse { pages }))
}

/// List the LinkedIn destinations known to the publishing partner.
#[instrument(skip(state))]
pub async fn linkedin_pages(
    State(state): State<AppState>,
) -> Result<Json<PagesResponse>, ApiError> {
    let pages = state.blotato.list_accounts().await?;

    Ok(Json(PagesResponse { pages }))
}
