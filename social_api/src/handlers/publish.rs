use axum::extract::{Multipart, State};
use axum::Json;
use tracing::instrument;
use types::PublishResponse;

use crate::error::ApiError;
use crate::facebook::FacebookPublisher;
use crate::publish::{publish_batch, ImageSource};
use crate::state::AppState;

struct PublishForm {
    page_ids: Vec<String>,
    caption: String,
    image: ImageSource,
}

/// Parse the shared publish form: repeated `page_ids` fields (each possibly
/// comma-separated), a caption, and an image as URL or upload.
async fn parse_publish_form(mut multipart: Multipart) -> Result<PublishForm, ApiError> {
    let mut page_ids: Vec<String> = vec![];
    let mut caption: Option<String> = None;
    let mut image_url: Option<String> = None;
    let mut upload: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?
    {
        match field.name() {
            Some("page_ids") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
                page_ids.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string),
                );
            }
            Some("caption") => {
                caption = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::InvalidInput(e.to_string()))?,
                );
            }
            Some("image_url") => {
                image_url = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::InvalidInput(e.to_string()))?,
                );
            }
            Some("image") => {
                let filename = field.file_name().unwrap_or("image.png").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
                upload = Some((bytes.to_vec(), filename));
            }
            _ => {}
        }
    }

    if page_ids.is_empty() {
        return Err(ApiError::InvalidInput(
            "at least one page id is required".to_string(),
        ));
    }

    let Some(caption) = caption else {
        return Err(ApiError::InvalidInput("caption is required".to_string()));
    };

    let image = ImageSource::from_parts(image_url, upload)?;

    Ok(PublishForm {
        page_ids,
        caption,
        image,
    })
}

/// Publish one artifact to a batch of Facebook pages.
///
/// Fails fast when no user token is configured at all; otherwise the page
/// list is resolved once for the batch and every requested page gets exactly
/// one result, in request order.
#[instrument(skip(state, multipart))]
pub async fn publish_facebook(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PublishResponse>, ApiError> {
    let form = parse_publish_form(multipart).await?;

    if state.facebook.current_token().await.is_none() {
        return Err(ApiError::ConfigurationMissing("FACEBOOK_TOKEN"));
    }

    let pages = state.facebook.list_pages().await?;
    let publisher = FacebookPublisher::new(&state.facebook, pages);

    let results = publish_batch(&publisher, &form.page_ids, &form.caption, &form.image).await;

    Ok(Json(PublishResponse { results }))
}

/// Publish one artifact to a batch of LinkedIn destinations.
#[instrument(skip(state, multipart))]
pub async fn publish_linkedin(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PublishResponse>, ApiError> {
    let form = parse_publish_form(multipart).await?;

    if !state.blotato.is_configured() {
        return Err(ApiError::ConfigurationMissing("BLOTATO_API_KEY"));
    }

    let results = publish_batch(&state.blotato, &form.page_ids, &form.caption, &form.image).await;

    Ok(Json(PublishResponse { results }))
}
