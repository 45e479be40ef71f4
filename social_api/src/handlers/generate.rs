use axum::extract::{Multipart, State};
use axum::Json;
use tracing::instrument;
use types::GenerateResponse;

use crate::content::Seed;
use crate::error::ApiError;
use crate::state::AppState;

/// Pick the generation seed from the parsed form fields. An uploaded audio
/// file wins over the text field when both arrive; neither (or a blank text
/// field) is an input error, raised before any external call.
fn choose_seed(text: Option<String>, audio: Option<(Vec<u8>, String)>) -> Result<Seed, ApiError> {
    match (audio, text) {
        (Some((bytes, filename)), _) => Ok(Seed::Audio { bytes, filename }),
        (None, Some(text)) if !text.trim().is_empty() => Ok(Seed::Text(text)),
        _ => Err(ApiError::InvalidInput(
            "provide a text brief or an audio file".to_string(),
        )),
    }
}

/// Generate a caption and image from a text brief or an uploaded audio memo.
///
/// The response carries the current Facebook page list so the client can
/// offer publish targets immediately; a failed listing fails the call.
#[instrument(skip(state, multipart))]
pub async fn generate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<GenerateResponse>, ApiError> {
    let mut text: Option<String> = None;
    let mut audio: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?
    {
        match field.name() {
            Some("text") => {
                text = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::InvalidInput(e.to_string()))?,
                );
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("memo.webm").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
                audio = Some((bytes.to_vec(), filename));
            }
            _ => {}
        }
    }

    let seed = choose_seed(text, audio)?;

    let artifact = state.generator.generate(seed).await?;

    let pages = state.facebook.list_pages().await?;

    Ok(Json(GenerateResponse {
        content: artifact.content,
        image_url: artifact.image_url,
        pages,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neither_text_nor_audio_is_an_input_error() {
        assert!(matches!(
            choose_seed(None, None),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn blank_text_is_an_input_error() {
        assert!(matches!(
            choose_seed(Some("   ".to_string()), None),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn audio_wins_over_text() {
        let seed = choose_seed(
            Some("brief".to_string()),
            Some((vec![1, 2, 3], "memo.webm".to_string())),
        )
        .unwrap();

        assert!(matches!(seed, Seed::Audio { .. }));
    }

    #[test]
    fn text_alone_is_a_text_seed() {
        let seed = choose_seed(Some("brief".to_string()), None).unwrap();

        assert!(matches!(seed, Seed::Text(text) if text == "brief"));
    }
}
