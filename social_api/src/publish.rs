use async_trait::async_trait;
use base64::Engine;
use types::PublishResult;

use crate::error::ApiError;

/// The image half of an artifact, as supplied by the caller: either a
/// reference the provider can fetch, or the raw bytes of an upload.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Url(String),
    Bytes { bytes: Vec<u8>, filename: String },
}

impl ImageSource {
    /// Build from the parsed form fields. Uploaded bytes win over a URL;
    /// neither present is an input error, raised before any provider call.
    pub fn from_parts(
        url: Option<String>,
        upload: Option<(Vec<u8>, String)>,
    ) -> Result<Self, ApiError> {
        if let Some((bytes, filename)) = upload {
            return Ok(ImageSource::Bytes { bytes, filename });
        }

        match url {
            Some(url) if !url.trim().is_empty() => Ok(ImageSource::Url(url)),
            _ => Err(ApiError::InvalidInput(
                "provide an image URL or an uploaded image file".to_string(),
            )),
        }
    }

    /// A URL form of the image: the URL itself, or the bytes wrapped as a
    /// base64 data URL for providers that only accept URL input.
    pub fn as_url(&self) -> String {
        match self {
            ImageSource::Url(url) => url.clone(),
            ImageSource::Bytes { bytes, .. } => format!(
                "data:image/png;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(bytes)
            ),
        }
    }
}

/// One provider's publish protocol behind a uniform boundary. Failures are
/// encoded in the returned `PublishResult`, never as an `Err`, so one bad
/// destination cannot take down a batch.
#[async_trait]
pub trait Publisher {
    async fn publish(&self, destination_id: &str, caption: &str, image: &ImageSource)
        -> PublishResult;
}

/// Fan one artifact out to every destination, sequentially.
///
/// The output has exactly one entry per requested destination, in the same
/// order. The loop never short-circuits.
pub async fn publish_batch<P: Publisher + Sync>(
    publisher: &P,
    destination_ids: &[String],
    caption: &str,
    image: &ImageSource,
) -> Vec<PublishResult> {
    let mut results = Vec::with_capacity(destination_ids.len());

    for id in destination_ids {
        results.push(publisher.publish(id, caption, image).await);
    }

    results
}
