use serde::{Deserialize, Serialize};

/// A publishable page or account on a social platform.
///
/// Facebook destinations carry a page-scoped access token resolved from the
/// user token. Blotato/LinkedIn destinations are addressed by id alone, where
/// the id may be a composite `accountId:pageId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// The outcome of publishing to one destination.
///
/// `status` is the numeric status reported by the provider, or 0 when the
/// call never completed. `response` holds the raw provider body or an error
/// detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResult {
    pub destination_id: String,

    pub status: u16,

    pub response: serde_json::Value,
}

/// A generated caption + image pair, treated as one atomic unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentArtifact {
    pub content: String,

    /// Either a remote URL or a `data:image/...;base64,` data URL. Opaque to
    /// callers.
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagesResponse {
    pub pages: Vec<Destination>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResponse {
    pub results: Vec<PublishResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub content: String,

    pub image_url: String,

    /// Destinations reachable with the current credential, bundled with the
    /// artifact so a client can pick where to publish.
    pub pages: Vec<Destination>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePostRequest {
    pub caption: String,

    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFlyerRequest {
    pub content: String,

    pub image_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}
