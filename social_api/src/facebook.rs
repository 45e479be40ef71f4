use redact::Secret;
use serde_json::json;
use types::{Destination, PublishResult};

use crate::error::ApiError;
use crate::publish::{ImageSource, Publisher};
use crate::token::{TokenSlot, TokenStore};

/// Client for the Facebook Graph API.
///
/// Owns the process-wide user-token slot. Page listing recovers from a stale
/// token with a single refresh-and-retry; a refresh that fails leaves the old
/// token in place and lets the dependent call fail on its own.
#[derive(Clone, Debug)]
pub struct FacebookClient {
    http: reqwest::Client,
    base_url: String,
    graph_version: String,
    app_id: Option<String>,
    app_secret: Option<Secret<String>>,
    token: TokenSlot,
    store: TokenStore,
}

impl FacebookClient {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        graph_version: String,
        app_id: Option<String>,
        app_secret: Option<String>,
        store: TokenStore,
    ) -> Self {
        Self {
            http,
            base_url,
            graph_version,
            app_id,
            app_secret: app_secret.map(Secret::new),
            token: store.slot(),
            store,
        }
    }

    fn graph_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.graph_version, path)
    }

    pub async fn current_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Exchange a possibly-expired user token for a renewed long-lived one.
    ///
    /// A no-op without both app credentials. Any failure is silent: the old
    /// token is returned unchanged and the caller that needed a working token
    /// surfaces the real error. On success the slot is swapped and the token
    /// persisted (best effort) for the next process start.
    pub async fn refresh_token(&self, old_token: &str) -> String {
        let (Some(app_id), Some(app_secret)) = (&self.app_id, &self.app_secret) else {
            return old_token.to_string();
        };

        let url = self.graph_url("oauth/access_token");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("grant_type", "fb_exchange_token"),
                ("client_id", app_id.as_str()),
                ("client_secret", app_secret.expose_secret()),
                ("fb_exchange_token", old_token),
            ])
            .send()
            .await;

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!("token refresh returned {}", response.status());
                return old_token.to_string();
            }
            Err(e) => {
                tracing::warn!("token refresh call failed: {}", e);
                return old_token.to_string();
            }
        };

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("token refresh response was not JSON: {}", e);
                return old_token.to_string();
            }
        };

        let Some(new_token) = body["access_token"].as_str() else {
            tracing::warn!("token refresh response had no access_token");
            return old_token.to_string();
        };

        *self.token.write().await = Some(new_token.to_string());
        self.store.save(new_token);

        new_token.to_string()
    }

    /// List the pages publishable with the current token.
    ///
    /// An empty slot is a valid silent state: empty list, no network call.
    /// On a failed call the token is refreshed and the call retried exactly
    /// once; a second failure is a retrieval error.
    pub async fn list_pages(&self) -> Result<Vec<Destination>, ApiError> {
        let Some(token) = self.current_token().await else {
            return Ok(vec![]);
        };

        match self.fetch_pages(&token).await {
            Ok(pages) => Ok(pages),
            Err(first_failure) => {
                let token = self.refresh_token(&token).await;

                self.fetch_pages(&token).await.map_err(|retry_failure| {
                    tracing::error!(
                        "page listing failed after refresh: {} (first attempt: {})",
                        retry_failure,
                        first_failure
                    );
                    ApiError::UpstreamCall("failed to fetch Facebook pages".to_string())
                })
            }
        }
    }

    async fn fetch_pages(&self, token: &str) -> Result<Vec<Destination>, String> {
        let url = self.graph_url("me/accounts");

        let response = self
            .http
            .get(&url)
            .query(&[("access_token", token)])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| e.to_string())?;

        let pages = body["data"]
            .as_array()
            .map(|pages| {
                pages
                    .iter()
                    .map(|page| Destination {
                        id: page["id"].as_str().unwrap_or_default().to_string(),
                        name: page["name"].as_str().unwrap_or_default().to_string(),
                        access_token: page["access_token"].as_str().map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(pages)
    }

    /// Publish one photo post to a page, with the page-scoped token.
    /// Multipart upload when bytes were supplied, URL-based otherwise.
    async fn publish_photo(
        &self,
        page_id: &str,
        page_token: &str,
        caption: &str,
        image: &ImageSource,
    ) -> (u16, serde_json::Value) {
        let url = self.graph_url(&format!("{page_id}/photos"));

        let request = match image {
            ImageSource::Bytes { bytes, filename } => {
                let part = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(filename.clone());
                let form = reqwest::multipart::Form::new()
                    .text("message", caption.to_string())
                    .text("access_token", page_token.to_string())
                    .part("source", part);

                self.http.post(&url).multipart(form)
            }
            ImageSource::Url(image_url) => self.http.post(&url).form(&[
                ("url", image_url.as_str()),
                ("message", caption),
                ("access_token", page_token),
            ]),
        };

        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response
                    .json::<serde_json::Value>()
                    .await
                    .unwrap_or_else(|e| json!({ "error": e.to_string() }));
                (status, body)
            }
            Err(e) => (0, json!({ "error": e.to_string() })),
        }
    }
}

/// Publisher over one batch's resolved page list.
///
/// Pages are re-resolved per batch, never cached longer: the handler lists
/// them once and this type looks each destination up in that snapshot. A
/// destination missing from the snapshot gets a permission-error result and
/// the batch moves on.
pub struct FacebookPublisher<'a> {
    client: &'a FacebookClient,
    pages: Vec<Destination>,
}

impl<'a> FacebookPublisher<'a> {
    pub fn new(client: &'a FacebookClient, pages: Vec<Destination>) -> Self {
        Self { client, pages }
    }
}

#[async_trait::async_trait]
impl Publisher for FacebookPublisher<'_> {
    async fn publish(
        &self,
        destination_id: &str,
        caption: &str,
        image: &ImageSource,
    ) -> PublishResult {
        let page_token = self
            .pages
            .iter()
            .find(|page| page.id == destination_id)
            .and_then(|page| page.access_token.clone());

        let Some(page_token) = page_token else {
            return PublishResult {
                destination_id: destination_id.to_string(),
                status: 0,
                response: json!({
                    "error": "no publishable credential for this page"
                }),
            };
        };

        let (status, response) = self
            .client
            .publish_photo(destination_id, &page_token, caption, image)
            .await;

        PublishResult {
            destination_id: destination_id.to_string(),
            status,
            response,
        }
    }
}
