use redact::Secret;
use serde_json::json;
use types::{Destination, PublishResult};

use crate::error::ApiError;
use crate::publish::{ImageSource, Publisher};

const API_KEY_HEADER: &str = "blotato-api-key";

/// Split a composite destination id `accountId[:pageId]` into its parts.
pub fn split_destination_id(id: &str) -> (&str, Option<&str>) {
    match id.split_once(':') {
        Some((account, page)) => (account, Some(page)),
        None => (id, None),
    }
}

/// Client for the Blotato publishing API (the LinkedIn destination source).
///
/// Destinations come from a statically configured list or from the partner
/// account listing — a configuration choice. Publishing is a two-step
/// sequence: host the media, then create the post.
#[derive(Clone, Debug)]
pub struct BlotatoClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<Secret<String>>,
    configured_accounts: Vec<Destination>,
}

impl BlotatoClient {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        api_key: Option<String>,
        configured_accounts: Vec<Destination>,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key: api_key.map(Secret::new),
            configured_accounts,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// List LinkedIn destinations. A configured static list wins and makes
    /// no network call; otherwise the partner accounts are queried and
    /// filtered by platform. No API key at all is a valid silent state.
    pub async fn list_accounts(&self) -> Result<Vec<Destination>, ApiError> {
        if !self.configured_accounts.is_empty() {
            return Ok(self.configured_accounts.clone());
        }

        let Some(api_key) = &self.api_key else {
            return Ok(vec![]);
        };

        let url = format!("{}/v2/users/me/accounts", self.base_url);
        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, api_key.expose_secret())
            .send()
            .await
            .map_err(|e| ApiError::UpstreamCall(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::UpstreamCall(format!(
                "account listing returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::UpstreamCall(e.to_string()))?;

        let accounts = body["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item["platform"].as_str() == Some("linkedin"))
                    .map(|item| Destination {
                        id: item["id"].as_str().unwrap_or_default().to_string(),
                        name: item["name"].as_str().unwrap_or_default().to_string(),
                        access_token: None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(accounts)
    }

    /// Step one: host the image with the provider, yielding a media URL the
    /// post step can reference. Uploaded bytes travel as a data URL.
    async fn upload_media(
        &self,
        api_key: &str,
        image: &ImageSource,
    ) -> Result<String, (u16, serde_json::Value)> {
        let url = format!("{}/v2/media", self.base_url);

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&json!({ "url": image.as_url() }))
            .send()
            .await
            .map_err(|e| (0, json!({ "step": "media", "error": e.to_string() })))?;

        let status = response.status().as_u16();
        let body = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or_else(|e| json!({ "error": e.to_string() }));

        if !(200..300).contains(&status) {
            return Err((status, json!({ "step": "media", "detail": body })));
        }

        match body["url"].as_str() {
            Some(hosted) => Ok(hosted.to_string()),
            None => Err((
                status,
                json!({ "step": "media", "error": "no hosted url in response" }),
            )),
        }
    }

    /// Step two: create the post against the account (and optional sub-page)
    /// encoded in the composite destination id.
    async fn create_post(
        &self,
        api_key: &str,
        destination_id: &str,
        caption: &str,
        media_url: &str,
    ) -> (u16, serde_json::Value) {
        let (account_id, page_id) = split_destination_id(destination_id);

        let mut target = json!({ "targetType": "linkedin" });
        if let Some(page_id) = page_id {
            target["pageId"] = json!(page_id);
        }

        let url = format!("{}/v2/posts", self.base_url);
        let request = self.http.post(&url).header(API_KEY_HEADER, api_key).json(&json!({
            "post": {
                "accountId": account_id,
                "target": target,
                "content": {
                    "platform": "linkedin",
                    "text": caption,
                    "mediaUrls": [media_url],
                },
            },
        }));

        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response
                    .json::<serde_json::Value>()
                    .await
                    .unwrap_or_else(|e| json!({ "error": e.to_string() }));
                (status, body)
            }
            Err(e) => (0, json!({ "step": "post", "error": e.to_string() })),
        }
    }
}

#[async_trait::async_trait]
impl Publisher for BlotatoClient {
    /// Two-step publish: media upload, then post creation. A failed upload
    /// terminates this destination — the post step is never attempted — and
    /// its detail lands in the result.
    async fn publish(
        &self,
        destination_id: &str,
        caption: &str,
        image: &ImageSource,
    ) -> PublishResult {
        let Some(api_key) = &self.api_key else {
            // Handlers fail fast before the batch; this is a backstop.
            return PublishResult {
                destination_id: destination_id.to_string(),
                status: 0,
                response: json!({ "error": "BLOTATO_API_KEY is not configured" }),
            };
        };
        let api_key = api_key.expose_secret().clone();

        let media_url = match self.upload_media(&api_key, image).await {
            Ok(media_url) => media_url,
            Err((status, detail)) => {
                return PublishResult {
                    destination_id: destination_id.to_string(),
                    status,
                    response: detail,
                };
            }
        };

        let (status, response) = self
            .create_post(&api_key, destination_id, caption, &media_url)
            .await;

        PublishResult {
            destination_id: destination_id.to_string(),
            status,
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn composite_id_splits_into_account_and_page() {
        assert_eq!(
            split_destination_id("3936:104013486"),
            ("3936", Some("104013486"))
        );
    }

    #[test]
    fn bare_id_has_no_page() {
        assert_eq!(split_destination_id("3936"), ("3936", None));
    }

    #[tokio::test]
    async fn static_account_list_needs_no_network_call() {
        let accounts = vec![Destination {
            id: "3936:104013486".to_string(),
            name: "Company page".to_string(),
            access_token: None,
        }];
        // Base URL that would fail instantly if anything tried to reach it.
        let client = BlotatoClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1".to_string(),
            None,
            accounts.clone(),
        );

        assert_eq!(client.list_accounts().await.unwrap(), accounts);
    }

    #[tokio::test]
    async fn no_key_and_no_accounts_is_a_silent_empty_state() {
        let client = BlotatoClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1".to_string(),
            None,
            vec![],
        );

        assert_eq!(client.list_accounts().await.unwrap(), vec![]);
    }
}
