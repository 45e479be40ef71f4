use openai_dive::v1::api::Client;
use openai_dive::v1::resources::chat::{
    ChatCompletionParametersBuilder, ChatMessage, ChatMessageContent,
};
use redact::Secret;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use types::ContentArtifact;

use crate::error::ApiError;

const SYSTEM_INSTRUCTION: &str = "You are an AI social media content creator. \
Your task is to create engaging and SEO-optimized social media content (200-500 characters) \
and generate a detailed image prompt. \
Respond ONLY with a JSON object like {\"content\": \"...\", \"image_prompt\": \"...\"}. \
No explanation. No extra text.";

/// The one user-supplied seed a generation starts from.
#[derive(Debug)]
pub enum Seed {
    Text(String),
    Audio { bytes: Vec<u8>, filename: String },
}

/// The structured payload expected inside the chat response.
#[derive(Debug, PartialEq, Deserialize)]
pub struct GeneratedCopy {
    pub content: String,
    pub image_prompt: String,
}

/// Orchestrates transcription (optional), copy generation, and image
/// generation into one artifact. No retries live here: any upstream failure
/// propagates directly and the artifact is all-or-nothing.
#[derive(Clone, Debug)]
pub struct ContentGenerator {
    http: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
    chat_model: String,
    image_model: String,
}

impl ContentGenerator {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        api_key: String,
        chat_model: String,
        image_model: String,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key: Secret::new(api_key),
            chat_model,
            image_model,
        }
    }

    pub async fn generate(&self, seed: Seed) -> Result<ContentArtifact, ApiError> {
        let text = match seed {
            Seed::Text(text) => text,
            Seed::Audio { bytes, filename } => self.transcribe(bytes, filename).await?,
        };

        let copy = self.generate_copy(&text).await?;
        let image_url = self.generate_image(&copy.image_prompt).await?;

        Ok(ContentArtifact {
            content: copy.content,
            image_url,
        })
    }

    /// Whisper transcription of an uploaded audio file. Failure propagates
    /// as a generation failure; there is no text fallback.
    async fn transcribe(&self, bytes: Vec<u8>, filename: String) -> Result<String, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename);
        let form = reqwest::multipart::Form::new()
            .text("model", "whisper-1")
            .text("response_format", "text")
            .part("file", part);

        let response = self
            .http
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::UpstreamCall(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::UpstreamCall(format!(
                "transcription returned {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ApiError::UpstreamCall(e.to_string()))
    }

    async fn generate_copy(&self, text: &str) -> Result<GeneratedCopy, ApiError> {
        // The SDK client must share the configured endpoint and the
        // long-timeout HTTP client with the other generation calls.
        let mut client = Client::new(self.api_key.expose_secret().clone());
        client.http_client = self.http.clone();
        client.base_url = self.base_url.clone();

        let parameters = ChatCompletionParametersBuilder::default()
            .model(self.chat_model.clone())
            .messages(vec![
                ChatMessage::System {
                    name: None,
                    content: ChatMessageContent::Text(SYSTEM_INSTRUCTION.to_string()),
                },
                ChatMessage::User {
                    name: None,
                    content: ChatMessageContent::Text(text.to_string()),
                },
            ])
            .build()
            .map_err(|e| ApiError::UpstreamCall(e.to_string()))?;

        let response = client
            .chat()
            .create(parameters)
            .await
            .map_err(|e| ApiError::UpstreamCall(e.to_string()))?;

        let raw = match response.choices.first().map(|choice| &choice.message) {
            Some(ChatMessage::Assistant {
                content: Some(ChatMessageContent::Text(text)),
                ..
            }) => text.clone(),
            _ => {
                return Err(ApiError::UpstreamParsing(
                    "chat response had no text content".to_string(),
                ))
            }
        };

        extract_json_block(&raw)
    }

    /// One image from the generated prompt. The result is a remote URL, or
    /// an inline payload wrapped as a data URL — opaque either way.
    async fn generate_image(&self, prompt: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({
                "model": self.image_model,
                "prompt": prompt,
                "n": 1,
                "size": "1024x1024",
            }))
            .send()
            .await
            .map_err(|e| ApiError::UpstreamCall(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::UpstreamCall(format!(
                "image generation returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::UpstreamCall(e.to_string()))?;

        let image = &body["data"][0];

        if let Some(url) = image["url"].as_str() {
            return Ok(url.to_string());
        }

        if let Some(b64) = image["b64_json"].as_str() {
            return Ok(format!("data:image/png;base64,{b64}"));
        }

        Err(ApiError::UpstreamParsing(
            "image response had neither url nor b64_json".to_string(),
        ))
    }
}

/// Pull the first JSON object out of free-form model output.
///
/// Greedy brace-to-brace match across newlines. Best effort: when the
/// surrounding prose itself contains braces, the first greedy match wins,
/// which may capture malformed JSON — that surfaces as a parsing error with
/// the underlying cause.
pub fn extract_json_block(text: &str) -> Result<GeneratedCopy, ApiError> {
    let pattern = Regex::new(r"(?s)\{.*\}").expect("invalid JSON block pattern");

    let Some(found) = pattern.find(text) else {
        return Err(ApiError::UpstreamParsing(
            "no JSON object found in model response".to_string(),
        ));
    };

    serde_json::from_str(found.as_str()).map_err(|e| ApiError::UpstreamParsing(e.to_string()))
}
