use std::time::Duration;

use social_api::blotato::BlotatoClient;
use social_api::content::ContentGenerator;
use social_api::facebook::FacebookClient;
use social_api::state::AppState;
use social_api::token::TokenStore;

#[tokio::main]
async fn main() -> Result<(), axum::BoxError> {
    let http = reqwest::Client::builder()
        .user_agent("megaphone-social-api/0.1")
        .build()
        .expect("failed to build HTTP client");

    // Generation calls (transcription, chat, image) run far longer than the
    // provider calls, so they get their own client with a generous timeout.
    let generation_timeout: u64 = dotenvy::var("GENERATION_TIMEOUT_SECS")
        .unwrap_or_else(|_| "120".to_string())
        .parse()
        .expect("GENERATION_TIMEOUT_SECS is not a number");
    let generation_http = reqwest::Client::builder()
        .user_agent("megaphone-social-api/0.1")
        .timeout(Duration::from_secs(generation_timeout))
        .build()
        .expect("failed to build generation HTTP client");

    let openai_key_path = dotenvy::var("OPENAI_KEY_PATH").expect("OPENAI_KEY_PATH not set");
    let openai_key = std::fs::read_to_string(&openai_key_path)
        .expect("failed to read OpenAI key file")
        .trim()
        .to_string();

    let generator = ContentGenerator::new(
        generation_http,
        dotenvy::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
        openai_key,
        dotenvy::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
        dotenvy::var("OPENAI_IMAGE_MODEL").unwrap_or_else(|_| "dall-e-3".to_string()),
    );

    let data_dir = dotenvy::var("DATA_DIR").expect("DATA_DIR not set");
    let store = TokenStore::new(&data_dir, dotenvy::var("FACEBOOK_TOKEN").ok());

    let facebook = FacebookClient::new(
        http.clone(),
        dotenvy::var("FACEBOOK_GRAPH_BASE_URL")
            .unwrap_or_else(|_| "https://graph.facebook.com".to_string()),
        dotenvy::var("FACEBOOK_GRAPH_VERSION").unwrap_or_else(|_| "v22.0".to_string()),
        dotenvy::var("FACEBOOK_APP_ID").ok(),
        dotenvy::var("FACEBOOK_APP_SECRET").ok(),
        store,
    );

    let configured_accounts = match dotenvy::var("BLOTATO_ACCOUNTS") {
        Ok(raw) => serde_json::from_str(&raw).expect("BLOTATO_ACCOUNTS is not valid JSON"),
        Err(_) => vec![],
    };
    let blotato = BlotatoClient::new(
        http,
        dotenvy::var("BLOTATO_BASE_URL")
            .unwrap_or_else(|_| "https://backend.blotato.com".to_string()),
        dotenvy::var("BLOTATO_API_KEY").ok(),
        configured_accounts,
    );

    let pool = mp_api_lib::db::create_pool().await;

    let state = AppState::new(facebook, blotato, generator, pool);

    mp_api_lib::run(state, social_api::routes::routes).await
}
