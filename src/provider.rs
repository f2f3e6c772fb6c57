use crate::config::Config;
use crate::error::TranslationError;
use crate::logging::truncate;
use async_trait::async_trait;
use serde_json::Value;

/// Longest slice of a provider error body carried into the error message
const MAX_ERROR_BODY: usize = 512;

/// Something that turns text in one language into text in another
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError>;
}

/// Client for the public `translate_a/single` endpoint
#[derive(Debug, Clone)]
pub struct GoogleTranslateClient {
    client: reqwest::Client,
    api_url: String,
}

impl GoogleTranslateClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.translate_timeout)
            .build()?;

        Ok(Self::with_client(client, &config.translate_api_url))
    }

    pub fn with_client(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(TranslationError::new)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TranslationError::new(format!(
                "provider returned {}: {}",
                status,
                truncate(&body, MAX_ERROR_BODY)
            )));
        }

        let body = response.text().await.map_err(TranslationError::new)?;
        extract_translated_text(&body)
    }
}

/// Pull the translated string out of `body[0][0][0]`
pub fn extract_translated_text(body: &str) -> Result<String, TranslationError> {
    let root: Value = serde_json::from_str(body).map_err(TranslationError::new)?;

    root.get(0)
        .and_then(|sentences| sentences.get(0))
        .and_then(|sentence| sentence.get(0))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TranslationError::new("unexpected response shape, no text at [0][0][0]"))
}
