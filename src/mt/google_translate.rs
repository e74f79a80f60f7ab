//! Google Translate API provider for machine translation
//!
//! This module integrates with the Google Cloud Translation API v2.
//!
//! # Authentication
//!
//! Requests carry an OAuth bearer token obtained from a
//! [`CredentialProvider`], by default
//! `gcloud auth application-default print-access-token`.
//!
//! # Wire format
//!
//! ```text
//! POST https://translation.googleapis.com/language/translate/v2
//! Authorization: Bearer <token>
//! {"q": "...", "source": "en", "target": "fr", "format": "text"}
//!
//! 200 {"data": {"translations": [{"translatedText": "..."}]}}
//! 4xx {"error": {"code": 403, "message": "...", "errors": [{"message": "..."}]}}
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tracing::debug;

use crate::mt::credentials::CredentialProvider;
use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, validate_locale};

/// Translation API v2 endpoint
pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Request timeout used when no configuration says otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Translate API v2 provider
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    /// Where bearer tokens come from
    credentials: Arc<dyn CredentialProvider>,
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Base URL for Google Translate API
    base_url: String,
}

impl GoogleTranslateProvider {
    /// Create a provider for the public endpoint with the default timeout
    ///
    /// # Example
    ///
    /// ```ignore
    /// let provider = GoogleTranslateProvider::new(Arc::new(CommandTokenProvider::gcloud()))?;
    /// ```
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> MtResult<Self> {
        Self::with_options(credentials, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT)
    }

    /// Create a provider for a specific endpoint and request timeout
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError::ConfigError)` - If the endpoint is empty
    /// * `Err(MtError::TransportError)` - If the HTTP client cannot be built
    pub fn with_options(
        credentials: Arc<dyn CredentialProvider>,
        endpoint: &str,
        timeout: Duration,
    ) -> MtResult<Self> {
        if endpoint.trim().is_empty() {
            return Err(MtError::ConfigError("Endpoint cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                MtError::TransportError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            credentials,
            client,
            base_url: endpoint.to_string(),
        })
    }

    /// JSON body of a translation request
    fn request_body(text: &str, source_locale: &str, target_locale: &str) -> Value {
        json!({
            "q": text,
            "source": source_locale,
            "target": target_locale,
            "format": "text"
        })
    }

    /// Extract `data.translations[0].translatedText` from a success body
    fn parse_success(json: &Value) -> MtResult<String> {
        json["data"]["translations"][0]["translatedText"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                MtError::ResponseError(
                    "missing 'data.translations[0].translatedText'".to_string(),
                )
            })
    }

    /// Build a `RemoteError` from a failure status and body
    ///
    /// Prefers `error.code` and `error.errors[0].message`, then
    /// `error.message`, then the HTTP status itself.
    fn parse_failure(status: StatusCode, body: &str) -> MtError {
        let json: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let error = &json["error"];

        let code = error["code"]
            .as_i64()
            .unwrap_or_else(|| i64::from(status.as_u16()));
        let message = error["errors"][0]["message"]
            .as_str()
            .or_else(|| error["message"].as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| {
                let body = body.trim();
                if body.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                } else {
                    body.to_string()
                }
            });

        MtError::RemoteError { code, message }
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("credentials", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }

        let token = self.credentials.bearer_token().await?;
        let body = Self::request_body(text, source_locale, target_locale);

        debug!(url = %self.base_url, source = source_locale, target = target_locale, "POST");
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, "translation response");

        if !status.is_success() {
            let error_text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    debug!(error = %e, "could not read error body");
                    String::new()
                }
            };
            return Err(Self::parse_failure(status, &error_text));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| MtError::ResponseError(format!("body is not JSON: {}", e)))?;

        Self::parse_success(&json)
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}
