//! Gemini HTTP client.

use crate::error::{GeminiError, GeminiResult};
use crate::types::*;
use jee_config::GeminiConfig;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, info, warn};

const API_VERSION: &str = "v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
    temperature: Option<f32>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &GeminiConfig) -> GeminiResult<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(GeminiError::NotConfigured)?;

        let mut client = Self::new(&config.base_url, &config.model, api_key)?
            .with_timeout(Duration::from_secs(config.timeout_seconds))?;
        client.temperature = config.temperature;
        Ok(client)
    }

    /// Create a new client with default settings.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> GeminiResult<Self> {
        let timeout = Duration::from_secs(120);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GeminiError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: normalize_model(&model.into()),
            api_key: api_key.into(),
            timeout,
            temperature: None,
        })
    }

    fn with_timeout(mut self, timeout: Duration) -> GeminiResult<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GeminiError::Http)?;
        self.timeout = timeout;
        Ok(self)
    }

    /// The fully qualified model name, e.g. `models/gemini-1.5-pro`.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn model_url(&self) -> String {
        format!("{}/{}/{}", self.base_url, API_VERSION, self.model)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(API_KEY_HEADER, &self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> GeminiResult<Response> {
        let response = self.authorized(request).send().await.map_err(|e| {
            if e.is_connect() {
                GeminiError::Unreachable {
                    base_url: self.base_url.clone(),
                }
            } else if e.is_timeout() {
                GeminiError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            } else {
                GeminiError::Http(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        if status.as_u16() == 404 {
            return Err(GeminiError::ModelNotFound {
                model: self.model.clone(),
            });
        }

        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.error.message)
            .unwrap_or(text);
        warn!("Gemini returned {}: {}", status, message);

        Err(GeminiError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    /// Check that the key and model are accepted.
    pub async fn is_available(&self) -> bool {
        self.model_info().await.is_ok()
    }

    /// Fetch metadata for the configured model.
    pub async fn model_info(&self) -> GeminiResult<ModelInfo> {
        let url = self.model_url();
        debug!("Fetching model info from {}", url);
        let response = self.send(self.client.get(&url)).await?;
        Ok(response.json().await?)
    }

    /// Call `generateContent` (non-streaming).
    pub async fn generate(
        &self,
        request: GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        let url = format!("{}:generateContent", self.model_url());
        debug!("Generating with model {}", self.model);

        let mut request = request;
        if request.generation_config.is_none() {
            if let Some(temperature) = self.temperature {
                request.generation_config =
                    Some(GenerationConfig::new().with_temperature(temperature));
            }
        }

        let response = self.send(self.client.post(&url).json(&request)).await?;
        let body: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &body.usage_metadata {
            info!(
                "Generation finished ({} total tokens)",
                usage.total_token_count.unwrap_or(0)
            );
        }

        Ok(body)
    }

    /// Send a single prompt and return the trimmed reply text.
    pub async fn generate_text(&self, prompt: &str) -> GeminiResult<String> {
        let response = self
            .generate(GenerateContentRequest::from_prompt(prompt))
            .await?;

        match response.text() {
            Some(text) => Ok(text.trim().to_string()),
            None => match response.block_reason() {
                Some(reason) => Err(GeminiError::Blocked { reason }),
                None => Err(GeminiError::EmptyResponse),
            },
        }
    }
}

fn normalize_model(model: &str) -> String {
    let model = model.trim().trim_matches('/');
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}
