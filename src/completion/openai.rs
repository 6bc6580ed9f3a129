//! OpenAI compatible `/chat/completions` client

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{ChatMessage, ChatRequest, CompletionError, CompletionService};
use crate::config::CompletionConfig;

/// Chat completion client with retry on transient failures
pub struct OpenAiClient {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    choices: Vec<ResponseChoice>,
}

#[derive(Debug, Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiClient {
    /// Build a client from configuration; a missing key is only reported on use
    pub fn from_config(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("TripCraft/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(500), Duration::from_secs(10))
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    #[instrument(skip(self, request), fields(model = %self.model, messages = request.messages.len()))]
    async fn complete(&self, request: ChatRequest) -> Result<String, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey)?;

        let body = serde_json::to_vec(&RequestBody {
            model: &self.model,
            messages: &request.messages,
        })?;

        debug!("Sending chat completion request to {}", self.endpoint());
        let start_time = Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            warn!("Completion request failed with {}: {}", status, message);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ResponseBody = serde_json::from_str(&text)
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        let elapsed = start_time.elapsed();
        info!(
            "Received {} characters from completion service in {:.3}s",
            content.chars().count(),
            elapsed.as_secs_f64()
        );
        if elapsed.as_secs() > 30 {
            warn!("Slow completion response: {:.3}s", elapsed.as_secs_f64());
        }

        Ok(content)
    }
}
