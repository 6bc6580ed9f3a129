//! Completion service error types

use thiserror::Error;

/// Errors that can occur while talking to the completion service
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("No API key configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request failed: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response contained no itinerary text")]
    EmptyResponse,

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompletionError {
    /// Check if this is an authentication problem
    pub fn is_auth(&self) -> bool {
        match self {
            CompletionError::MissingApiKey => true,
            CompletionError::Api { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    /// Check if trying again later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            CompletionError::Api { status, .. } => *status == 429 || *status >= 500,
            CompletionError::Network(_) | CompletionError::Middleware(_) => true,
            CompletionError::EmptyResponse => true,
            CompletionError::MissingApiKey
            | CompletionError::InvalidResponse(_)
            | CompletionError::Json(_) => false,
        }
    }

    /// Message suitable for showing to the traveller
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_auth() {
            "The travel planner is missing a valid API key. Please check the server configuration."
                .to_string()
        } else if self.is_retryable() {
            "The travel planner is not reachable right now. Please try again in a moment."
                .to_string()
        } else {
            "The travel planner returned something we could not read. Please try again."
                .to_string()
        }
    }
}
