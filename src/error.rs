//! Error types and handling for the `TripCraft` application

use thiserror::Error;

use crate::completion::CompletionError;

/// Main error type for the `TripCraft` application
#[derive(Error, Debug)]
pub enum TripCraftError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Form input rejected by a wizard guard
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A step was submitted while the wizard was on a different step
    #[error("Cannot {action} while {current}")]
    Transition {
        action: &'static str,
        current: &'static str,
    },

    /// Completion service failures
    #[error("Completion service error: {source}")]
    Completion {
        #[from]
        source: CompletionError,
    },

    /// Prompt or page template errors
    #[error("Template error: {message}")]
    Template { message: String },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripCraftError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(message: S) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripCraftError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TripCraftError::Validation { message } => message.clone(),
            TripCraftError::Transition { .. } => {
                "That step is not active anymore. Please continue from the current step."
                    .to_string()
            }
            TripCraftError::Completion { source } => source.user_message(),
            TripCraftError::Template { .. } => {
                "Something went wrong while preparing your plan.".to_string()
            }
            TripCraftError::General { message } => message.clone(),
        }
    }
}

impl From<handlebars::RenderError> for TripCraftError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::template(err.to_string())
    }
}
