//! Chat completion client
//!
//! The planner sends one system instruction plus one user message per call and
//! reads back free-form text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod error;
mod openai;

pub use error::CompletionError;
pub use openai::OpenAiClient;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Messages sent in one completion call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Instruction plus user content, the only shape the planner uses
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
        }
    }

    /// Content of the first message with the given role
    #[must_use]
    pub fn content_of(&self, role: Role) -> Option<&str> {
        self.messages
            .iter()
            .find(|message| message.role == role)
            .map(|message| message.content.as_str())
    }
}

/// Anything that can turn a chat request into text
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Run one completion and return the assistant's text
    async fn complete(&self, request: ChatRequest) -> Result<String, CompletionError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Replies with canned text and records every request
    pub struct ScriptedCompletion {
        reply: Result<String, u16>,
        pub requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedCompletion {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn last_request(&self) -> Option<ChatRequest> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletion {
        async fn complete(&self, request: ChatRequest) -> Result<String, CompletionError> {
            self.requests.lock().unwrap().push(request);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(CompletionError::Api {
                    status: *status,
                    message: "scripted failure".to_string(),
                }),
            }
        }
    }
}
