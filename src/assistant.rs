//! Conversational helpers built on the interview and refinement prompts

use std::sync::Arc;

use tracing::instrument;

use crate::Result;
use crate::completion::{ChatRequest, CompletionService};
use crate::models::TripRequest;
use crate::prompts::PromptLibrary;

/// Greeting sent as the user turn when asking for an opening message
pub const OPENING_GREETING: &str = "Hi! I'd like some help planning a trip.";

/// Planner assistant for the optional conversational endpoints
#[derive(Clone)]
pub struct Assistant {
    prompts: Arc<PromptLibrary>,
    completion: Arc<dyn CompletionService>,
}

impl Assistant {
    pub fn new(prompts: Arc<PromptLibrary>, completion: Arc<dyn CompletionService>) -> Self {
        Self {
            prompts,
            completion,
        }
    }

    /// First interview question from the planner
    #[instrument(skip(self))]
    pub async fn opening_message(&self) -> Result<String> {
        let request = ChatRequest::new(self.prompts.initial()?, OPENING_GREETING);
        Ok(self.completion.complete(request).await?)
    }

    /// Follow-up questions based on what the traveller has entered so far
    #[instrument(skip(self, trip), fields(destination = %trip.destination))]
    pub async fn clarifying_questions(&self, trip: &TripRequest) -> Result<String> {
        let request = ChatRequest::new(self.prompts.refine()?, trip.to_request_block());
        Ok(self.completion.complete(request).await?)
    }
}
