//! Itinerary requester
//!
//! Serializes the trip request, sends it with the itinerary instructions and
//! hands back whatever text the completion service produced.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::Result;
use crate::completion::{ChatRequest, CompletionService};
use crate::models::TripRequest;
use crate::prompts::PromptLibrary;

/// Turns a completed trip request into itinerary text
#[derive(Clone)]
pub struct ItineraryPlanner {
    prompts: Arc<PromptLibrary>,
    completion: Arc<dyn CompletionService>,
}

impl ItineraryPlanner {
    pub fn new(prompts: Arc<PromptLibrary>, completion: Arc<dyn CompletionService>) -> Self {
        Self {
            prompts,
            completion,
        }
    }

    /// The exact messages that would be sent for this trip
    pub fn build_request(&self, trip: &TripRequest) -> Result<ChatRequest> {
        let instructions = self.prompts.itinerary(trip)?;
        Ok(ChatRequest::new(instructions, trip.to_request_block()))
    }

    /// Request an itinerary; the returned text is not inspected
    #[instrument(skip(self, trip), fields(destination = %trip.destination, days = trip.duration_days))]
    pub async fn generate(&self, trip: &TripRequest) -> Result<String> {
        let request = self.build_request(trip)?;
        match self.completion.complete(request).await {
            Ok(itinerary) => {
                info!("Itinerary generated");
                Ok(itinerary)
            }
            Err(e) => {
                error!("Itinerary request failed: {}", e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TripCraftError;
    use crate::completion::Role;
    use crate::completion::testing::ScriptedCompletion;
    use crate::models::{Accommodation, Budget, Interest, Mobility, Purpose};

    fn paris() -> TripRequest {
        TripRequest {
            destination: "Paris, France".to_string(),
            duration_days: 5,
            budget: Budget::Range("$800-$1200 USD".to_string()),
            purpose: Purpose::Relaxation,
            preferences: vec![Interest::Food, Interest::History],
            dietary: "Vegetarian".to_string(),
            mobility: Mobility::NoRestrictions,
            accommodation: Accommodation::MidRangeHotel,
        }
    }

    fn planner(completion: Arc<ScriptedCompletion>) -> ItineraryPlanner {
        ItineraryPlanner::new(Arc::new(PromptLibrary::new().unwrap()), completion)
    }

    #[tokio::test]
    async fn test_generate_sends_every_field_verbatim() {
        let completion = Arc::new(ScriptedCompletion::replying("## Day 1\nLouvre"));
        let planner = planner(completion.clone());

        let itinerary = planner.generate(&paris()).await.unwrap();
        assert_eq!(itinerary, "## Day 1\nLouvre");

        let request = completion.last_request().unwrap();
        let user = request.content_of(Role::User).unwrap();
        for expected in [
            "Destination: Paris, France",
            "Duration: 5 days",
            "Budget: $800-$1200 USD",
            "Purpose: 🏖️ Relaxation",
            "Preferences: 🍴 Food, 🏛️ History",
            "Dietary: Vegetarian",
            "Mobility: 🚶 No restrictions",
            "Accommodation: 🏩 Mid-range Hotel",
        ] {
            assert!(user.contains(expected), "missing {expected:?} in {user}");
        }

        let system = request.content_of(Role::System).unwrap();
        assert!(system.starts_with("Create a detailed 5-day itinerary for Paris, France"));
    }

    #[tokio::test]
    async fn test_generate_surfaces_failures() {
        let completion = Arc::new(ScriptedCompletion::failing(500));
        let planner = planner(completion.clone());

        let err = planner.generate(&paris()).await.unwrap_err();
        assert!(matches!(err, TripCraftError::Completion { .. }));
        assert_eq!(completion.calls(), 1);
    }
}
