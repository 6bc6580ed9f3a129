//! `TripCraft` - AI-assisted trip planning
//!
//! A three-step web wizard collects destination, budget and travel
//! preferences, then asks a chat-completion service for a day-by-day
//! itinerary.

pub mod api;
pub mod assistant;
pub mod completion;
pub mod config;
pub mod error;
pub mod itinerary;
pub mod models;
pub mod prompts;
pub mod session;
pub mod telemetry;
pub mod web;
pub mod wizard;

// Re-export core types for public API
pub use assistant::Assistant;
pub use completion::{ChatRequest, CompletionError, CompletionService, OpenAiClient};
pub use config::TripCraftConfig;
pub use error::TripCraftError;
pub use itinerary::ItineraryPlanner;
pub use models::{Budget, TripRequest};
pub use session::SessionStore;
pub use web::AppState;
pub use wizard::{BasicsForm, PlannerSession, RefinementsForm, Step};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripCraftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
