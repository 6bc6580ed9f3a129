//! Instruction templates for the completion service
//!
//! Templates are embedded at compile time and rendered with handlebars.
//! Escaping is disabled: the output is plain text for the model, not HTML.

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use crate::models::{Choice, TripRequest};
use crate::{Result, TripCraftError};

const INITIAL: &str = include_str!("initial.hbs");
const REFINE: &str = include_str!("refine.hbs");
const ITINERARY: &str = include_str!("itinerary.hbs");

/// Which instruction to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Conversational opener asking for the basic trip details
    Initial,
    /// Clarifying questions after the basics are known
    Refine,
    /// Final day-by-day itinerary instructions
    Itinerary,
}

impl PromptKind {
    pub const ALL: [PromptKind; 3] = [PromptKind::Initial, PromptKind::Refine, PromptKind::Itinerary];

    /// Registered template name
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Refine => "refine",
            Self::Itinerary => "itinerary",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            Self::Initial => INITIAL,
            Self::Refine => REFINE,
            Self::Itinerary => ITINERARY,
        }
    }
}

/// Values substituted into the itinerary instructions
#[derive(Debug, Clone, Serialize)]
pub struct ItineraryContext {
    pub destination: String,
    pub duration: u32,
    pub dietary_preferences: String,
    pub accommodation_type: String,
}

impl From<&TripRequest> for ItineraryContext {
    fn from(trip: &TripRequest) -> Self {
        let dietary = trip.dietary.trim();
        Self {
            destination: trip.destination.trim().to_string(),
            duration: trip.duration_days,
            dietary_preferences: if dietary.is_empty() {
                "no specific dietary preferences".to_string()
            } else {
                dietary.to_string()
            },
            accommodation_type: trip.accommodation.label().to_string(),
        }
    }
}

/// Registry of the embedded instruction templates
pub struct PromptLibrary {
    hbs: Handlebars<'static>,
}

impl PromptLibrary {
    pub fn new() -> Result<Self> {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(handlebars::no_escape);

        for kind in PromptKind::ALL {
            hbs.register_template_string(kind.template_name(), kind.source())
                .map_err(|e| {
                    TripCraftError::template(format!(
                        "Failed to register prompt '{}': {e}",
                        kind.template_name()
                    ))
                })?;
        }

        Ok(Self { hbs })
    }

    /// Render the conversational opener
    pub fn initial(&self) -> Result<String> {
        self.render(PromptKind::Initial, &serde_json::json!({}))
    }

    /// Render the clarifying-questions instructions
    pub fn refine(&self) -> Result<String> {
        self.render(PromptKind::Refine, &serde_json::json!({}))
    }

    /// Render the itinerary instructions for a trip
    pub fn itinerary(&self, trip: &TripRequest) -> Result<String> {
        self.render(PromptKind::Itinerary, &ItineraryContext::from(trip))
    }

    fn render<T: Serialize>(&self, kind: PromptKind, context: &T) -> Result<String> {
        debug!("Rendering prompt '{}'", kind.template_name());
        let rendered = self.hbs.render(kind.template_name(), context)?;
        Ok(rendered.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Accommodation, Budget};

    fn trip() -> TripRequest {
        TripRequest {
            destination: "Kyoto, Japan".to_string(),
            duration_days: 4,
            budget: Budget::Range("$2000".to_string()),
            dietary: "Gluten-free".to_string(),
            accommodation: Accommodation::LuxuryResort,
            ..TripRequest::default()
        }
    }

    #[test]
    fn test_itinerary_prompt_fills_placeholders() {
        let library = PromptLibrary::new().unwrap();
        let prompt = library.itinerary(&trip()).unwrap();
        assert!(prompt.starts_with("Create a detailed 4-day itinerary for Kyoto, Japan:"));
        assert!(prompt.contains("Day 1 to Day 4"));
        assert!(prompt.contains("(consider Gluten-free)"));
        assert!(prompt.contains("(🏰 Luxury Resort)"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_itinerary_prompt_without_dietary_notes() {
        let library = PromptLibrary::new().unwrap();
        let mut trip = trip();
        trip.dietary = "  ".to_string();
        let prompt = library.itinerary(&trip).unwrap();
        assert!(prompt.contains("(consider no specific dietary preferences)"));
    }

    #[test]
    fn test_prompt_text_is_not_html_escaped() {
        let library = PromptLibrary::new().unwrap();
        let mut trip = trip();
        trip.destination = "Trinidad & Tobago".to_string();
        let prompt = library.itinerary(&trip).unwrap();
        assert!(prompt.contains("Trinidad & Tobago"));

        let refine = library.refine().unwrap();
        assert!(refine.contains("\"moderate,\""));
    }

    #[test]
    fn test_static_prompts() {
        let library = PromptLibrary::new().unwrap();
        assert!(library.initial().unwrap().starts_with("You are a friendly AI travel planner."));
        assert!(library.refine().unwrap().contains("clarifying questions"));
    }
}
