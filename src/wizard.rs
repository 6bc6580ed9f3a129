//! Step sequencer for the three-step planning wizard
//!
//! `CollectingBasics -> CollectingRefinements -> PresentingItinerary`, with a
//! guard on the first transition and a reset back to the start.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{Accommodation, Budget, BudgetTier, Interest, Mobility, Purpose, TripRequest};
use crate::{Result, TripCraftError};

/// Minimum number of interests required to leave the first step
pub const MIN_PREFERENCES: usize = 2;

/// Shown when the interest guard rejects the first step
pub const TOO_FEW_INTERESTS: &str = "Please select at least 2 interests!";

/// Which form stage is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    CollectingBasics,
    CollectingRefinements,
    PresentingItinerary,
}

impl Step {
    /// One-based step number
    pub fn number(self) -> u8 {
        match self {
            Step::CollectingBasics => 1,
            Step::CollectingRefinements => 2,
            Step::PresentingItinerary => 3,
        }
    }

    /// Progress bar percentage
    pub fn progress(self) -> u8 {
        match self {
            Step::CollectingBasics => 33,
            Step::CollectingRefinements => 66,
            Step::PresentingItinerary => 100,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Step::CollectingBasics => "collecting basics",
            Step::CollectingRefinements => "collecting refinements",
            Step::PresentingItinerary => "presenting the itinerary",
        }
    }
}

/// Answers from the first form
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BasicsForm {
    #[serde(default)]
    pub destination: String,
    #[serde(default = "default_duration")]
    pub duration_days: u32,
    pub budget: BudgetTier,
    pub purpose: Purpose,
    #[serde(default)]
    pub preferences: Vec<Interest>,
}

fn default_duration() -> u32 {
    crate::models::DEFAULT_DURATION_DAYS
}

/// Answers from the second form
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RefinementsForm {
    /// Only consulted when the budget tier is moderate
    #[serde(default)]
    pub budget_range: Option<String>,
    pub accommodation: Accommodation,
    pub mobility: Mobility,
    #[serde(default)]
    pub dietary: String,
}

/// Outcome of the itinerary call for the current trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "kebab-case")]
pub enum ItineraryState {
    /// Not requested yet
    Pending,
    /// A request is in flight
    Generating,
    /// Raw text returned by the completion service
    Ready(String),
    /// User-facing failure message; the traveller may try again
    Failed(String),
}

/// One traveller's progress through the wizard
#[derive(Debug, Clone, Serialize)]
pub struct PlannerSession {
    step: Step,
    trip: TripRequest,
    error: Option<String>,
    itinerary: ItineraryState,
    /// Bumped whenever the trip is discarded, so stale itinerary results can be dropped
    #[serde(skip)]
    revision: u64,
}

impl Default for PlannerSession {
    fn default() -> Self {
        Self {
            step: Step::CollectingBasics,
            trip: TripRequest::default(),
            error: None,
            itinerary: ItineraryState::Pending,
            revision: 0,
        }
    }
}

impl PlannerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn trip(&self) -> &TripRequest {
        &self.trip
    }

    /// Inline error from the last rejected submission
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn itinerary(&self) -> &ItineraryState {
        &self.itinerary
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn progress(&self) -> u8 {
        self.step.progress()
    }

    fn expect_step(&self, expected: Step, action: &'static str) -> Result<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(TripCraftError::Transition {
                action,
                current: self.step.describe(),
            })
        }
    }

    /// Record the first form and advance when at least two interests are chosen
    pub fn submit_basics(&mut self, form: BasicsForm) -> Result<()> {
        self.expect_step(Step::CollectingBasics, "submit trip basics")?;

        self.trip.destination = form.destination;
        self.trip.set_duration(form.duration_days);
        self.trip.budget = Budget::Tier(form.budget);
        self.trip.purpose = form.purpose;
        self.trip.set_preferences(form.preferences);

        if self.trip.preferences.len() < MIN_PREFERENCES {
            debug!(
                "Rejected basics with {} interest(s)",
                self.trip.preferences.len()
            );
            self.error = Some(TOO_FEW_INTERESTS.to_string());
            return Err(TripCraftError::validation(TOO_FEW_INTERESTS));
        }

        self.error = None;
        self.step = Step::CollectingRefinements;
        info!(destination = %self.trip.destination, "Trip basics collected");
        Ok(())
    }

    /// Record the second form; always advances
    ///
    /// A blank range box keeps the moderate tier label instead of sending an
    /// empty budget, and the range text is trimmed.
    pub fn submit_refinements(&mut self, form: RefinementsForm) -> Result<()> {
        self.expect_step(Step::CollectingRefinements, "submit refinements")?;

        if self.trip.budget.needs_range() {
            if let Some(range) = form.budget_range.filter(|range| !range.trim().is_empty()) {
                self.trip.budget = Budget::Range(range.trim().to_string());
            }
        }
        self.trip.accommodation = form.accommodation;
        self.trip.mobility = form.mobility;
        self.trip.dietary = form.dietary;

        self.error = None;
        self.itinerary = ItineraryState::Pending;
        self.step = Step::PresentingItinerary;
        info!("Trip refinements collected");
        Ok(())
    }

    /// True when step 3 is shown and no itinerary has been requested yet
    pub fn needs_itinerary(&self) -> bool {
        self.step == Step::PresentingItinerary && self.itinerary == ItineraryState::Pending
    }

    /// Claim the pending itinerary request, returning the trip to plan for
    pub fn begin_itinerary(&mut self) -> Option<(u64, TripRequest)> {
        if !self.needs_itinerary() {
            return None;
        }
        self.itinerary = ItineraryState::Generating;
        Some((self.revision, self.trip.clone()))
    }

    /// Store the completion outcome if it still belongs to this trip
    pub fn record_itinerary(
        &mut self,
        revision: u64,
        outcome: std::result::Result<String, &TripCraftError>,
    ) -> bool {
        if revision != self.revision || self.step != Step::PresentingItinerary {
            debug!("Discarding itinerary for a trip that was reset");
            return false;
        }
        self.itinerary = match outcome {
            Ok(text) => ItineraryState::Ready(text),
            Err(err) => ItineraryState::Failed(err.user_message()),
        };
        true
    }

    /// Allow another attempt after a failed itinerary call
    pub fn retry_itinerary(&mut self) -> Result<()> {
        self.expect_step(Step::PresentingItinerary, "retry the itinerary")?;
        if matches!(self.itinerary, ItineraryState::Failed(_)) {
            self.itinerary = ItineraryState::Pending;
        }
        Ok(())
    }

    /// "Plan Another Trip": back to step 1 with every field at its default
    pub fn reset(&mut self) {
        let revision = self.revision + 1;
        *self = Self {
            revision,
            ..Self::default()
        };
        info!("Planner reset");
    }
}
