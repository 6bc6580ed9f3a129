//! The trip request record collected by the wizard

use serde::{Deserialize, Serialize};
use std::fmt;

use super::options::{Accommodation, BudgetTier, Choice, Interest, Mobility, Purpose};

/// Duration used when the traveller has not chosen one
pub const DEFAULT_DURATION_DAYS: u32 = 5;

/// Budget as chosen on step 1, possibly refined into a concrete range on step 2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Budget {
    Tier(BudgetTier),
    Range(String),
}

impl Budget {
    /// Tier this budget was chosen from, if it has not been refined
    #[must_use]
    pub fn tier(&self) -> Option<BudgetTier> {
        match self {
            Budget::Tier(tier) => Some(*tier),
            Budget::Range(_) => None,
        }
    }

    /// Only a moderate budget is asked for a concrete range
    #[must_use]
    pub fn needs_range(&self) -> bool {
        self.tier() == Some(BudgetTier::Moderate)
    }
}

impl Default for Budget {
    fn default() -> Self {
        Budget::Tier(BudgetTier::Moderate)
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Budget::Tier(tier) => f.write_str(tier.label()),
            Budget::Range(range) => f.write_str(range),
        }
    }
}

/// Everything the traveller told us about the trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub destination: String,
    pub duration_days: u32,
    pub budget: Budget,
    pub purpose: Purpose,
    pub preferences: Vec<Interest>,
    pub dietary: String,
    pub mobility: Mobility,
    pub accommodation: Accommodation,
}

impl Default for TripRequest {
    fn default() -> Self {
        Self {
            destination: String::new(),
            duration_days: DEFAULT_DURATION_DAYS,
            budget: Budget::default(),
            purpose: Purpose::Relaxation,
            preferences: Vec::new(),
            dietary: String::new(),
            mobility: Mobility::NoRestrictions,
            accommodation: Accommodation::MidRangeHotel,
        }
    }
}

impl TripRequest {
    /// Set the trip length; zero is raised to one day
    pub fn set_duration(&mut self, days: u32) {
        self.duration_days = days.max(1);
    }

    /// Replace the interests, dropping repeated tags but keeping selection order
    pub fn set_preferences<I>(&mut self, interests: I)
    where
        I: IntoIterator<Item = Interest>,
    {
        self.preferences.clear();
        for interest in interests {
            if !self.preferences.contains(&interest) {
                self.preferences.push(interest);
            }
        }
    }

    /// Comma separated interest labels
    #[must_use]
    pub fn preferences_label(&self) -> String {
        self.preferences
            .iter()
            .map(|interest| interest.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Plain-text block handed to the completion service as the user message
    #[must_use]
    pub fn to_request_block(&self) -> String {
        format!(
            "Destination: {}\n\
             Duration: {} days\n\
             Budget: {}\n\
             Purpose: {}\n\
             Preferences: {}\n\
             Dietary: {}\n\
             Mobility: {}\n\
             Accommodation: {}\n",
            self.destination,
            self.duration_days,
            self.budget,
            self.purpose,
            self.preferences_label(),
            self.dietary,
            self.mobility,
            self.accommodation,
        )
    }
}
