//! Fixed choice lists offered by the planner forms
//!
//! Every choice has a display label (shown to the traveller and sent to the
//! completion service verbatim) and an ASCII slug used in form values, JSON
//! and command-line arguments.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed set of labelled options
pub trait Choice: Copy + PartialEq + 'static {
    /// All options in display order
    const ALL: &'static [Self];

    /// Stable ASCII identifier
    fn slug(self) -> &'static str;

    /// Human readable label including its emoji
    fn label(self) -> &'static str;

    /// Parse either a slug or an exact label
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|choice| choice.slug().eq_ignore_ascii_case(input) || choice.label() == input)
    }
}

/// Budget range selected on the first step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetTier {
    Low,
    Moderate,
    High,
}

impl Choice for BudgetTier {
    const ALL: &'static [Self] = &[Self::Low, Self::Moderate, Self::High];

    fn slug(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Low => "💰 Low",
            Self::Moderate => "💰💰 Moderate",
            Self::High => "💰💰💰 High",
        }
    }
}

/// Why the traveller is going
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Purpose {
    Relaxation,
    Adventure,
    Cultural,
}

impl Choice for Purpose {
    const ALL: &'static [Self] = &[Self::Relaxation, Self::Adventure, Self::Cultural];

    fn slug(self) -> &'static str {
        match self {
            Self::Relaxation => "relaxation",
            Self::Adventure => "adventure",
            Self::Cultural => "cultural",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Relaxation => "🏖️ Relaxation",
            Self::Adventure => "🧗 Adventure",
            Self::Cultural => "🎭 Cultural",
        }
    }
}

/// Interest tags for the multi-select on the first step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interest {
    Food,
    History,
    Nature,
    Shopping,
    Art,
    Sports,
}

impl Interest {
    /// Pre-selected on a fresh form
    pub const SUGGESTED: [Interest; 2] = [Interest::Food, Interest::History];
}

impl Choice for Interest {
    const ALL: &'static [Self] = &[
        Self::Food,
        Self::History,
        Self::Nature,
        Self::Shopping,
        Self::Art,
        Self::Sports,
    ];

    fn slug(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::History => "history",
            Self::Nature => "nature",
            Self::Shopping => "shopping",
            Self::Art => "art",
            Self::Sports => "sports",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Food => "🍴 Food",
            Self::History => "🏛️ History",
            Self::Nature => "🌳 Nature",
            Self::Shopping => "🛍️ Shopping",
            Self::Art => "🎨 Art",
            Self::Sports => "⚽ Sports",
        }
    }
}

/// Mobility needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mobility {
    NoRestrictions,
    LimitedWalking,
    WheelchairAccessible,
}

impl Choice for Mobility {
    const ALL: &'static [Self] = &[
        Self::NoRestrictions,
        Self::LimitedWalking,
        Self::WheelchairAccessible,
    ];

    fn slug(self) -> &'static str {
        match self {
            Self::NoRestrictions => "no-restrictions",
            Self::LimitedWalking => "limited-walking",
            Self::WheelchairAccessible => "wheelchair-accessible",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::NoRestrictions => "🚶 No restrictions",
            Self::LimitedWalking => "🚶 Limited walking",
            Self::WheelchairAccessible => "♿ Wheelchair accessible",
        }
    }
}

/// Accommodation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accommodation {
    BudgetHostel,
    MidRangeHotel,
    LuxuryResort,
    CentralLocation,
}

impl Choice for Accommodation {
    const ALL: &'static [Self] = &[
        Self::BudgetHostel,
        Self::MidRangeHotel,
        Self::LuxuryResort,
        Self::CentralLocation,
    ];

    fn slug(self) -> &'static str {
        match self {
            Self::BudgetHostel => "budget-hostel",
            Self::MidRangeHotel => "mid-range-hotel",
            Self::LuxuryResort => "luxury-resort",
            Self::CentralLocation => "central-location",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::BudgetHostel => "🏠 Budget Hostel",
            Self::MidRangeHotel => "🏩 Mid-range Hotel",
            Self::LuxuryResort => "🏰 Luxury Resort",
            Self::CentralLocation => "📍 Central Location",
        }
    }
}

/// Accept a slug or a label, the same as form and command-line input
fn deserialize_choice<'de, C, D>(deserializer: D, name: &str) -> Result<C, D::Error>
where
    C: Choice,
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    C::parse(&raw).ok_or_else(|| {
        let accepted: Vec<&str> = C::ALL.iter().map(|choice| choice.slug()).collect();
        de::Error::custom(format!(
            "unknown {name} '{raw}', expected one of: {}",
            accepted.join(", ")
        ))
    })
}

macro_rules! choice_impls {
    ($($ty:ty => $name:literal),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    deserialize_choice(deserializer, $name)
                }
            }
        )*
    };
}

choice_impls!(
    BudgetTier => "budget",
    Purpose => "purpose",
    Interest => "interest",
    Mobility => "mobility",
    Accommodation => "accommodation"
);

/// Slug/label pair used to describe the choice lists to clients
#[derive(Debug, Clone, Serialize)]
pub struct OptionEntry {
    pub value: &'static str,
    pub label: &'static str,
}

/// Describe every option of a choice list
pub fn entries<C: Choice>() -> Vec<OptionEntry> {
    C::ALL
        .iter()
        .map(|choice| OptionEntry {
            value: choice.slug(),
            label: choice.label(),
        })
        .collect()
}
