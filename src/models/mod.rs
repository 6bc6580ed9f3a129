//! Data models for `TripCraft`
//!
//! - Options: the fixed choice lists shown on the forms
//! - Trip: the trip request record and its text serialization

pub mod options;
pub mod trip;

pub use options::{Accommodation, BudgetTier, Choice, Interest, Mobility, OptionEntry, Purpose};
pub use trip::{Budget, DEFAULT_DURATION_DAYS, TripRequest};
