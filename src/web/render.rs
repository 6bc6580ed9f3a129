//! Server-side rendering of the wizard pages
//!
//! Page templates use handlebars' default HTML escaping, so itinerary text and
//! user input are shown verbatim without being interpreted as markup.

use handlebars::Handlebars;
use serde::Serialize;

use crate::models::{
    Accommodation, BudgetTier, Choice, Interest, Mobility, Purpose, TripRequest,
};
use crate::wizard::{ItineraryState, PlannerSession, Step};
use crate::{Result, TripCraftError};

const LAYOUT: &str = include_str!("templates/layout.hbs");
const BASICS: &str = include_str!("templates/basics.hbs");
const REFINEMENTS: &str = include_str!("templates/refinements.hbs");
const ITINERARY: &str = include_str!("templates/itinerary.hbs");

#[derive(Serialize)]
struct OptionView {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

fn options<C: Choice>(is_selected: impl Fn(C) -> bool) -> Vec<OptionView> {
    C::ALL
        .iter()
        .map(|choice| OptionView {
            value: choice.slug(),
            label: choice.label(),
            selected: is_selected(*choice),
        })
        .collect()
}

#[derive(Serialize)]
struct BasicsView<'a> {
    error: Option<&'a str>,
    destination: &'a str,
    duration: u32,
    budgets: Vec<OptionView>,
    purposes: Vec<OptionView>,
    interests: Vec<OptionView>,
}

#[derive(Serialize)]
struct RefinementsView<'a> {
    needs_range: bool,
    dietary: &'a str,
    accommodations: Vec<OptionView>,
    mobilities: Vec<OptionView>,
}

#[derive(Serialize)]
struct SummaryItem {
    key: &'static str,
    value: String,
}

#[derive(Serialize)]
struct ItineraryView<'a> {
    summary: Vec<SummaryItem>,
    generating: bool,
    failure: Option<&'a str>,
    text: Option<&'a str>,
}

#[derive(Serialize)]
struct LayoutView {
    progress: u8,
    refresh: bool,
    body: String,
}

fn summary(trip: &TripRequest) -> Vec<SummaryItem> {
    vec![
        SummaryItem {
            key: "Destination",
            value: trip.destination.clone(),
        },
        SummaryItem {
            key: "Duration",
            value: format!("{} days", trip.duration_days),
        },
        SummaryItem {
            key: "Budget",
            value: trip.budget.to_string(),
        },
        SummaryItem {
            key: "Interests",
            value: trip.preferences_label(),
        },
    ]
}

/// Renders the page for whichever step a session is on
pub struct PageRenderer {
    hbs: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut hbs = Handlebars::new();
        for (name, source) in [
            ("layout", LAYOUT),
            ("basics", BASICS),
            ("refinements", REFINEMENTS),
            ("itinerary", ITINERARY),
        ] {
            hbs.register_template_string(name, source).map_err(|e| {
                TripCraftError::template(format!("Failed to register page '{name}': {e}"))
            })?;
        }
        Ok(Self { hbs })
    }

    /// Full HTML document for the session's current step
    pub fn page(&self, session: &PlannerSession) -> Result<String> {
        let trip = session.trip();
        let body = match session.step() {
            Step::CollectingBasics => {
                // A fresh form suggests two interests; after a rejected submit keep what was ticked
                let fresh = session.error().is_none() && trip.preferences.is_empty();
                let view = BasicsView {
                    error: session.error(),
                    destination: &trip.destination,
                    duration: trip.duration_days,
                    budgets: options::<BudgetTier>(|tier| trip.budget.tier() == Some(tier)),
                    purposes: options::<Purpose>(|purpose| trip.purpose == purpose),
                    interests: options::<Interest>(|interest| {
                        if fresh {
                            Interest::SUGGESTED.contains(&interest)
                        } else {
                            trip.preferences.contains(&interest)
                        }
                    }),
                };
                self.hbs.render("basics", &view)?
            }
            Step::CollectingRefinements => {
                let view = RefinementsView {
                    needs_range: trip.budget.needs_range(),
                    dietary: &trip.dietary,
                    accommodations: options::<Accommodation>(|a| trip.accommodation == a),
                    mobilities: options::<Mobility>(|m| trip.mobility == m),
                };
                self.hbs.render("refinements", &view)?
            }
            Step::PresentingItinerary => {
                let itinerary = session.itinerary();
                let view = ItineraryView {
                    summary: summary(trip),
                    generating: matches!(
                        itinerary,
                        ItineraryState::Pending | ItineraryState::Generating
                    ),
                    failure: match itinerary {
                        ItineraryState::Failed(message) => Some(message.as_str()),
                        _ => None,
                    },
                    text: match itinerary {
                        ItineraryState::Ready(text) => Some(text.as_str()),
                        _ => None,
                    },
                };
                self.hbs.render("itinerary", &view)?
            }
        };

        let layout = LayoutView {
            progress: session.progress(),
            refresh: matches!(session.itinerary(), ItineraryState::Generating),
            body,
        };
        Ok(self.hbs.render("layout", &layout)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{BasicsForm, RefinementsForm};

    fn renderer() -> PageRenderer {
        PageRenderer::new().unwrap()
    }

    fn basics(preferences: Vec<Interest>) -> BasicsForm {
        BasicsForm {
            destination: "Rome <Italy>".to_string(),
            duration_days: 3,
            budget: BudgetTier::Moderate,
            purpose: Purpose::Cultural,
            preferences,
        }
    }

    #[test]
    fn test_fresh_basics_page_suggests_interests() {
        let html = renderer().page(&PlannerSession::new()).unwrap();
        assert!(html.contains("Let's Start Planning!"));
        assert!(html.contains(r#"value="food" checked"#));
        assert!(html.contains(r#"value="history" checked"#));
        assert!(!html.contains(r#"value="art" checked"#));
        assert!(html.contains(r#"value="moderate" selected"#));
        assert!(html.contains("width: 33%"));
    }

    #[test]
    fn test_rejected_basics_page_shows_error_and_input() {
        let mut session = PlannerSession::new();
        session.submit_basics(basics(vec![Interest::Art])).unwrap_err();

        let html = renderer().page(&session).unwrap();
        assert!(html.contains("Please select at least 2 interests!"));
        assert!(html.contains("Rome &lt;Italy&gt;"));
        assert!(html.contains(r#"value="art" checked"#));
        assert!(!html.contains(r#"value="food" checked"#));
    }

    #[test]
    fn test_refinements_page_asks_range_only_for_moderate() {
        let mut session = PlannerSession::new();
        session
            .submit_basics(basics(vec![Interest::Art, Interest::Food]))
            .unwrap();
        let html = renderer().page(&session).unwrap();
        assert!(html.contains(r#"name="budget_range""#));
        assert!(html.contains("width: 66%"));

        let mut session = PlannerSession::new();
        let mut form = basics(vec![Interest::Art, Interest::Food]);
        form.budget = BudgetTier::Low;
        session.submit_basics(form).unwrap();
        let html = renderer().page(&session).unwrap();
        assert!(!html.contains(r#"name="budget_range""#));
    }

    #[test]
    fn test_itinerary_text_is_escaped_verbatim() {
        let mut session = PlannerSession::new();
        session
            .submit_basics(basics(vec![Interest::Art, Interest::Food]))
            .unwrap();
        session
            .submit_refinements(RefinementsForm {
                budget_range: None,
                accommodation: Accommodation::CentralLocation,
                mobility: Mobility::LimitedWalking,
                dietary: String::new(),
            })
            .unwrap();
        let (revision, _) = session.begin_itinerary().unwrap();
        session.record_itinerary(revision, Ok("**Day 1**\n<b>Colosseum</b>".to_string()));

        let html = renderer().page(&session).unwrap();
        assert!(html.contains("**Day 1**\n&lt;b&gt;Colosseum&lt;/b&gt;"));
        assert!(html.contains("Plan Another Trip"));
        assert!(html.contains("width: 100%"));
        assert!(!html.contains("http-equiv=\"refresh\""));
    }
}
