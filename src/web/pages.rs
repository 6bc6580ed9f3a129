//! HTML handlers for the wizard
//!
//! Every POST redirects back to `/`, which renders whatever step the session
//! is on. The only exception is a rejected first step, which is re-rendered
//! directly with 422 so the inline error is shown.

use std::borrow::Cow;
use std::sync::Arc;

use axum::extract::{RawForm, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use tracing::{debug, error, warn};

use super::cookie::CurrentSession;
use super::{AppState, ensure_itinerary};
use crate::TripCraftError;
use crate::models::{Accommodation, BudgetTier, Choice, Interest, Mobility, Purpose};
use crate::wizard::{BasicsForm, RefinementsForm};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(show_step))
        .route("/basics", post(submit_basics))
        .route("/refinements", post(submit_refinements))
        .route("/itinerary/retry", post(retry_itinerary))
        .route("/reset", post(reset))
}

/// Decoded `application/x-www-form-urlencoded` body, keeping repeated keys
struct FormFields(Vec<(String, String)>);

impl FormFields {
    fn parse(body: &[u8]) -> Self {
        Self(
            url::form_urlencoded::parse(body)
                .map(|(key, value): (Cow<str>, Cow<str>)| (key.into_owned(), value.into_owned()))
                .collect(),
        )
    }

    fn first(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn text(&self, name: &str) -> String {
        self.first(name).unwrap_or_default().to_string()
    }

    fn choice<C: Choice>(&self, name: &str) -> Result<C, String> {
        let value = self.first(name).ok_or_else(|| format!("Missing field '{name}'"))?;
        C::parse(value).ok_or_else(|| format!("Unknown {name} '{value}'"))
    }
}

/// A form that could not have come from our own pages
fn bad_form(message: String) -> Response {
    warn!("Malformed form submission: {}", message);
    (StatusCode::BAD_REQUEST, message).into_response()
}

fn basics_from(fields: &FormFields) -> Result<BasicsForm, String> {
    let duration_days = match fields.first("duration_days").map(str::trim) {
        None | Some("") => crate::models::DEFAULT_DURATION_DAYS,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| format!("Trip duration must be a whole number of days, got '{raw}'"))?,
    };

    let preferences = fields
        .all("preferences")
        .map(|value| Interest::parse(value).ok_or_else(|| format!("Unknown interest '{value}'")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BasicsForm {
        destination: fields.text("destination"),
        duration_days,
        budget: fields.choice::<BudgetTier>("budget")?,
        purpose: fields.choice::<Purpose>("purpose")?,
        preferences,
    })
}

fn refinements_from(fields: &FormFields) -> Result<RefinementsForm, String> {
    Ok(RefinementsForm {
        budget_range: fields.first("budget_range").map(str::to_string),
        accommodation: fields.choice::<Accommodation>("accommodation")?,
        mobility: fields.choice::<Mobility>("mobility")?,
        dietary: fields.text("dietary"),
    })
}

fn internal_error(err: TripCraftError) -> Response {
    error!("Failed to render page: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!("<p>{}</p>", err.user_message())),
    )
        .into_response()
}

async fn render_current(state: &Arc<AppState>, current: CurrentSession, status: StatusCode) -> Response {
    let Some(snapshot) = ensure_itinerary(state, current.0).await else {
        return Redirect::to("/").into_response();
    };
    match state.pages.page(&snapshot.session) {
        Ok(html) => current.respond((status, Html(html))),
        Err(e) => internal_error(e),
    }
}

async fn show_step(State(state): State<Arc<AppState>>, current: CurrentSession) -> Response {
    render_current(&state, current, StatusCode::OK).await
}

async fn submit_basics(
    State(state): State<Arc<AppState>>,
    current: CurrentSession,
    RawForm(body): RawForm,
) -> Response {
    let form = match basics_from(&FormFields::parse(&body)) {
        Ok(form) => form,
        Err(message) => return bad_form(message),
    };

    let outcome = state
        .sessions
        .update(current.0, |session| session.submit_basics(form))
        .await;

    match outcome {
        Some(Err(TripCraftError::Validation { message })) => {
            debug!("Basics rejected: {}", message);
            render_current(&state, current, StatusCode::UNPROCESSABLE_ENTITY).await
        }
        Some(Err(e)) => {
            debug!("Ignoring basics submission: {}", e);
            current.respond(Redirect::to("/"))
        }
        _ => current.respond(Redirect::to("/")),
    }
}

async fn submit_refinements(
    State(state): State<Arc<AppState>>,
    current: CurrentSession,
    RawForm(body): RawForm,
) -> Response {
    let form = match refinements_from(&FormFields::parse(&body)) {
        Ok(form) => form,
        Err(message) => return bad_form(message),
    };

    if let Some(Err(e)) = state
        .sessions
        .update(current.0, |session| session.submit_refinements(form))
        .await
    {
        debug!("Ignoring refinements submission: {}", e);
    }
    current.respond(Redirect::to("/"))
}

async fn retry_itinerary(State(state): State<Arc<AppState>>, current: CurrentSession) -> Response {
    if let Some(Err(e)) = state
        .sessions
        .update(current.0, |session| session.retry_itinerary())
        .await
    {
        debug!("Ignoring retry: {}", e);
    }
    current.respond(Redirect::to("/"))
}

async fn reset(State(state): State<Arc<AppState>>, current: CurrentSession) -> Response {
    state
        .sessions
        .update(current.0, |session| session.reset())
        .await;
    current.respond(Redirect::to("/"))
}
