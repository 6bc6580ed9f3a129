//! JSON API mirroring the wizard for script and SPA clients

use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::TripCraftError;
use crate::models::options::{OptionEntry, entries};
use crate::models::{Accommodation, BudgetTier, Choice, Interest, Mobility, Purpose, TripRequest};
use crate::session::SessionSnapshot;
use crate::web::{AppState, CurrentSession, ensure_itinerary};
use crate::wizard::{BasicsForm, ItineraryState, RefinementsForm, Step};

#[derive(Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub step: Step,
    pub step_number: u8,
    pub progress: u8,
    pub trip: TripRequest,
    pub request_block: String,
    pub error: Option<String>,
    pub itinerary: ItineraryState,
}

impl From<SessionSnapshot> for SessionView {
    fn from(snapshot: SessionSnapshot) -> Self {
        let session = snapshot.session;
        Self {
            id: snapshot.id,
            started_at: snapshot.started_at,
            step: session.step(),
            step_number: session.step().number(),
            progress: session.progress(),
            trip: session.trip().clone(),
            request_block: session.trip().to_request_block(),
            error: session.error().map(str::to_string),
            itinerary: session.itinerary().clone(),
        }
    }
}

#[derive(Serialize)]
pub struct OptionsView {
    pub budgets: Vec<OptionEntry>,
    pub purposes: Vec<OptionEntry>,
    pub interests: Vec<OptionEntry>,
    pub suggested_interests: Vec<&'static str>,
    pub mobility: Vec<OptionEntry>,
    pub accommodations: Vec<OptionEntry>,
}

/// Error body `{ "error": message }` with a status matching the failure
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<TripCraftError> for ApiError {
    fn from(err: TripCraftError) -> Self {
        let status = match &err {
            TripCraftError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TripCraftError::Transition { .. } => StatusCode::CONFLICT,
            TripCraftError::Completion { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("API request failed: {}", err);
        }
        let message = match &err {
            TripCraftError::Transition { .. } => err.to_string(),
            _ => err.user_message(),
        };
        Self::new(status, message)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(get_session))
        .route("/options", get(get_options))
        .route("/basics", post(submit_basics))
        .route("/refinements", post(submit_refinements))
        .route("/itinerary", post(request_itinerary))
        .route("/reset", post(reset))
        .route("/assistant/intro", get(assistant_intro))
        .route("/assistant/clarify", post(assistant_clarify))
}

async fn snapshot(state: &AppState, current: CurrentSession) -> Result<SessionSnapshot, ApiError> {
    state
        .sessions
        .snapshot(current.0)
        .await
        .ok_or_else(|| ApiError::new(StatusCode::GONE, "Session expired, please start again"))
}

async fn get_session(State(state): State<Arc<AppState>>, current: CurrentSession) -> Response {
    let result = snapshot(&state, current).await.map(|s| Json(SessionView::from(s)));
    current.respond(result)
}

async fn get_options() -> Json<OptionsView> {
    Json(OptionsView {
        budgets: entries::<BudgetTier>(),
        purposes: entries::<Purpose>(),
        interests: entries::<Interest>(),
        suggested_interests: Interest::SUGGESTED.iter().map(|i| i.slug()).collect(),
        mobility: entries::<Mobility>(),
        accommodations: entries::<Accommodation>(),
    })
}

async fn mutate<F>(state: &AppState, current: CurrentSession, f: F) -> Result<(), ApiError>
where
    F: FnOnce(&mut crate::wizard::PlannerSession) -> crate::Result<()>,
{
    state
        .sessions
        .update(current.0, f)
        .await
        .ok_or_else(|| ApiError::new(StatusCode::GONE, "Session expired, please start again"))??;
    Ok(())
}

/// Mutate the session, then return its new state
async fn apply<F>(state: &AppState, current: CurrentSession, f: F) -> Result<Json<SessionView>, ApiError>
where
    F: FnOnce(&mut crate::wizard::PlannerSession) -> crate::Result<()>,
{
    mutate(state, current, f).await?;
    Ok(Json(snapshot(state, current).await?.into()))
}

async fn submit_basics(
    State(state): State<Arc<AppState>>,
    current: CurrentSession,
    body: Result<Json<BasicsForm>, JsonRejection>,
) -> Response {
    let result = match body {
        Ok(Json(form)) => apply(&state, current, |session| session.submit_basics(form)).await,
        Err(rejection) => Err(rejection.into()),
    };
    current.respond(result)
}

async fn submit_refinements(
    State(state): State<Arc<AppState>>,
    current: CurrentSession,
    body: Result<Json<RefinementsForm>, JsonRejection>,
) -> Response {
    let result = match body {
        Ok(Json(form)) => {
            apply(&state, current, |session| session.submit_refinements(form)).await
        }
        Err(rejection) => Err(rejection.into()),
    };
    current.respond(result)
}

async fn reset(State(state): State<Arc<AppState>>, current: CurrentSession) -> Response {
    let result = apply(&state, current, |session| {
        session.reset();
        Ok(())
    })
    .await;
    current.respond(result)
}

/// Generate the itinerary, or return the stored one; a failed attempt is retried
async fn request_itinerary(State(state): State<Arc<AppState>>, current: CurrentSession) -> Response {
    let result = itinerary_for(&state, current).await;
    current.respond(result)
}

async fn itinerary_for(
    state: &Arc<AppState>,
    current: CurrentSession,
) -> Result<Json<SessionView>, ApiError> {
    mutate(state, current, |session| {
        if session.step() != Step::PresentingItinerary {
            return Err(TripCraftError::Transition {
                action: "request an itinerary",
                current: "the trip details are incomplete",
            });
        }
        session.retry_itinerary()
    })
    .await?;

    let snapshot = ensure_itinerary(state, current.0)
        .await
        .ok_or_else(|| ApiError::new(StatusCode::GONE, "Session expired, please start again"))?;

    match snapshot.session.itinerary() {
        ItineraryState::Failed(message) => Err(ApiError::new(StatusCode::BAD_GATEWAY, message.clone())),
        _ => Ok(Json(SessionView::from(snapshot))),
    }
}

async fn assistant_intro(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, ApiError> {
    let message = state.assistant.opening_message().await?;
    Ok(Json(json!({ "message": message })))
}

async fn assistant_clarify(State(state): State<Arc<AppState>>, current: CurrentSession) -> Response {
    let result = clarify_for(&state, current).await;
    current.respond(result)
}

async fn clarify_for(
    state: &AppState,
    current: CurrentSession,
) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = snapshot(state, current).await?;
    let questions = state
        .assistant
        .clarifying_questions(snapshot.session.trip())
        .await?;
    Ok(Json(json!({ "questions": questions })))
}
