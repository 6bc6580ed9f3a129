//! HTTP surface: the wizard pages and the JSON API

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::assistant::Assistant;
use crate::completion::CompletionService;
use crate::config::SessionConfig;
use crate::itinerary::ItineraryPlanner;
use crate::prompts::PromptLibrary;
use crate::session::{REAP_INTERVAL, SessionSnapshot, SessionStore};
use crate::{TripCraftError, api};

pub mod cookie;
pub mod pages;
pub mod render;

pub use cookie::{CurrentSession, SESSION_COOKIE};
pub use render::PageRenderer;

/// Forms are tiny; anything larger is not a planner submission
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Everything the handlers share
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub planner: ItineraryPlanner,
    pub assistant: Assistant,
    pub pages: PageRenderer,
}

impl AppState {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        sessions: &SessionConfig,
    ) -> crate::Result<Self> {
        let prompts = Arc::new(PromptLibrary::new()?);
        Ok(Self {
            sessions: Arc::new(SessionStore::from_config(sessions)),
            planner: ItineraryPlanner::new(prompts.clone(), completion.clone()),
            assistant: Assistant::new(prompts, completion),
            pages: PageRenderer::new()?,
        })
    }
}

/// Request the itinerary if the session is waiting for one, then return the session
///
/// The completion call runs in its own task without holding the session lock,
/// so a dropped connection does not leave the session stuck mid-generation.
pub async fn ensure_itinerary(state: &Arc<AppState>, id: Uuid) -> Option<SessionSnapshot> {
    let claim = state
        .sessions
        .update(id, |session| session.begin_itinerary())
        .await
        .flatten();

    if let Some((revision, trip)) = claim {
        let planner = state.planner.clone();
        let sessions = state.sessions.clone();
        let task = tokio::spawn(async move {
            let outcome = planner.generate(&trip).await;
            sessions
                .update(id, |session| {
                    session.record_itinerary(revision, outcome.as_ref().map(String::clone))
                })
                .await;
        });

        if let Err(e) = task.await {
            tracing::error!("Itinerary task did not finish: {}", e);
            let failure = TripCraftError::general("The itinerary request was interrupted.");
            state
                .sessions
                .update(id, |session| session.record_itinerary(revision, Err(&failure)))
                .await;
        }
    }

    state.sessions.snapshot(id).await
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(pages::router())
        .nest("/api", api::router().layer(cors))
        .route("/health", get(|| async { "ok" }))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the planner until Ctrl-C
pub async fn run(address: &str, state: Arc<AppState>) -> Result<()> {
    let reaper = state.sessions.spawn_reaper(REAP_INTERVAL);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    tracing::info!("Web server running at http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;

    reaper.abort();
    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
