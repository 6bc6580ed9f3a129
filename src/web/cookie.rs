//! Session cookie handling

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use super::AppState;

/// Name of the cookie carrying the planner session id
pub const SESSION_COOKIE: &str = "tripcraft_session";

/// Session id sent by the browser, if any and well formed
pub fn session_id_from(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value for a session id
pub fn session_cookie(id: Uuid) -> HeaderValue {
    // A hyphenated UUID is always a valid header value
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("tripcraft_session=; Path=/"))
}

/// The live planner session for this request, created on first visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentSession(pub Uuid);

impl CurrentSession {
    /// Attach the session cookie to a response
    pub fn respond(self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        response
            .headers_mut()
            .insert(SET_COOKIE, session_cookie(self.0));
        response
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let requested = session_id_from(&parts.headers);
        Ok(CurrentSession(state.sessions.resolve(requested).await))
    }
}
