//! REST endpoints for the signup wizard.
//!
//! Sessions are identified by the `x-session-id` header. A request without
//! one starts a new session; the id is echoed on every response so the
//! client can keep using it.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;
use uuid::Uuid;

use super::flow::{Outcome, StepFlow};

/// Header carrying the session identifier.
pub const SESSION_HEADER: &str = "x-session-id";

const MAX_SESSION_ID_LEN: usize = 128;

/// Shared state for signup routes.
#[derive(Clone)]
pub struct SignupRouteState {
    pub flow: Arc<StepFlow>,
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default)]
    path: String,
}

/// Session id from the request, or a fresh one.
///
/// Ids that are empty, too long or not visible ASCII are replaced.
fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_SESSION_ID_LEN
                && id.chars().all(|c| c.is_ascii_graphic())
        })
        .map(str::to_string)
        .unwrap_or_else(|| {
            let id = Uuid::new_v4().to_string();
            debug!(session = %id, "Starting new signup session");
            id
        })
}

fn respond(session: String, outcome: Outcome) -> Response {
    let status = if outcome.is_rejected() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    (status, [(SESSION_HEADER, session)], Json(outcome)).into_response()
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "offer-signup"
    }))
}

// ── Steps ───────────────────────────────────────────────────────────────

/// GET /api/signup/page?path=/results
///
/// Enter whichever step the path names.
async fn enter_page(
    State(state): State<SignupRouteState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let session = session_id(&headers);
    let outcome = state.flow.enter_path(&session, &query.path).await;
    respond(session, outcome)
}

async fn enter_background(State(state): State<SignupRouteState>, headers: HeaderMap) -> Response {
    let session = session_id(&headers);
    let outcome = state.flow.enter_background(&session).await;
    respond(session, outcome)
}

async fn submit_background(
    State(state): State<SignupRouteState>,
    headers: HeaderMap,
    Json(form): Json<Value>,
) -> Response {
    let session = session_id(&headers);
    let outcome = state.flow.submit_background(&session, &form).await;
    respond(session, outcome)
}

async fn enter_details(State(state): State<SignupRouteState>, headers: HeaderMap) -> Response {
    let session = session_id(&headers);
    let outcome = state.flow.enter_details(&session).await;
    respond(session, outcome)
}

async fn submit_details(
    State(state): State<SignupRouteState>,
    headers: HeaderMap,
    Json(form): Json<Value>,
) -> Response {
    let session = session_id(&headers);
    let outcome = state.flow.submit_details(&session, &form).await;
    respond(session, outcome)
}

/// POST /api/signup/details/back
///
/// Save the details form as a draft, unvalidated, and go back.
async fn back_from_details(
    State(state): State<SignupRouteState>,
    headers: HeaderMap,
    Json(form): Json<Value>,
) -> Response {
    let session = session_id(&headers);
    let outcome = state.flow.back_from_details(&session, &form).await;
    respond(session, outcome)
}

async fn enter_offers(State(state): State<SignupRouteState>, headers: HeaderMap) -> Response {
    let session = session_id(&headers);
    let outcome = state.flow.enter_offer_selection(&session).await;
    respond(session, outcome)
}

/// POST /api/signup/offers
///
/// Body: `{"offerIds": ["..."]}`.
async fn submit_offers(
    State(state): State<SignupRouteState>,
    headers: HeaderMap,
    Json(form): Json<Value>,
) -> Response {
    let session = session_id(&headers);
    let outcome = state.flow.submit_offer_selection(&session, &form).await;
    respond(session, outcome)
}

async fn enter_summary(State(state): State<SignupRouteState>, headers: HeaderMap) -> Response {
    let session = session_id(&headers);
    let outcome = state.flow.enter_summary(&session).await;
    respond(session, outcome)
}

async fn restart(State(state): State<SignupRouteState>, headers: HeaderMap) -> Response {
    let session = session_id(&headers);
    let outcome = state.flow.restart(&session).await;
    respond(session, outcome)
}

/// Build the signup REST routes.
pub fn signup_routes(state: SignupRouteState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(SESSION_HEADER)]);

    Router::new()
        .route("/health", get(health))
        .route("/api/signup/page", get(enter_page))
        .route(
            "/api/signup/background",
            get(enter_background).post(submit_background),
        )
        .route("/api/signup/details", get(enter_details).post(submit_details))
        .route("/api/signup/details/back", post(back_from_details))
        .route("/api/signup/offers", get(enter_offers).post(submit_offers))
        .route("/api/signup/summary", get(enter_summary))
        .route("/api/signup/restart", post(restart))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn session_id_is_taken_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static(" abc-123 "));
        assert_eq!(session_id(&headers), "abc-123");
    }

    #[test]
    fn missing_or_odd_session_ids_are_replaced() {
        let generated = session_id(&HeaderMap::new());
        assert!(Uuid::parse_str(&generated).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("has space"));
        assert_ne!(session_id(&headers), "has space");

        let long = "x".repeat(MAX_SESSION_ID_LEN + 1);
        headers.insert(SESSION_HEADER, HeaderValue::from_str(&long).unwrap());
        assert_ne!(session_id(&headers), long);
    }
}
