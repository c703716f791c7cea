//! HTTP API
//!
//! Thin axum adapter over `LedgerStore`. Handlers translate JSON into ledger
//! calls with an already-authorized `Caller`; role checks happen here.

pub mod error;
pub mod finance;
pub mod games;
pub mod players;

use crate::auth::{api as auth_api, auth_middleware, AuthState, Claims, JwtHandler};
use crate::ledger::{Caller, LedgerStore};
use crate::middleware::request_logging_simple;
use axum::{
    body::Bytes,
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use error::ApiError;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: LedgerStore,
}

pub(crate) fn require_caller(claims: &Claims) -> Result<Caller, ApiError> {
    claims.caller().ok_or(ApiError::Unauthorized)
}

/// Body of a request whose fields are all optional.
///
/// Only an empty body means "defaults". Anything else has to parse, so a
/// malformed request is a 400 and never falls back to default behaviour.
pub(crate) fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))
}

pub(crate) fn require_admin(claims: &Claims) -> Result<Caller, ApiError> {
    let caller = require_caller(claims)?;
    if !caller.is_admin() {
        return Err(ApiError::Forbidden);
    }
    Ok(caller)
}

/// Build the full application router
pub fn create_router(store: LedgerStore, jwt_handler: Arc<JwtHandler>) -> Router {
    let app_state = AppState {
        store: store.clone(),
    };
    let auth_state = AuthState::new(store, jwt_handler.clone());

    let auth_router = Router::new()
        .route("/api/auth/login", post(auth_api::login))
        .with_state(auth_state);

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth_api::get_current_user))
        .route(
            "/api/schedules",
            get(games::list_schedules).post(games::create_schedule),
        )
        .route(
            "/api/schedules/:id",
            get(games::get_schedule).patch(games::update_schedule),
        )
        .route("/api/games", get(games::list_games).post(games::create_game))
        .route(
            "/api/games/:id",
            get(games::get_game).patch(games::update_game_status),
        )
        .route(
            "/api/games/:id/signups",
            post(games::join_game).delete(games::leave_game),
        )
        .route("/api/games/:id/attendance", patch(games::mark_attendance))
        .route("/api/games/:id/settle", post(games::settle_game))
        .route("/api/games/:id/venue-paid", patch(games::set_venue_paid))
        .route(
            "/api/players",
            get(players::list_players).post(players::create_player),
        )
        .route(
            "/api/players/:id",
            get(players::get_player).patch(players::update_player),
        )
        .route("/api/players/:id/payments", get(players::player_payments))
        .route("/api/players/:id/games", get(players::player_games))
        .route("/api/payments", post(players::record_payment))
        .route("/api/admin/finance", get(finance::finance_report))
        .route("/api/admin/stats", get(finance::admin_stats))
        .route("/api/admin/audit", get(finance::balance_audit))
        .route_layer(middleware::from_fn_with_state(jwt_handler, auth_middleware))
        .with_state(app_state);

    let public_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(auth_router)
        .layer(middleware::from_fn(request_logging_simple))
        .layer(CorsLayer::permissive())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
