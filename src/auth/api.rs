//! Login and current-player endpoints

use crate::auth::{
    credentials::verify_login,
    jwt::JwtHandler,
    middleware::extract_claims,
    models::{LoginRequest, LoginResponse, UserResponse},
};
use crate::api::AppState;
use crate::ledger::{LedgerError, LedgerStore};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub store: LedgerStore,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(store: LedgerStore, jwt_handler: Arc<JwtHandler>) -> Self {
        Self { store, jwt_handler }
    }
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    info!("🔐 Login attempt: {}", payload.email);

    let player = verify_login(&state.store, &payload.email, &payload.password)
        .map_err(|e| {
            error!("Login lookup failed: {:#}", e);
            AuthApiError::InternalError
        })?
        .ok_or_else(|| {
            warn!("❌ Failed login attempt: {}", payload.email);
            AuthApiError::InvalidCredentials
        })?;

    let (token, expires_in) = state
        .jwt_handler
        .generate_token(&player)
        .map_err(|_| AuthApiError::InternalError)?;

    info!("✅ Login successful: {} ({})", player.email, player.roles.to_db());

    Ok(Json(LoginResponse {
        token,
        expires_in,
        user: UserResponse::from_player(&player),
    }))
}

/// GET /api/auth/me - the signed-in player, re-read from the ledger
///
/// A deactivated player keeps a valid token until it expires, so this is
/// where the client finds out.
pub async fn get_current_user(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<UserResponse>, AuthApiError> {
    let caller = extract_claims(&req)
        .and_then(|claims| claims.caller())
        .ok_or(AuthApiError::Unauthorized)?;

    match state.store.get_player(caller.user_id) {
        Ok(player) if player.is_active => Ok(Json(UserResponse::from_player(&player))),
        Ok(_) | Err(LedgerError::NotFound { .. }) => Err(AuthApiError::Unauthorized),
        Err(e) => {
            error!("Player lookup failed: {}", e);
            Err(AuthApiError::InternalError)
        }
    }
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    Unauthorized,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
            AuthApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
