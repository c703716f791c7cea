//! Player directory and payment handlers

use crate::api::{error::ApiError, require_admin, require_caller, AppState};
use crate::auth::credentials::{hash_password, MIN_PASSWORD_LEN};
use crate::auth::Claims;
use crate::ledger::{NewPayment, NewPlayer, Payment, Player, PlayerGameView, PlayerUpdate, RoleSet};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

fn check_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub async fn list_players(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Player>>, ApiError> {
    require_admin(&claims)?;
    Ok(Json(state.store.list_players()?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerRequest {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
    pub roles: Option<RoleSet>,
}

pub async fn create_player(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePlayerRequest>,
) -> Result<Json<Player>, ApiError> {
    require_admin(&claims)?;
    check_password(&payload.password)?;

    let player = state.store.create_player(NewPlayer {
        email: payload.email,
        name: payload.name,
        phone: payload.phone,
        password_hash: hash_password(&payload.password)?,
        roles: payload.roles.unwrap_or_else(RoleSet::player),
    })?;
    Ok(Json(player))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Player>, ApiError> {
    Ok(Json(state.store.get_player(id)?))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlayerRequest {
    #[serde(flatten)]
    pub profile: PlayerUpdate,
    pub password: Option<String>,
}

pub async fn update_player(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePlayerRequest>,
) -> Result<Json<Player>, ApiError> {
    require_admin(&claims)?;

    let new_hash = match payload.password.as_deref() {
        Some(password) => {
            check_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let player = state
        .store
        .update_player_account(id, payload.profile, new_hash.as_deref())?;
    Ok(Json(player))
}

/// GET /api/players/:id/payments - own history, or anyone's for admins
pub async fn player_payments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    if !require_caller(&claims)?.can_act_for(id) {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(state.store.payments_for_player(id)?))
}

pub async fn player_games(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PlayerGameView>>, ApiError> {
    if !require_caller(&claims)?.can_act_for(id) {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(state.store.player_games(id)?))
}

/// POST /api/payments - deposits, refunds and adjustments
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewPayment>,
) -> Result<Json<Payment>, ApiError> {
    let caller = require_admin(&claims)?;
    Ok(Json(state.store.record_payment(&caller, payload)?))
}
