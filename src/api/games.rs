//! Schedule, game, signup and settlement handlers

use crate::api::{error::ApiError, optional_json, require_admin, require_caller, AppState};
use crate::auth::Claims;
use crate::ledger::{
    Attendance, Game, GameFilter, GameStatus, GameView, LeaveOutcome, NewSchedule, PayingSet,
    Schedule, ScheduleUpdate, SettlementOutcome, Signup,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

// ===== Schedules =====

pub async fn list_schedules(
    State(state): State<AppState>,
) -> Result<Json<Vec<Schedule>>, ApiError> {
    Ok(Json(state.store.list_schedules()?))
}

pub async fn create_schedule(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewSchedule>,
) -> Result<Json<Schedule>, ApiError> {
    require_admin(&claims)?;
    Ok(Json(state.store.create_schedule(payload)?))
}

pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Schedule>, ApiError> {
    Ok(Json(state.store.get_schedule(id)?))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScheduleUpdate>,
) -> Result<Json<Schedule>, ApiError> {
    require_admin(&claims)?;
    Ok(Json(state.store.update_schedule(id, payload)?))
}

// ===== Games =====

#[derive(Debug, Default, Deserialize)]
pub struct GamesQuery {
    pub status: Option<GameStatus>,
    pub upcoming: Option<bool>,
}

pub async fn list_games(
    State(state): State<AppState>,
    Query(params): Query<GamesQuery>,
) -> Result<Json<Vec<Game>>, ApiError> {
    let filter = GameFilter {
        status: params.status,
        upcoming: params.upcoming.unwrap_or(false),
    };
    Ok(Json(state.store.list_games(&filter)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub schedule_id: Uuid,
    pub date: NaiveDate,
}

pub async fn create_game(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<Json<Game>, ApiError> {
    require_admin(&claims)?;
    Ok(Json(state.store.create_game(payload.schedule_id, payload.date)?))
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameView>, ApiError> {
    Ok(Json(state.store.game_detail(id)?))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: GameStatus,
}

/// PATCH /api/games/:id - lock, reopen or cancel
pub async fn update_game_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<Game>, ApiError> {
    require_admin(&claims)?;
    Ok(Json(state.store.change_game_status(id, payload.status)?))
}

// ===== Signups =====

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignupTarget {
    /// Defaults to the caller.
    pub user_id: Option<Uuid>,
}

fn signup_subject(claims: &Claims, target: &SignupTarget) -> Result<Uuid, ApiError> {
    let caller = require_caller(claims)?;
    let user_id = target.user_id.unwrap_or(caller.user_id);
    if !caller.can_act_for(user_id) {
        return Err(ApiError::Forbidden);
    }
    Ok(user_id)
}

pub async fn join_game(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Signup>, ApiError> {
    let target: SignupTarget = optional_json(&body)?;
    let user_id = signup_subject(&claims, &target)?;
    Ok(Json(state.store.join_game(id, user_id)?))
}

pub async fn leave_game(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Query(target): Query<SignupTarget>,
) -> Result<Json<LeaveOutcome>, ApiError> {
    let user_id = signup_subject(&claims, &target)?;
    Ok(Json(state.store.leave_game(id, user_id)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    pub signup_id: Uuid,
    pub attended: Attendance,
}

pub async fn mark_attendance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttendanceRequest>,
) -> Result<Json<Signup>, ApiError> {
    require_admin(&claims)?;
    Ok(Json(state.store.mark_attendance(
        id,
        payload.signup_id,
        payload.attended,
    )?))
}

// ===== Settlement =====

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettleRequest {
    /// Omitted: charge the players marked as attended.
    pub paying_user_ids: Option<Vec<Uuid>>,
}

pub async fn settle_game(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<SettlementOutcome>, ApiError> {
    let caller = require_admin(&claims)?;
    let request: SettleRequest = optional_json(&body)?;
    let paying = match request.paying_user_ids {
        Some(ids) => PayingSet::Explicit(ids),
        None => PayingSet::FromAttendance,
    };
    Ok(Json(state.store.settle_game(&caller, id, paying)?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VenuePaidRequest {
    /// Omitted: flip the current value.
    pub venue_paid: Option<bool>,
}

pub async fn set_venue_paid(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Game>, ApiError> {
    require_admin(&claims)?;
    let request: VenuePaidRequest = optional_json(&body)?;
    let game = match request.venue_paid {
        Some(value) => state.store.set_venue_paid(id, value)?,
        None => state.store.toggle_venue_paid(id)?,
    };
    Ok(Json(game))
}
