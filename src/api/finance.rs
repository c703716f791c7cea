//! Admin finance handlers

use crate::api::{error::ApiError, require_admin, AppState};
use crate::auth::Claims;
use crate::ledger::{AdminStats, BalanceDrift, FinanceReport};
use axum::{extract::State, Extension, Json};

pub async fn finance_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<FinanceReport>, ApiError> {
    require_admin(&claims)?;
    Ok(Json(state.store.financial_summary()?))
}

pub async fn admin_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AdminStats>, ApiError> {
    require_admin(&claims)?;
    Ok(Json(state.store.admin_stats()?))
}

/// Players whose cached balance no longer matches their ledger
pub async fn balance_audit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<BalanceDrift>>, ApiError> {
    require_admin(&claims)?;
    Ok(Json(state.store.verify_balances()?))
}
