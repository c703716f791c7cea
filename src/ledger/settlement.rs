//! Settlement Engine
//!
//! Splits a game's snapshotted price across the paying players and applies
//! the charges atomically:
//! - One GAME_CHARGE payment per player, debiting `-share`
//! - Matching balance decrement
//! - `charged` flag on the player's signup
//! - Game moves LOCKED -> COMPLETED
//!
//! The remainder of the split lands on the first players in the paying list.

use crate::ledger::error::{LedgerError, LedgerResult};
use crate::ledger::models::{Caller, Game, GameStatus, Payment, PaymentKind, Signup};
use crate::ledger::store::{self, LedgerStore};
use crate::money::{split_evenly, Money};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

/// Who pays for a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayingSet {
    /// Admin-chosen players in the order given. May include players
    /// without a signup.
    Explicit(Vec<Uuid>),
    /// Main-list signups whose attendance was marked either way, by position.
    FromAttendance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerShare {
    pub user_id: Uuid,
    pub share: Money,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementOutcome {
    pub game_id: Uuid,
    pub charged_count: usize,
    pub per_player_base: Money,
    pub total_cost: Money,
    pub shares: Vec<PlayerShare>,
}

/// Turn the paying policy into an ordered list of player ids.
pub fn resolve_paying(
    paying: &PayingSet,
    game: &Game,
    signups: &[Signup],
) -> LedgerResult<Vec<Uuid>> {
    match paying {
        PayingSet::Explicit(ids) => {
            let mut seen = HashSet::with_capacity(ids.len());
            for id in ids {
                if !seen.insert(*id) {
                    return Err(LedgerError::InvalidArgument(format!(
                        "player {id} listed twice"
                    )));
                }
            }
            Ok(ids.clone())
        }
        PayingSet::FromAttendance => {
            let mut eligible: Vec<&Signup> = signups
                .iter()
                .filter(|s| s.attended.is_marked())
                .filter(|s| !s.is_reserve(game.max_players))
                .filter(|s| !s.charged)
                .collect();
            eligible.sort_by_key(|s| s.position);
            Ok(eligible.into_iter().map(|s| s.user_id).collect())
        }
    }
}

/// Pair each paying player with their share of `price`.
pub fn plan_charges(price: Money, paying: &[Uuid]) -> LedgerResult<Vec<PlayerShare>> {
    if paying.is_empty() {
        return Err(LedgerError::InvalidArgument(
            "no players to settle".to_string(),
        ));
    }
    let shares = split_evenly(price, paying.len())?;
    Ok(paying
        .iter()
        .zip(shares)
        .map(|(user_id, share)| PlayerShare {
            user_id: *user_id,
            share,
        })
        .collect())
}

impl LedgerStore {
    /// Charge the paying players for a locked game and complete it.
    ///
    /// Either every charge, balance change and flag lands together with the
    /// status change, or nothing does.
    pub fn settle_game(
        &self,
        caller: &Caller,
        game_id: Uuid,
        paying: PayingSet,
    ) -> LedgerResult<SettlementOutcome> {
        let result = self.with_tx(|conn| {
            let game = store::get_game(conn, game_id)?;
            if game.status != GameStatus::Locked {
                return Err(LedgerError::InvalidState(format!(
                    "only locked games can be settled, game is {}",
                    game.status
                )));
            }

            let schedule = store::get_schedule(conn, game.schedule_id)?;
            let signups = store::list_signups(conn, game_id)?;

            let paying_ids = resolve_paying(&paying, &game, &signups)?;
            if let Some(already) = signups
                .iter()
                .find(|s| s.charged && paying_ids.contains(&s.user_id))
            {
                return Err(LedgerError::InvalidState(format!(
                    "player {} was already charged for this game",
                    already.user_id
                )));
            }

            let plan = plan_charges(game.price_per_game, &paying_ids)?;
            let description = format!(
                "Game {} - {} ({} players)",
                game.date.format("%Y-%m-%d"),
                schedule.name,
                plan.len()
            );
            let now = Utc::now();

            for line in &plan {
                store::increment_balance(conn, line.user_id, -line.share)?;
                store::insert_payment(
                    conn,
                    &Payment {
                        id: Uuid::new_v4(),
                        user_id: line.user_id,
                        amount: -line.share,
                        kind: PaymentKind::GameCharge,
                        description: Some(description.clone()),
                        game_id: Some(game_id),
                        created_at: now,
                        created_by: Some(caller.user_id),
                    },
                )?;

                if let Some(signup) = signups.iter().find(|s| s.user_id == line.user_id) {
                    if !store::mark_charged(conn, signup.id)? {
                        return Err(LedgerError::InvalidState(format!(
                            "signup {} was charged concurrently",
                            signup.id
                        )));
                    }
                }
            }

            store::set_game_status(conn, game_id, GameStatus::Completed)?;

            let per_player_base = plan
                .iter()
                .map(|l| l.share)
                .min()
                .unwrap_or(Money::ZERO);
            Ok(SettlementOutcome {
                game_id,
                charged_count: plan.len(),
                per_player_base,
                total_cost: game.price_per_game,
                shares: plan,
            })
        });

        match &result {
            Ok(outcome) => info!(
                game_id = %game_id,
                charged = outcome.charged_count,
                total = %outcome.total_cost,
                "💰 Game settled"
            ),
            Err(e) => warn!(game_id = %game_id, error = %e, "Settlement aborted"),
        }
        result
    }
}
