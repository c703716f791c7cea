//! Financial Aggregator
//!
//! Read-only rollups over the payment ledger and completed games. The pure
//! `FinancialSummary::compute` does the math; the store methods only gather
//! rows and join names.

use crate::ledger::error::LedgerResult;
use crate::ledger::models::{
    GameFilter, GameStatus, Payment, PaymentKind, PlayerGameView, Role,
};
use crate::ledger::store::{self, LedgerStore};
use crate::money::Money;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

const LOW_BALANCE_LIMIT: usize = 10;

/// Completed-game facts the aggregator needs, already joined with the schedule.
#[derive(Debug, Clone)]
pub struct GameLedgerRow {
    pub game_id: Uuid,
    pub date: NaiveDate,
    pub status: GameStatus,
    pub venue_paid: bool,
    pub price_per_game: Money,
    pub schedule_name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRollup {
    pub game_id: Uuid,
    pub date: NaiveDate,
    pub schedule_name: String,
    pub location: String,
    pub price_per_game: Money,
    pub total_charged: Money,
    pub players_charged: usize,
    pub venue_paid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_deposits: Money,
    pub total_refunds: Money,
    pub total_game_charges: Money,
    pub total_adjustments: Money,
    /// Sum of every payment; equals the sum of player balances.
    pub total_balance: Money,
    pub cash_collected: Money,
    pub cash_spent_on_games: Money,
    pub cash_balance: Money,
    pub venue_paid_total: Money,
    pub venue_unpaid_total: Money,
}

impl FinancialSummary {
    pub fn compute(payments: &[Payment], games: &[GameLedgerRow]) -> Self {
        let of_kind = |kind: PaymentKind| payments.iter().filter(move |p| p.kind == kind);

        // Refunds and charges count by magnitude, whichever sign each row carries
        let total_deposits: Money = of_kind(PaymentKind::Deposit).map(|p| p.amount).sum();
        let total_refunds: Money = of_kind(PaymentKind::Refund).map(|p| p.amount.abs()).sum();
        let total_game_charges: Money =
            of_kind(PaymentKind::GameCharge).map(|p| p.amount.abs()).sum();
        let total_adjustments: Money = of_kind(PaymentKind::Adjustment).map(|p| p.amount).sum();
        let cash_collected = total_deposits - total_refunds;

        let mut venue_paid_total = Money::ZERO;
        let mut venue_unpaid_total = Money::ZERO;
        for rollup in rollup_games(payments, games) {
            if rollup.venue_paid {
                venue_paid_total += rollup.total_charged;
            } else {
                venue_unpaid_total += rollup.total_charged;
            }
        }

        Self {
            total_deposits,
            total_refunds,
            total_game_charges,
            total_adjustments,
            total_balance: payments.iter().map(|p| p.amount).sum(),
            cash_collected,
            cash_spent_on_games: total_game_charges,
            cash_balance: cash_collected - total_game_charges,
            venue_paid_total,
            venue_unpaid_total,
        }
    }
}

/// Per-game charge totals for completed games, in the order given.
pub fn rollup_games(payments: &[Payment], games: &[GameLedgerRow]) -> Vec<GameRollup> {
    let mut charged: HashMap<Uuid, (Money, usize)> = HashMap::new();
    for p in payments.iter().filter(|p| p.kind == PaymentKind::GameCharge) {
        if let Some(game_id) = p.game_id {
            let entry = charged.entry(game_id).or_default();
            entry.0 += p.amount.abs();
            entry.1 += 1;
        }
    }

    games
        .iter()
        .filter(|g| g.status == GameStatus::Completed)
        .map(|g| {
            let (total_charged, players) = charged
                .get(&g.game_id)
                .copied()
                .unwrap_or((Money::ZERO, 0));
            GameRollup {
                game_id: g.game_id,
                date: g.date,
                schedule_name: g.schedule_name.clone(),
                location: g.location.clone(),
                price_per_game: g.price_per_game,
                total_charged,
                players_charged: players,
                venue_paid: g.venue_paid,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub player_name: String,
    pub amount: Money,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReport {
    pub summary: FinancialSummary,
    pub deposits: Vec<DepositView>,
    pub games: Vec<GameRollup>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowBalance {
    pub id: Uuid,
    pub name: String,
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub player_count: usize,
    pub low_balances: Vec<LowBalance>,
}

impl LedgerStore {
    pub fn financial_summary(&self) -> LedgerResult<FinanceReport> {
        self.with_conn(|conn| {
            let payments = store::all_payments(conn)?;
            let names: HashMap<Uuid, String> = store::list_players(conn, None)?
                .into_iter()
                .map(|p| (p.id, p.name))
                .collect();
            let schedules: HashMap<Uuid, _> = store::list_schedules(conn)?
                .into_iter()
                .map(|s| (s.id, s))
                .collect();

            let filter = GameFilter {
                status: Some(GameStatus::Completed),
                upcoming: false,
            };
            let rows: Vec<GameLedgerRow> = store::list_games(conn, &filter)?
                .into_iter()
                .map(|g| {
                    let schedule = schedules.get(&g.schedule_id);
                    GameLedgerRow {
                        game_id: g.id,
                        date: g.date,
                        status: g.status,
                        venue_paid: g.venue_paid,
                        price_per_game: g.price_per_game,
                        schedule_name: schedule.map(|s| s.name.clone()).unwrap_or_default(),
                        location: schedule.map(|s| s.location.clone()).unwrap_or_default(),
                    }
                })
                .collect();

            let deposits = payments
                .iter()
                .filter(|p| p.kind == PaymentKind::Deposit)
                .map(|p| DepositView {
                    id: p.id,
                    user_id: p.user_id,
                    player_name: names.get(&p.user_id).cloned().unwrap_or_default(),
                    amount: p.amount,
                    description: p.description.clone(),
                    created_at: p.created_at,
                })
                .collect();

            Ok(FinanceReport {
                summary: FinancialSummary::compute(&payments, &rows),
                deposits,
                games: rollup_games(&payments, &rows),
            })
        })
    }

    pub fn admin_stats(&self) -> LedgerResult<AdminStats> {
        self.with_conn(|conn| {
            let players = store::list_players(conn, Some(Role::Player))?;
            let player_count = players.len();

            let mut low_balances: Vec<LowBalance> = players
                .into_iter()
                .filter(|p| p.balance.is_negative())
                .map(|p| LowBalance {
                    id: p.id,
                    name: p.name,
                    balance: p.balance,
                })
                .collect();
            low_balances.sort_by_key(|l| l.balance);
            low_balances.truncate(LOW_BALANCE_LIMIT);

            Ok(AdminStats {
                player_count,
                low_balances,
            })
        })
    }

    /// Every game a player signed up for, newest first.
    pub fn player_games(&self, user_id: Uuid) -> LedgerResult<Vec<PlayerGameView>> {
        self.with_conn(|conn| {
            store::get_player(conn, user_id)?;

            let mut rows = Vec::new();
            for signup in store::signups_for_player(conn, user_id)? {
                let game = store::get_game(conn, signup.game_id)?;
                let schedule = store::get_schedule(conn, game.schedule_id)?;
                let total_signups = store::list_signups(conn, game.id)?.len() as u32;

                rows.push(PlayerGameView {
                    game_id: game.id,
                    date: game.date,
                    status: game.status,
                    schedule_name: schedule.name,
                    location: schedule.location,
                    time: schedule.time,
                    price_per_game: game.price_per_game,
                    max_players: game.max_players,
                    total_signups,
                    main_list_count: total_signups.min(game.max_players),
                    position: signup.position,
                    is_reserve: signup.is_reserve(game.max_players),
                    attended: signup.attended,
                    charged: signup.charged,
                });
            }
            rows.sort_by(|a, b| b.date.cmp(&a.date));
            Ok(rows)
        })
    }
}
