//! Shared builders for ledger unit tests.

use crate::ledger::models::{Caller, Game, NewPlayer, NewSchedule, Player, Role, RoleSet};
use crate::ledger::store::LedgerStore;
use crate::money::Money;
use chrono::NaiveDate;
use uuid::Uuid;

pub(crate) fn store() -> LedgerStore {
    LedgerStore::new(":memory:").expect("Failed to create in-memory store")
}

pub(crate) fn player(store: &LedgerStore, name: &str) -> Player {
    store
        .create_player(NewPlayer {
            email: format!("{}@test.pl", name.to_lowercase()),
            name: name.to_string(),
            phone: String::new(),
            password_hash: "not-a-hash".to_string(),
            roles: RoleSet::player(),
        })
        .expect("Failed to create player")
}

pub(crate) fn admin() -> Caller {
    Caller {
        user_id: Uuid::new_v4(),
        roles: RoleSet::new([Role::Admin, Role::Player]),
    }
}

pub(crate) fn game_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 12).expect("valid date")
}

/// Fresh schedule plus one OPEN game created from it.
pub(crate) fn game(store: &LedgerStore, max_players: u32, price: i64) -> Game {
    let schedule = store
        .create_schedule(NewSchedule {
            name: "Wednesday football".to_string(),
            day_of_week: 3,
            time: "20:00".to_string(),
            location: "Pitch 1".to_string(),
            max_players,
            price_per_game: Money::from_minor(price),
        })
        .expect("Failed to create schedule");
    store
        .create_game(schedule.id, game_date())
        .expect("Failed to create game")
}

/// OPEN game with `players` signed up in order, then locked.
pub(crate) fn locked_game_with(store: &LedgerStore, price: i64, players: &[&Player]) -> Game {
    let game = game(store, players.len().max(1) as u32, price);
    for p in players {
        store.join_game(game.id, p.id).expect("Failed to join");
    }
    store.lock_game(game.id).expect("Failed to lock")
}
