//! Schedules and game lifecycle
//!
//! Status machine:
//!   OPEN <-> LOCKED         lock / reopen
//!   LOCKED -> COMPLETED     settlement only
//!   OPEN | LOCKED -> CANCELLED
//! COMPLETED and CANCELLED are terminal.

use crate::ledger::error::{LedgerError, LedgerResult};
use crate::ledger::models::{
    Game, GameFilter, GameStatus, GameView, NewSchedule, Schedule, ScheduleUpdate, SignupView,
};
use crate::ledger::store::{self, LedgerStore};
use crate::money::Money;
use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

fn validate_schedule(
    day_of_week: u8,
    time: &str,
    max_players: u32,
    price: Money,
) -> LedgerResult<()> {
    if day_of_week > 6 {
        return Err(LedgerError::InvalidArgument(format!(
            "day_of_week must be 0..=6, got {day_of_week}"
        )));
    }
    if time.len() != 5 || NaiveTime::parse_from_str(time, "%H:%M").is_err() {
        return Err(LedgerError::InvalidArgument(format!(
            "time must be HH:MM, got {time:?}"
        )));
    }
    if max_players < 1 {
        return Err(LedgerError::InvalidArgument(
            "max_players must be at least 1".to_string(),
        ));
    }
    if price.is_negative() {
        return Err(LedgerError::InvalidArgument(
            "price_per_game must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Move a game from one of `from` to `to`, or fail with `InvalidState`.
fn transition(
    conn: &Connection,
    game_id: Uuid,
    from: &[GameStatus],
    to: GameStatus,
) -> LedgerResult<Game> {
    let mut game = store::get_game(conn, game_id)?;
    if !from.contains(&game.status) {
        return Err(LedgerError::InvalidState(format!(
            "cannot move game from {} to {}",
            game.status, to
        )));
    }
    store::set_game_status(conn, game_id, to)?;
    game.status = to;
    Ok(game)
}

impl LedgerStore {
    pub fn create_schedule(&self, new: NewSchedule) -> LedgerResult<Schedule> {
        if new.name.trim().is_empty() {
            return Err(LedgerError::InvalidArgument("name is required".to_string()));
        }
        validate_schedule(new.day_of_week, new.time.trim(), new.max_players, new.price_per_game)?;

        let schedule = self.with_tx(|conn| store::insert_schedule(conn, &new))?;
        info!(schedule_id = %schedule.id, "📅 Schedule created: {}", schedule.name);
        Ok(schedule)
    }

    pub fn update_schedule(&self, id: Uuid, update: ScheduleUpdate) -> LedgerResult<Schedule> {
        self.with_tx(|conn| {
            let mut schedule = store::get_schedule(conn, id)?;
            if let Some(name) = update.name {
                schedule.name = name.trim().to_string();
            }
            if let Some(day) = update.day_of_week {
                schedule.day_of_week = day;
            }
            if let Some(time) = update.time {
                schedule.time = time.trim().to_string();
            }
            if let Some(location) = update.location {
                schedule.location = location.trim().to_string();
            }
            if let Some(max) = update.max_players {
                schedule.max_players = max;
            }
            if let Some(price) = update.price_per_game {
                schedule.price_per_game = price;
            }
            if let Some(active) = update.is_active {
                schedule.is_active = active;
            }

            if schedule.name.is_empty() {
                return Err(LedgerError::InvalidArgument("name is required".to_string()));
            }
            validate_schedule(
                schedule.day_of_week,
                &schedule.time,
                schedule.max_players,
                schedule.price_per_game,
            )?;
            store::update_schedule(conn, &schedule)?;
            Ok(schedule)
        })
    }

    /// New OPEN game that snapshots the schedule's capacity and price.
    pub fn create_game(&self, schedule_id: Uuid, date: NaiveDate) -> LedgerResult<Game> {
        let game = self.with_tx(|conn| {
            let schedule = store::get_schedule(conn, schedule_id)?;
            if !schedule.is_active {
                return Err(LedgerError::InvalidState(format!(
                    "schedule {} is inactive",
                    schedule.id
                )));
            }

            let game = Game {
                id: Uuid::new_v4(),
                schedule_id,
                date,
                max_players: schedule.max_players,
                price_per_game: schedule.price_per_game,
                status: GameStatus::Open,
                venue_paid: false,
                created_at: Utc::now(),
            };
            store::insert_game(conn, &game)?;
            Ok(game)
        })?;

        info!(game_id = %game.id, date = %game.date, "⚽ Game created");
        Ok(game)
    }

    pub fn lock_game(&self, game_id: Uuid) -> LedgerResult<Game> {
        let game =
            self.with_tx(|conn| transition(conn, game_id, &[GameStatus::Open], GameStatus::Locked))?;
        info!(game_id = %game_id, "🔒 Game locked");
        Ok(game)
    }

    pub fn reopen_game(&self, game_id: Uuid) -> LedgerResult<Game> {
        let game =
            self.with_tx(|conn| transition(conn, game_id, &[GameStatus::Locked], GameStatus::Open))?;
        info!(game_id = %game_id, "🔓 Game reopened");
        Ok(game)
    }

    pub fn cancel_game(&self, game_id: Uuid) -> LedgerResult<Game> {
        let game = self.with_tx(|conn| {
            transition(
                conn,
                game_id,
                &[GameStatus::Open, GameStatus::Locked],
                GameStatus::Cancelled,
            )
        })?;
        info!(game_id = %game_id, "❌ Game cancelled");
        Ok(game)
    }

    /// Apply an admin status change requested through the API.
    pub fn change_game_status(&self, game_id: Uuid, to: GameStatus) -> LedgerResult<Game> {
        match to {
            GameStatus::Locked => self.lock_game(game_id),
            GameStatus::Open => self.reopen_game(game_id),
            GameStatus::Cancelled => self.cancel_game(game_id),
            GameStatus::Completed => Err(LedgerError::InvalidArgument(
                "games are completed by settlement".to_string(),
            )),
        }
    }

    pub fn set_venue_paid(&self, game_id: Uuid, venue_paid: bool) -> LedgerResult<Game> {
        self.with_tx(|conn| {
            let mut game = store::get_game(conn, game_id)?;
            store::set_venue_paid(conn, game_id, venue_paid)?;
            game.venue_paid = venue_paid;
            Ok(game)
        })
    }

    /// Flip `venue_paid`, reading and writing under one transaction.
    pub fn toggle_venue_paid(&self, game_id: Uuid) -> LedgerResult<Game> {
        self.with_tx(|conn| {
            let mut game = store::get_game(conn, game_id)?;
            game.venue_paid = !game.venue_paid;
            store::set_venue_paid(conn, game_id, game.venue_paid)?;
            Ok(game)
        })
    }

    pub fn game_detail(&self, game_id: Uuid) -> LedgerResult<GameView> {
        self.with_conn(|conn| {
            let game = store::get_game(conn, game_id)?;
            let schedule = store::get_schedule(conn, game.schedule_id)?;

            let mut signups = Vec::new();
            for signup in store::list_signups(conn, game_id)? {
                let player = store::get_player(conn, signup.user_id)?;
                signups.push(SignupView {
                    id: signup.id,
                    user_id: signup.user_id,
                    player_name: player.name,
                    player_balance: player.balance,
                    position: signup.position,
                    is_reserve: signup.is_reserve(game.max_players),
                    attended: signup.attended,
                    charged: signup.charged,
                });
            }

            let main_list_count = signups.iter().filter(|s| !s.is_reserve).count();
            let reserve_count = signups.len() - main_list_count;
            Ok(GameView {
                game,
                schedule_name: schedule.name,
                location: schedule.location,
                time: schedule.time,
                main_list_count,
                reserve_count,
                signups,
            })
        })
    }

    pub fn list_games(&self, filter: &GameFilter) -> LedgerResult<Vec<Game>> {
        self.with_conn(|conn| store::list_games(conn, filter))
    }
}
