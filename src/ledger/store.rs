//! Ledger Storage
//! Mission: Persist players, schedules, games, signups and payments in SQLite
//!
//! - One connection guarded by a mutex; every mutation runs inside
//!   `BEGIN IMMEDIATE` while holding it, so writers never interleave
//! - Dropping a `Transaction` without commit rolls it back
//! - Payments are append-only, enforced by triggers

use crate::ledger::error::{LedgerError, LedgerResult};
use crate::ledger::models::{
    Attendance, Game, GameFilter, GameStatus, NewPlayer, NewSchedule, Payment, PaymentKind,
    Player, Role, RoleSet, Schedule, Signup,
};
use crate::money::Money;
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row, TransactionBehavior};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS players (
    id TEXT PRIMARY KEY,
    email TEXT UNIQUE NOT NULL,
    name TEXT NOT NULL,
    phone TEXT NOT NULL DEFAULT '',
    password_hash TEXT NOT NULL,
    balance INTEGER NOT NULL DEFAULT 0,
    roles TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schedules (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    day_of_week INTEGER NOT NULL,
    time TEXT NOT NULL,
    location TEXT NOT NULL,
    max_players INTEGER NOT NULL,
    price_per_game INTEGER NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS games (
    id TEXT PRIMARY KEY,
    schedule_id TEXT NOT NULL REFERENCES schedules(id),
    date TEXT NOT NULL,
    max_players INTEGER NOT NULL,
    price_per_game INTEGER NOT NULL,
    status TEXT NOT NULL,
    venue_paid INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_games_date ON games(date DESC);
CREATE INDEX IF NOT EXISTS idx_games_status ON games(status);

CREATE TABLE IF NOT EXISTS signups (
    id TEXT PRIMARY KEY,
    game_id TEXT NOT NULL REFERENCES games(id),
    user_id TEXT NOT NULL REFERENCES players(id),
    position INTEGER NOT NULL,
    attended TEXT NOT NULL DEFAULT 'UNKNOWN',
    charged INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    UNIQUE (game_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_signups_game_position ON signups(game_id, position);
CREATE INDEX IF NOT EXISTS idx_signups_user ON signups(user_id);

CREATE TABLE IF NOT EXISTS payments (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES players(id),
    amount INTEGER NOT NULL,
    kind TEXT NOT NULL,
    description TEXT,
    game_id TEXT REFERENCES games(id),
    created_at TEXT NOT NULL,
    created_by TEXT
);

CREATE INDEX IF NOT EXISTS idx_payments_user ON payments(user_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_payments_game ON payments(game_id);

CREATE TRIGGER IF NOT EXISTS payments_append_only_update
BEFORE UPDATE ON payments
BEGIN
    SELECT RAISE(ABORT, 'payments are append-only');
END;

CREATE TRIGGER IF NOT EXISTS payments_append_only_delete
BEFORE DELETE ON payments
BEGIN
    SELECT RAISE(ABORT, 'payments are append-only');
END;
"#;

const PLAYER_COLUMNS: &str =
    "id, email, name, phone, password_hash, balance, roles, is_active, created_at";
const SCHEDULE_COLUMNS: &str =
    "id, name, day_of_week, time, location, max_players, price_per_game, is_active";
const GAME_COLUMNS: &str =
    "id, schedule_id, date, max_players, price_per_game, status, venue_paid, created_at";
const SIGNUP_COLUMNS: &str = "id, game_id, user_id, position, attended, charged, created_at";
const PAYMENT_COLUMNS: &str =
    "id, user_id, amount, kind, description, game_id, created_at, created_by";

/// SQLite-backed ledger storage
#[derive(Clone)]
pub struct LedgerStore {
    conn: Arc<Mutex<Connection>>,
}

impl LedgerStore {
    /// Open (or create) the ledger database and apply the schema
    pub fn new(db_path: &str) -> anyhow::Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX; // We handle our own locking

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open ledger database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize ledger schema")?;

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap_or_default();
        if db_path != ":memory:" && journal_mode.to_lowercase() != "wal" {
            warn!("WAL mode not active, journal_mode = {}", journal_mode);
        }

        let players: i64 = conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
            .unwrap_or(0);
        info!("📒 Ledger database ready at {} ({} players)", db_path, players);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` inside an immediate transaction; commit on `Ok`, roll back on `Err`.
    pub(crate) fn with_tx<T>(
        &self,
        f: impl FnOnce(&Connection) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Run a read-only closure against the connection.
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let conn = self.conn.lock();
        f(&conn)
    }

    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> rusqlite::Result<()> {
        self.conn.lock().execute_batch(sql)
    }

    pub fn get_player(&self, id: Uuid) -> LedgerResult<Player> {
        self.with_conn(|conn| get_player(conn, id))
    }

    pub fn get_player_by_email(&self, email: &str) -> LedgerResult<Option<Player>> {
        self.with_conn(|conn| find_player_by_email(conn, email))
    }

    pub fn get_schedule(&self, id: Uuid) -> LedgerResult<Schedule> {
        self.with_conn(|conn| get_schedule(conn, id))
    }

    pub fn list_schedules(&self) -> LedgerResult<Vec<Schedule>> {
        self.with_conn(list_schedules)
    }

    pub fn get_game(&self, id: Uuid) -> LedgerResult<Game> {
        self.with_conn(|conn| get_game(conn, id))
    }

    pub fn list_signups(&self, game_id: Uuid) -> LedgerResult<Vec<Signup>> {
        self.with_conn(|conn| list_signups(conn, game_id))
    }

    pub fn payments_for_game(&self, game_id: Uuid) -> LedgerResult<Vec<Payment>> {
        self.with_conn(|conn| payments_for_game(conn, game_id))
    }

    pub fn all_payments(&self) -> LedgerResult<Vec<Payment>> {
        self.with_conn(all_payments)
    }
}

// ===== Row decoding =====

fn conversion_error(idx: usize, msg: impl Into<String>) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into().into())
}

fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e.to_string()))
}

fn opt_uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e.to_string())))
        .transpose()
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e.to_string()))
}

fn date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| conversion_error(idx, e.to_string()))
}

fn parsed_at<T: FromStr<Err = String>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: String| conversion_error(idx, e))
}

fn money_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Money> {
    Ok(Money::from_minor(row.get(idx)?))
}

fn row_to_player(row: &Row<'_>) -> rusqlite::Result<Player> {
    let roles_raw: String = row.get(6)?;
    Ok(Player {
        id: uuid_at(row, 0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        password_hash: row.get(4)?,
        balance: money_at(row, 5)?,
        roles: RoleSet::from_db(&roles_raw).map_err(|e| conversion_error(6, e))?,
        is_active: row.get(7)?,
        created_at: timestamp_at(row, 8)?,
    })
}

fn row_to_schedule(row: &Row<'_>) -> rusqlite::Result<Schedule> {
    Ok(Schedule {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        day_of_week: row.get(2)?,
        time: row.get(3)?,
        location: row.get(4)?,
        max_players: row.get(5)?,
        price_per_game: money_at(row, 6)?,
        is_active: row.get(7)?,
    })
}

fn row_to_game(row: &Row<'_>) -> rusqlite::Result<Game> {
    Ok(Game {
        id: uuid_at(row, 0)?,
        schedule_id: uuid_at(row, 1)?,
        date: date_at(row, 2)?,
        max_players: row.get(3)?,
        price_per_game: money_at(row, 4)?,
        status: parsed_at::<GameStatus>(row, 5)?,
        venue_paid: row.get(6)?,
        created_at: timestamp_at(row, 7)?,
    })
}

fn row_to_signup(row: &Row<'_>) -> rusqlite::Result<Signup> {
    Ok(Signup {
        id: uuid_at(row, 0)?,
        game_id: uuid_at(row, 1)?,
        user_id: uuid_at(row, 2)?,
        position: row.get(3)?,
        attended: parsed_at::<Attendance>(row, 4)?,
        charged: row.get(5)?,
        created_at: timestamp_at(row, 6)?,
    })
}

fn row_to_payment(row: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        amount: money_at(row, 2)?,
        kind: parsed_at::<PaymentKind>(row, 3)?,
        description: row.get(4)?,
        game_id: opt_uuid_at(row, 5)?,
        created_at: timestamp_at(row, 6)?,
        created_by: opt_uuid_at(row, 7)?,
    })
}

fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ===== Players =====

pub(crate) fn insert_player(conn: &Connection, new: &NewPlayer) -> LedgerResult<Player> {
    let player = Player {
        id: Uuid::new_v4(),
        email: new.email.trim().to_lowercase(),
        name: new.name.trim().to_string(),
        phone: new.phone.trim().to_string(),
        password_hash: new.password_hash.clone(),
        balance: Money::ZERO,
        roles: new.roles.clone(),
        is_active: true,
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO players (id, email, name, phone, password_hash, balance, roles, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, 1, ?7)",
        params![
            player.id.to_string(),
            player.email,
            player.name,
            player.phone,
            player.password_hash,
            player.roles.to_db(),
            player.created_at.to_rfc3339(),
        ],
    )?;

    Ok(player)
}

pub(crate) fn find_player(conn: &Connection, id: Uuid) -> LedgerResult<Option<Player>> {
    let player = conn
        .query_row(
            &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1"),
            params![id.to_string()],
            row_to_player,
        )
        .optional()?;
    Ok(player)
}

pub(crate) fn get_player(conn: &Connection, id: Uuid) -> LedgerResult<Player> {
    find_player(conn, id)?.ok_or_else(|| LedgerError::not_found("player", id))
}

pub(crate) fn find_player_by_email(conn: &Connection, email: &str) -> LedgerResult<Option<Player>> {
    let player = conn
        .query_row(
            &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE email = ?1"),
            params![email.trim().to_lowercase()],
            row_to_player,
        )
        .optional()?;
    Ok(player)
}

pub(crate) fn list_players(conn: &Connection, role: Option<Role>) -> LedgerResult<Vec<Player>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players ORDER BY name COLLATE NOCASE ASC"
    ))?;
    let players = stmt
        .query_map([], row_to_player)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match role {
        Some(role) => players
            .into_iter()
            .filter(|p| p.roles.contains(role))
            .collect(),
        None => players,
    })
}

/// Persist the editable profile fields. Balance is deliberately not written here.
pub(crate) fn update_player_profile(conn: &Connection, player: &Player) -> LedgerResult<()> {
    let changed = conn.execute(
        "UPDATE players SET email = ?2, name = ?3, phone = ?4, roles = ?5, is_active = ?6
         WHERE id = ?1",
        params![
            player.id.to_string(),
            player.email,
            player.name,
            player.phone,
            player.roles.to_db(),
            player.is_active,
        ],
    )?;
    if changed == 0 {
        return Err(LedgerError::not_found("player", player.id));
    }
    Ok(())
}

pub(crate) fn update_password_hash(conn: &Connection, id: Uuid, hash: &str) -> LedgerResult<()> {
    let changed = conn.execute(
        "UPDATE players SET password_hash = ?2 WHERE id = ?1",
        params![id.to_string(), hash],
    )?;
    if changed == 0 {
        return Err(LedgerError::not_found("player", id));
    }
    Ok(())
}

/// Add `delta` to the cached balance.
pub(crate) fn increment_balance(conn: &Connection, id: Uuid, delta: Money) -> LedgerResult<()> {
    let changed = conn.execute(
        "UPDATE players SET balance = balance + ?2 WHERE id = ?1",
        params![id.to_string(), delta.minor_units()],
    )?;
    if changed == 0 {
        return Err(LedgerError::not_found("player", id));
    }
    Ok(())
}

/// Overwrite the cached balance; only the repair path uses this.
pub(crate) fn overwrite_balance(conn: &Connection, id: Uuid, balance: Money) -> LedgerResult<()> {
    conn.execute(
        "UPDATE players SET balance = ?2 WHERE id = ?1",
        params![id.to_string(), balance.minor_units()],
    )?;
    Ok(())
}

// ===== Schedules =====

pub(crate) fn insert_schedule(conn: &Connection, new: &NewSchedule) -> LedgerResult<Schedule> {
    let schedule = Schedule {
        id: Uuid::new_v4(),
        name: new.name.trim().to_string(),
        day_of_week: new.day_of_week,
        time: new.time.trim().to_string(),
        location: new.location.trim().to_string(),
        max_players: new.max_players,
        price_per_game: new.price_per_game,
        is_active: true,
    };

    conn.execute(
        "INSERT INTO schedules (id, name, day_of_week, time, location, max_players, price_per_game, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)",
        params![
            schedule.id.to_string(),
            schedule.name,
            schedule.day_of_week,
            schedule.time,
            schedule.location,
            schedule.max_players,
            schedule.price_per_game.minor_units(),
        ],
    )?;

    Ok(schedule)
}

pub(crate) fn get_schedule(conn: &Connection, id: Uuid) -> LedgerResult<Schedule> {
    conn.query_row(
        &format!("SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = ?1"),
        params![id.to_string()],
        row_to_schedule,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("schedule", id))
}

pub(crate) fn list_schedules(conn: &Connection) -> LedgerResult<Vec<Schedule>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SCHEDULE_COLUMNS} FROM schedules ORDER BY day_of_week ASC, time ASC"
    ))?;
    let schedules = stmt
        .query_map([], row_to_schedule)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(schedules)
}

pub(crate) fn update_schedule(conn: &Connection, schedule: &Schedule) -> LedgerResult<()> {
    let changed = conn.execute(
        "UPDATE schedules SET name = ?2, day_of_week = ?3, time = ?4, location = ?5,
             max_players = ?6, price_per_game = ?7, is_active = ?8
         WHERE id = ?1",
        params![
            schedule.id.to_string(),
            schedule.name,
            schedule.day_of_week,
            schedule.time,
            schedule.location,
            schedule.max_players,
            schedule.price_per_game.minor_units(),
            schedule.is_active,
        ],
    )?;
    if changed == 0 {
        return Err(LedgerError::not_found("schedule", schedule.id));
    }
    Ok(())
}

// ===== Games =====

pub(crate) fn insert_game(conn: &Connection, game: &Game) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO games (id, schedule_id, date, max_players, price_per_game, status, venue_paid, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            game.id.to_string(),
            game.schedule_id.to_string(),
            date_to_db(game.date),
            game.max_players,
            game.price_per_game.minor_units(),
            game.status.as_str(),
            game.venue_paid,
            game.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub(crate) fn get_game(conn: &Connection, id: Uuid) -> LedgerResult<Game> {
    conn.query_row(
        &format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1"),
        params![id.to_string()],
        row_to_game,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("game", id))
}

pub(crate) fn list_games(conn: &Connection, filter: &GameFilter) -> LedgerResult<Vec<Game>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS} FROM games ORDER BY date DESC, created_at DESC"
    ))?;
    let games = stmt
        .query_map([], row_to_game)?
        .collect::<Result<Vec<_>, _>>()?;

    let today = Utc::now().date_naive();
    Ok(games
        .into_iter()
        .filter(|g| filter.status.map_or(true, |s| g.status == s))
        .filter(|g| {
            !filter.upcoming
                || (g.date >= today
                    && matches!(g.status, GameStatus::Open | GameStatus::Locked))
        })
        .collect())
}

pub(crate) fn set_game_status(conn: &Connection, id: Uuid, status: GameStatus) -> LedgerResult<()> {
    let changed = conn.execute(
        "UPDATE games SET status = ?2 WHERE id = ?1",
        params![id.to_string(), status.as_str()],
    )?;
    if changed == 0 {
        return Err(LedgerError::not_found("game", id));
    }
    Ok(())
}

pub(crate) fn set_venue_paid(conn: &Connection, id: Uuid, venue_paid: bool) -> LedgerResult<()> {
    let changed = conn.execute(
        "UPDATE games SET venue_paid = ?2 WHERE id = ?1",
        params![id.to_string(), venue_paid],
    )?;
    if changed == 0 {
        return Err(LedgerError::not_found("game", id));
    }
    Ok(())
}

// ===== Signups =====

pub(crate) fn insert_signup(conn: &Connection, signup: &Signup) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO signups (id, game_id, user_id, position, attended, charged, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            signup.id.to_string(),
            signup.game_id.to_string(),
            signup.user_id.to_string(),
            signup.position,
            signup.attended.as_str(),
            signup.charged,
            signup.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Signups for a game in position order.
pub(crate) fn list_signups(conn: &Connection, game_id: Uuid) -> LedgerResult<Vec<Signup>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {SIGNUP_COLUMNS} FROM signups WHERE game_id = ?1 ORDER BY position ASC"
    ))?;
    let signups = stmt
        .query_map(params![game_id.to_string()], row_to_signup)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(signups)
}

pub(crate) fn signups_for_player(conn: &Connection, user_id: Uuid) -> LedgerResult<Vec<Signup>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {SIGNUP_COLUMNS} FROM signups WHERE user_id = ?1"
    ))?;
    let signups = stmt
        .query_map(params![user_id.to_string()], row_to_signup)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(signups)
}

pub(crate) fn delete_signup(conn: &Connection, id: Uuid) -> LedgerResult<()> {
    conn.execute("DELETE FROM signups WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

pub(crate) fn set_signup_position(conn: &Connection, id: Uuid, position: u32) -> LedgerResult<()> {
    conn.execute(
        "UPDATE signups SET position = ?2 WHERE id = ?1",
        params![id.to_string(), position],
    )?;
    Ok(())
}

pub(crate) fn set_attendance(conn: &Connection, id: Uuid, attended: Attendance) -> LedgerResult<()> {
    conn.execute(
        "UPDATE signups SET attended = ?2 WHERE id = ?1",
        params![id.to_string(), attended.as_str()],
    )?;
    Ok(())
}

/// Flip `charged` to true. Returns false if it was already set.
pub(crate) fn mark_charged(conn: &Connection, id: Uuid) -> LedgerResult<bool> {
    let changed = conn.execute(
        "UPDATE signups SET charged = 1 WHERE id = ?1 AND charged = 0",
        params![id.to_string()],
    )?;
    Ok(changed == 1)
}

// ===== Payments =====

pub(crate) fn insert_payment(conn: &Connection, payment: &Payment) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO payments (id, user_id, amount, kind, description, game_id, created_at, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            payment.id.to_string(),
            payment.user_id.to_string(),
            payment.amount.minor_units(),
            payment.kind.as_str(),
            payment.description,
            payment.game_id.map(|id| id.to_string()),
            payment.created_at.to_rfc3339(),
            payment.created_by.map(|id| id.to_string()),
        ],
    )?;
    Ok(())
}

/// A player's payments, newest first.
pub(crate) fn payments_for_player(conn: &Connection, user_id: Uuid) -> LedgerResult<Vec<Payment>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE user_id = ?1
         ORDER BY created_at DESC, rowid DESC"
    ))?;
    let payments = stmt
        .query_map(params![user_id.to_string()], row_to_payment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(payments)
}

pub(crate) fn payments_for_game(conn: &Connection, game_id: Uuid) -> LedgerResult<Vec<Payment>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE game_id = ?1 ORDER BY rowid ASC"
    ))?;
    let payments = stmt
        .query_map(params![game_id.to_string()], row_to_payment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(payments)
}

/// Every payment, newest first.
pub(crate) fn all_payments(conn: &Connection) -> LedgerResult<Vec<Payment>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY created_at DESC, rowid DESC"
    ))?;
    let payments = stmt
        .query_map([], row_to_payment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(payments)
}

/// Sum of payment amounts per player, straight from the ledger.
pub(crate) fn ledger_sums(conn: &Connection) -> LedgerResult<HashMap<Uuid, Money>> {
    let mut stmt =
        conn.prepare_cached("SELECT user_id, COALESCE(SUM(amount), 0) FROM payments GROUP BY user_id")?;
    let rows = stmt
        .query_map([], |row| Ok((uuid_at(row, 0)?, money_at(row, 1)?)))?
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(rows)
}
