//! Ledger domain models
//!
//! Entities as stored, plus the JSON views the API hands to the frontend.
//! All money fields are integer minor units.

use crate::money::Money;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Capability roles. A player may hold several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Player,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Player => "PLAYER",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "PLAYER" => Ok(Role::Player),
            other => Err(format!("unknown role {other:?}")),
        }
    }
}

/// Set of roles held by a player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        RoleSet(roles.into_iter().collect())
    }

    pub fn player() -> Self {
        Self::new([Role::Player])
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.contains(Role::Admin)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// Comma-separated storage form, e.g. `"ADMIN,PLAYER"`.
    pub fn to_db(&self) -> String {
        self.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(",")
    }

    pub fn from_db(raw: &str) -> Result<Self, String> {
        raw.split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Role::from_str)
            .collect::<Result<BTreeSet<_>, _>>()
            .map(RoleSet)
    }
}

/// Pre-authorized identity handed to core operations by the auth layer.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: Uuid,
    pub roles: RoleSet,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.roles.is_admin()
    }

    /// Admins act on anyone; everybody else only on themselves.
    pub fn can_act_for(&self, user_id: Uuid) -> bool {
        self.is_admin() || self.user_id == user_id
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Cached sum of this player's payments.
    pub balance: Money,
    pub roles: RoleSet,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
    pub roles: RoleSet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub roles: Option<RoleSet>,
    pub is_active: Option<bool>,
}

/// Weekly template used to pre-fill new games.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: Uuid,
    pub name: String,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
    pub time: String,
    pub location: String,
    pub max_players: u32,
    pub price_per_game: Money,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub name: String,
    pub day_of_week: u8,
    pub time: String,
    pub location: String,
    pub max_players: u32,
    pub price_per_game: Money,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleUpdate {
    pub name: Option<String>,
    pub day_of_week: Option<u8>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub max_players: Option<u32>,
    pub price_per_game: Option<Money>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Open,
    Locked,
    Completed,
    Cancelled,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Open => "OPEN",
            GameStatus::Locked => "LOCKED",
            GameStatus::Completed => "COMPLETED",
            GameStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(GameStatus::Open),
            "LOCKED" => Ok(GameStatus::Locked),
            "COMPLETED" => Ok(GameStatus::Completed),
            "CANCELLED" => Ok(GameStatus::Cancelled),
            other => Err(format!("unknown game status {other:?}")),
        }
    }
}

/// One concrete match. `max_players` and `price_per_game` are snapshots of
/// the schedule taken at creation and never change afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub date: NaiveDate,
    pub max_players: u32,
    pub price_per_game: Money,
    pub status: GameStatus,
    pub venue_paid: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Attendance {
    #[default]
    Unknown,
    Present,
    Absent,
}

impl Attendance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attendance::Unknown => "UNKNOWN",
            Attendance::Present => "PRESENT",
            Attendance::Absent => "ABSENT",
        }
    }

    /// Whether the admin has marked this signup either way.
    pub fn is_marked(&self) -> bool {
        !matches!(self, Attendance::Unknown)
    }
}

impl FromStr for Attendance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNKNOWN" => Ok(Attendance::Unknown),
            "PRESENT" => Ok(Attendance::Present),
            "ABSENT" => Ok(Attendance::Absent),
            other => Err(format!("unknown attendance {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    pub id: Uuid,
    pub game_id: Uuid,
    pub user_id: Uuid,
    /// 1-based and dense within a game.
    pub position: u32,
    pub attended: Attendance,
    /// Set once by settlement; guards against charging twice.
    pub charged: bool,
    pub created_at: DateTime<Utc>,
}

impl Signup {
    pub fn is_reserve(&self, max_players: u32) -> bool {
        self.position > max_players
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentKind {
    Deposit,
    GameCharge,
    Refund,
    Adjustment,
}

impl PaymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::Deposit => "DEPOSIT",
            PaymentKind::GameCharge => "GAME_CHARGE",
            PaymentKind::Refund => "REFUND",
            PaymentKind::Adjustment => "ADJUSTMENT",
        }
    }
}

impl FromStr for PaymentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "DEPOSIT" => Ok(PaymentKind::Deposit),
            "GAME_CHARGE" => Ok(PaymentKind::GameCharge),
            "REFUND" => Ok(PaymentKind::Refund),
            "ADJUSTMENT" => Ok(PaymentKind::Adjustment),
            other => Err(format!("unknown payment type {other:?}")),
        }
    }
}

/// Append-only ledger entry. Positive amounts credit the player.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: PaymentKind,
    pub description: Option<String>,
    pub game_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// Manually recorded cash movement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub user_id: Uuid,
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: PaymentKind,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub player_name: String,
    pub player_balance: Money,
    pub position: u32,
    pub is_reserve: bool,
    pub attended: Attendance,
    pub charged: bool,
}

/// Game with its schedule and ordered signup list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    #[serde(flatten)]
    pub game: Game,
    pub schedule_name: String,
    pub location: String,
    pub time: String,
    pub main_list_count: usize,
    pub reserve_count: usize,
    pub signups: Vec<SignupView>,
}

#[derive(Debug, Clone, Default)]
pub struct GameFilter {
    pub status: Option<GameStatus>,
    /// Date today or later, still OPEN or LOCKED.
    pub upcoming: bool,
}

/// One row of a player's game history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGameView {
    pub game_id: Uuid,
    pub date: NaiveDate,
    pub status: GameStatus,
    pub schedule_name: String,
    pub location: String,
    pub time: String,
    pub price_per_game: Money,
    pub max_players: u32,
    pub total_signups: u32,
    pub main_list_count: u32,
    pub position: u32,
    pub is_reserve: bool,
    pub attended: Attendance,
    pub charged: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_set_round_trip() {
        let roles = RoleSet::new([Role::Player, Role::Admin, Role::Player]);
        assert_eq!(roles.to_db(), "ADMIN,PLAYER");
        assert_eq!(RoleSet::from_db("ADMIN,PLAYER").unwrap(), roles);
        assert_eq!(RoleSet::from_db("").unwrap(), RoleSet::default());
        assert!(RoleSet::from_db("ADMIN,OWNER").is_err());
    }

    #[test]
    fn test_role_set_serializes_as_array() {
        let roles = RoleSet::new([Role::Admin, Role::Player]);
        assert_eq!(serde_json::to_string(&roles).unwrap(), r#"["ADMIN","PLAYER"]"#);

        let parsed: RoleSet = serde_json::from_str(r#"["PLAYER"]"#).unwrap();
        assert!(parsed.contains(Role::Player));
        assert!(!parsed.is_admin());
    }

    #[test]
    fn test_caller_can_act_for() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let player = Caller {
            user_id: me,
            roles: RoleSet::player(),
        };
        assert!(player.can_act_for(me));
        assert!(!player.can_act_for(other));

        let admin = Caller {
            user_id: me,
            roles: RoleSet::new([Role::Admin]),
        };
        assert!(admin.can_act_for(other));
    }

    #[test]
    fn test_enum_string_forms() {
        assert_eq!("locked".parse::<GameStatus>().unwrap(), GameStatus::Locked);
        assert_eq!(GameStatus::Cancelled.as_str(), "CANCELLED");
        assert_eq!("game-charge".parse::<PaymentKind>().unwrap(), PaymentKind::GameCharge);
        assert_eq!(
            serde_json::to_string(&PaymentKind::GameCharge).unwrap(),
            r#""GAME_CHARGE""#
        );
        assert_eq!("present".parse::<Attendance>().unwrap(), Attendance::Present);
        assert!("maybe".parse::<Attendance>().is_err());
    }

    #[test]
    fn test_reserve_is_derived_from_position() {
        let signup = Signup {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            position: 3,
            attended: Attendance::Unknown,
            charged: false,
            created_at: Utc::now(),
        };
        assert!(signup.is_reserve(2));
        assert!(!signup.is_reserve(3));
    }
}
