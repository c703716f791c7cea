//! Settlement & Ledger Core
//!
//! Signup ordering, exact-remainder settlement, the append-only payment
//! ledger and the finance rollups built on top of it. Every mutation goes
//! through `LedgerStore` and runs in a single immediate transaction.

pub mod accounts;
pub mod error;
pub mod finance;
pub mod games;
pub mod models;
pub mod players;
pub mod settlement;
pub mod store;
pub mod waitlist;

#[cfg(test)]
pub(crate) mod fixtures;

pub use accounts::BalanceDrift;
pub use error::{LedgerError, LedgerResult};
pub use finance::{AdminStats, FinanceReport, FinancialSummary, GameLedgerRow, GameRollup};
pub use models::{
    Attendance, Caller, Game, GameFilter, GameStatus, GameView, NewPayment, NewPlayer,
    NewSchedule, Payment, PaymentKind, Player, PlayerGameView, PlayerUpdate, Role, RoleSet,
    Schedule, ScheduleUpdate, Signup, SignupView,
};
pub use settlement::{PayingSet, SettlementOutcome};
pub use store::LedgerStore;
pub use waitlist::LeaveOutcome;
