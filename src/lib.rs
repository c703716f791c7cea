//! Kickabout Backend Library
//!
//! Pickup-football schedules, signups with waitlist promotion, game
//! settlement and the player account ledger.

pub mod api;
pub mod auth;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod money;
pub mod seed;

pub use ledger::{LedgerError, LedgerResult, LedgerStore};
pub use money::Money;
