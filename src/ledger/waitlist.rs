//! Signup ledger and waitlist
//!
//! A game's signups form one ordered list. The first `max_players` entries
//! are the main list, everything after is the reserve list. Joining appends,
//! leaving removes and closes the gap, which is how reserves get promoted.

use crate::ledger::error::{LedgerError, LedgerResult};
use crate::ledger::models::{Attendance, GameStatus, Signup};
use crate::ledger::store::{self, LedgerStore};
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Position the next joiner receives.
pub fn next_position(signups: &[Signup]) -> u32 {
    signups.len() as u32 + 1
}

/// Reassign positions densely as `1..=N`, preserving relative order.
///
/// Returns the `(signup_id, new_position)` pairs that actually moved.
pub fn renumber(signups: &mut [Signup]) -> Vec<(Uuid, u32)> {
    signups.sort_by_key(|s| s.position);

    let mut moved = Vec::new();
    for (idx, signup) in signups.iter_mut().enumerate() {
        let position = idx as u32 + 1;
        if signup.position != position {
            signup.position = position;
            moved.push((signup.id, position));
        }
    }
    moved
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveOutcome {
    pub removed: Signup,
    /// Player moved from the reserve list onto the main list, if any.
    pub promoted: Option<Uuid>,
}

impl LedgerStore {
    pub fn join_game(&self, game_id: Uuid, user_id: Uuid) -> LedgerResult<Signup> {
        let signup = self.with_tx(|conn| {
            let game = store::get_game(conn, game_id)?;
            if game.status != GameStatus::Open {
                return Err(LedgerError::InvalidState(format!(
                    "game is {}, signups are closed",
                    game.status
                )));
            }

            let player = store::get_player(conn, user_id)?;
            if !player.is_active {
                return Err(LedgerError::InvalidState(format!(
                    "player {} is inactive",
                    player.id
                )));
            }

            let existing = store::list_signups(conn, game_id)?;
            if existing.iter().any(|s| s.user_id == user_id) {
                return Err(LedgerError::DuplicateSignup { game_id, user_id });
            }

            let signup = Signup {
                id: Uuid::new_v4(),
                game_id,
                user_id,
                position: next_position(&existing),
                attended: Attendance::Unknown,
                charged: false,
                created_at: Utc::now(),
            };
            store::insert_signup(conn, &signup)?;
            Ok(signup)
        })?;

        info!(
            game_id = %game_id,
            user_id = %user_id,
            position = signup.position,
            "✍️ Player joined game"
        );
        Ok(signup)
    }

    pub fn leave_game(&self, game_id: Uuid, user_id: Uuid) -> LedgerResult<LeaveOutcome> {
        let outcome = self.with_tx(|conn| {
            let game = store::get_game(conn, game_id)?;
            if game.status != GameStatus::Open {
                return Err(LedgerError::InvalidState(format!(
                    "game is {}, signups are closed",
                    game.status
                )));
            }

            let mut signups = store::list_signups(conn, game_id)?;
            let idx = signups
                .iter()
                .position(|s| s.user_id == user_id)
                .ok_or_else(|| LedgerError::not_found("signup", format!("{game_id}/{user_id}")))?;

            let removed = signups.remove(idx);
            store::delete_signup(conn, removed.id)?;

            let promoted = if removed.is_reserve(game.max_players) {
                None
            } else {
                signups
                    .iter()
                    .find(|s| s.position == game.max_players + 1)
                    .map(|s| s.user_id)
            };

            for (signup_id, position) in renumber(&mut signups) {
                store::set_signup_position(conn, signup_id, position)?;
            }

            Ok(LeaveOutcome { removed, promoted })
        })?;

        info!(game_id = %game_id, user_id = %user_id, "👋 Player left game");
        if let Some(promoted) = outcome.promoted {
            info!(game_id = %game_id, user_id = %promoted, "⬆️ Reserve promoted to main list");
        }
        Ok(outcome)
    }

    pub fn mark_attendance(
        &self,
        game_id: Uuid,
        signup_id: Uuid,
        attended: Attendance,
    ) -> LedgerResult<Signup> {
        self.with_tx(|conn| {
            let game = store::get_game(conn, game_id)?;
            if game.status != GameStatus::Locked {
                return Err(LedgerError::InvalidState(format!(
                    "attendance can only be marked on a locked game, game is {}",
                    game.status
                )));
            }

            let mut signup = store::list_signups(conn, game_id)?
                .into_iter()
                .find(|s| s.id == signup_id)
                .ok_or_else(|| LedgerError::not_found("signup", signup_id))?;

            store::set_attendance(conn, signup_id, attended)?;
            signup.attended = attended;
            Ok(signup)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::fixtures;

    fn positions(store: &LedgerStore, game_id: Uuid) -> Vec<(Uuid, u32)> {
        store
            .list_signups(game_id)
            .unwrap()
            .into_iter()
            .map(|s| (s.user_id, s.position))
            .collect()
    }

    #[test]
    fn test_renumber_closes_gaps() {
        let mk = |position| Signup {
            id: Uuid::new_v4(),
            game_id: Uuid::nil(),
            user_id: Uuid::new_v4(),
            position,
            attended: Attendance::Unknown,
            charged: false,
            created_at: Utc::now(),
        };
        let mut signups = vec![mk(4), mk(1), mk(3)];
        let moved = renumber(&mut signups);

        assert_eq!(
            signups.iter().map(|s| s.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(moved.len(), 2);
        assert_eq!(next_position(&signups), 4);
        assert_eq!(next_position(&[]), 1);
    }

    #[test]
    fn test_join_appends_in_order() {
        let store = fixtures::store();
        let game = fixtures::game(&store, 2, 6000);
        let a = fixtures::player(&store, "Adam");
        let b = fixtures::player(&store, "Bartek");
        let c = fixtures::player(&store, "Czarek");

        for p in [&a, &b, &c] {
            store.join_game(game.id, p.id).unwrap();
        }

        assert_eq!(positions(&store, game.id), vec![(a.id, 1), (b.id, 2), (c.id, 3)]);
        let view = store.game_detail(game.id).unwrap();
        assert_eq!(view.main_list_count, 2);
        assert_eq!(view.reserve_count, 1);
        assert!(view.signups[2].is_reserve);
    }

    #[test]
    fn test_duplicate_join_rejected() {
        let store = fixtures::store();
        let game = fixtures::game(&store, 10, 6000);
        let a = fixtures::player(&store, "Adam");

        store.join_game(game.id, a.id).unwrap();
        let err = store.join_game(game.id, a.id).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateSignup { .. }));
        assert_eq!(store.list_signups(game.id).unwrap().len(), 1);
    }

    #[test]
    fn test_join_requires_open_game_and_active_player() {
        let store = fixtures::store();
        let game = fixtures::game(&store, 10, 6000);
        let a = fixtures::player(&store, "Adam");
        let b = fixtures::player(&store, "Bartek");

        store
            .update_player(
                b.id,
                crate::ledger::PlayerUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(matches!(
            store.join_game(game.id, b.id).unwrap_err(),
            LedgerError::InvalidState(_)
        ));

        store.lock_game(game.id).unwrap();
        assert!(matches!(
            store.join_game(game.id, a.id).unwrap_err(),
            LedgerError::InvalidState(_)
        ));

        assert!(matches!(
            store.join_game(Uuid::new_v4(), a.id).unwrap_err(),
            LedgerError::NotFound { entity: "game", .. }
        ));
        assert!(matches!(
            store.join_game(fixtures::game(&store, 2, 0).id, Uuid::new_v4()).unwrap_err(),
            LedgerError::NotFound { entity: "player", .. }
        ));
    }

    #[test]
    fn test_leave_promotes_first_reserve() {
        let store = fixtures::store();
        let game = fixtures::game(&store, 2, 6000);
        let a = fixtures::player(&store, "Adam");
        let b = fixtures::player(&store, "Bartek");
        let c = fixtures::player(&store, "Czarek");
        let d = fixtures::player(&store, "Darek");
        for p in [&a, &b, &c, &d] {
            store.join_game(game.id, p.id).unwrap();
        }

        let outcome = store.leave_game(game.id, b.id).unwrap();
        assert_eq!(outcome.removed.user_id, b.id);
        assert_eq!(outcome.promoted, Some(c.id));

        assert_eq!(positions(&store, game.id), vec![(a.id, 1), (c.id, 2), (d.id, 3)]);
        let view = store.game_detail(game.id).unwrap();
        let flags: Vec<bool> = view.signups.iter().map(|s| s.is_reserve).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn test_reserve_leaving_promotes_nobody() {
        let store = fixtures::store();
        let game = fixtures::game(&store, 1, 6000);
        let a = fixtures::player(&store, "Adam");
        let b = fixtures::player(&store, "Bartek");
        let c = fixtures::player(&store, "Czarek");
        for p in [&a, &b, &c] {
            store.join_game(game.id, p.id).unwrap();
        }

        let outcome = store.leave_game(game.id, b.id).unwrap();
        assert_eq!(outcome.promoted, None);
        assert_eq!(positions(&store, game.id), vec![(a.id, 1), (c.id, 2)]);
    }

    #[test]
    fn test_leave_without_signup_is_not_found() {
        let store = fixtures::store();
        let game = fixtures::game(&store, 2, 6000);
        let a = fixtures::player(&store, "Adam");

        let err = store.leave_game(game.id, a.id).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { entity: "signup", .. }));
    }

    #[test]
    fn test_attendance_only_on_locked_game() {
        let store = fixtures::store();
        let game = fixtures::game(&store, 2, 6000);
        let a = fixtures::player(&store, "Adam");
        let signup = store.join_game(game.id, a.id).unwrap();

        assert!(matches!(
            store
                .mark_attendance(game.id, signup.id, Attendance::Present)
                .unwrap_err(),
            LedgerError::InvalidState(_)
        ));

        store.lock_game(game.id).unwrap();
        let marked = store
            .mark_attendance(game.id, signup.id, Attendance::Absent)
            .unwrap();
        assert_eq!(marked.attended, Attendance::Absent);
        assert_eq!(store.list_signups(game.id).unwrap()[0].attended, Attendance::Absent);

        assert!(matches!(
            store
                .mark_attendance(game.id, Uuid::new_v4(), Attendance::Present)
                .unwrap_err(),
            LedgerError::NotFound { entity: "signup", .. }
        ));
    }
}
