//! End-to-end ledger flow against an on-disk database
//!
//! Schedule a game, fill it past capacity, let someone drop out, settle,
//! and check that balances and the finance report agree with the ledger.

use chrono::NaiveDate;
use kickabout_backend::ledger::{
    Caller, GameStatus, NewPayment, NewPlayer, NewSchedule, PayingSet, PaymentKind, Player,
    Role, RoleSet,
};
use kickabout_backend::{LedgerError, LedgerStore, Money};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> LedgerStore {
    let path = dir.path().join("kickabout.db");
    LedgerStore::new(path.to_str().unwrap()).unwrap()
}

fn add_player(store: &LedgerStore, name: &str) -> Player {
    store
        .create_player(NewPlayer {
            email: format!("{}@flow.test", name.to_lowercase()),
            name: name.to_string(),
            phone: String::new(),
            password_hash: "not-a-real-hash".to_string(),
            roles: RoleSet::player(),
        })
        .unwrap()
}

fn balance(store: &LedgerStore, player: &Player) -> Money {
    store.get_player(player.id).unwrap().balance
}

#[test]
fn test_signup_waitlist_and_settlement() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let admin = add_player(&store, "Admin");
    let operator = Caller {
        user_id: admin.id,
        roles: RoleSet::new([Role::Admin]),
    };

    let schedule = store
        .create_schedule(NewSchedule {
            name: "Thursday 5-a-side".to_string(),
            day_of_week: 4,
            time: "19:00".to_string(),
            location: "Hall B".to_string(),
            max_players: 2,
            price_per_game: Money::from_minor(10000),
        })
        .unwrap();
    let game = store
        .create_game(schedule.id, NaiveDate::from_ymd_opt(2025, 3, 13).unwrap())
        .unwrap();

    let [a, b, c, d] = ["Adam", "Bartek", "Czarek", "Darek"].map(|n| add_player(&store, n));
    for p in [&a, &b, &c, &d] {
        store.join_game(game.id, p.id).unwrap();
    }
    store
        .record_payment(
            &operator,
            NewPayment {
                user_id: c.id,
                amount: Money::from_minor(5000),
                kind: PaymentKind::Deposit,
                description: Some("cash".to_string()),
            },
        )
        .unwrap();

    // Bartek drops out, first reserve moves up
    let left = store.leave_game(game.id, b.id).unwrap();
    assert_eq!(left.promoted, Some(c.id));

    let detail = store.game_detail(game.id).unwrap();
    assert_eq!(detail.main_list_count, 2);
    assert_eq!(detail.reserve_count, 1);
    let order: Vec<_> = detail.signups.iter().map(|s| (s.user_id, s.position)).collect();
    assert_eq!(order, vec![(a.id, 1), (c.id, 2), (d.id, 3)]);

    assert!(matches!(
        store
            .settle_game(&operator, game.id, PayingSet::Explicit(vec![a.id, c.id]))
            .unwrap_err(),
        LedgerError::InvalidState(_)
    ));

    store.lock_game(game.id).unwrap();
    let outcome = store
        .settle_game(&operator, game.id, PayingSet::Explicit(vec![a.id, c.id]))
        .unwrap();
    assert_eq!(outcome.charged_count, 2);
    assert_eq!(outcome.per_player_base, Money::from_minor(5000));
    assert_eq!(outcome.total_cost, Money::from_minor(10000));

    assert_eq!(balance(&store, &a), Money::from_minor(-5000));
    assert_eq!(balance(&store, &c), Money::ZERO);
    assert_eq!(balance(&store, &d), Money::ZERO);
    assert_eq!(store.get_game(game.id).unwrap().status, GameStatus::Completed);

    // Settled games stay settled
    assert!(store
        .settle_game(&operator, game.id, PayingSet::Explicit(vec![d.id]))
        .is_err());

    store.set_venue_paid(game.id, true).unwrap();
    let report = store.financial_summary().unwrap();
    assert_eq!(report.summary.total_deposits, Money::from_minor(5000));
    assert_eq!(report.summary.total_game_charges, Money::from_minor(10000));
    assert_eq!(report.summary.total_balance, Money::from_minor(-5000));
    assert_eq!(report.summary.venue_paid_total, Money::from_minor(10000));
    assert_eq!(report.games.len(), 1);
    assert_eq!(report.games[0].players_charged, 2);

    assert!(store.verify_balances().unwrap().is_empty());
}

#[test]
fn test_ledger_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let player_id = {
        let store = open_store(&dir);
        let p = add_player(&store, "Edek");
        store
            .record_payment_by(
                None,
                NewPayment {
                    user_id: p.id,
                    amount: Money::from_minor(2500),
                    kind: PaymentKind::Deposit,
                    description: None,
                },
            )
            .unwrap();
        p.id
    };

    let store = open_store(&dir);
    assert_eq!(store.get_player(player_id).unwrap().balance, Money::from_minor(2500));
    let history = store.payments_for_player(player_id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].created_by, None);
    assert!(store.verify_balances().unwrap().is_empty());
}
