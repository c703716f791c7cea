//! Demo data for a fresh database
//!
//! Safe to run repeatedly: existing emails and schedule names are skipped.

use crate::auth::credentials::hash_password_with_cost;
use crate::ledger::{
    Caller, LedgerStore, NewPayment, NewPlayer, NewSchedule, PaymentKind, Role, RoleSet,
};
use crate::money::Money;
use anyhow::{Context, Result};
use bcrypt::DEFAULT_COST;
use tracing::info;

pub const DEMO_ADMIN_EMAIL: &str = "admin@kickabout.local";
pub const DEMO_SCHEDULE_NAME: &str = "Wednesday football";

const DEMO_PLAYERS: [(&str, &str, &str); 5] = [
    ("jan@test.pl", "Jan Kowalski", "501111111"),
    ("adam@test.pl", "Adam Nowak", "502222222"),
    ("piotr@test.pl", "Piotr Wisniewski", "503333333"),
    ("marek@test.pl", "Marek Zielinski", "504444444"),
    ("tomek@test.pl", "Tomasz Wojcik", "505555555"),
];

/// Opening credit each demo player starts with.
const OPENING_DEPOSIT: Money = Money::from_minor(10_000);

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub players_created: usize,
    pub schedule_created: bool,
}

pub fn seed_demo_data(store: &LedgerStore) -> Result<SeedSummary> {
    seed_with_cost(store, DEFAULT_COST)
}

pub(crate) fn seed_with_cost(store: &LedgerStore, bcrypt_cost: u32) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    let admin = match store.get_player_by_email(DEMO_ADMIN_EMAIL)? {
        Some(admin) => admin,
        None => {
            summary.players_created += 1;
            store.create_player(NewPlayer {
                email: DEMO_ADMIN_EMAIL.to_string(),
                name: "Admin".to_string(),
                phone: "500000000".to_string(),
                password_hash: hash_password_with_cost("admin123", bcrypt_cost)?,
                roles: RoleSet::new([Role::Admin, Role::Player]),
            })?
        }
    };
    let caller = Caller {
        user_id: admin.id,
        roles: admin.roles.clone(),
    };

    let player_hash = hash_password_with_cost("player123", bcrypt_cost)?;
    for (email, name, phone) in DEMO_PLAYERS {
        if store.get_player_by_email(email)?.is_some() {
            continue;
        }
        let player = store
            .create_player(NewPlayer {
                email: email.to_string(),
                name: name.to_string(),
                phone: phone.to_string(),
                password_hash: player_hash.clone(),
                roles: RoleSet::player(),
            })
            .with_context(|| format!("Failed to seed player {email}"))?;
        store.record_payment(
            &caller,
            NewPayment {
                user_id: player.id,
                amount: OPENING_DEPOSIT,
                kind: PaymentKind::Deposit,
                description: Some("Opening balance".to_string()),
            },
        )?;
        summary.players_created += 1;
    }

    let has_schedule = store
        .list_schedules()?
        .iter()
        .any(|s| s.name == DEMO_SCHEDULE_NAME);
    if !has_schedule {
        store.create_schedule(NewSchedule {
            name: DEMO_SCHEDULE_NAME.to_string(),
            day_of_week: 3,
            time: "20:00".to_string(),
            location: "Orlik Mokotow, ul. Sportowa 5".to_string(),
            max_players: 14,
            price_per_game: Money::from_minor(35_000),
        })?;
        summary.schedule_created = true;
    }

    info!(
        "🌱 Seed complete: {} players created, schedule created: {}",
        summary.players_created, summary.schedule_created
    );
    Ok(summary)
}
