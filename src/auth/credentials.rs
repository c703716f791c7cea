//! Player Credentials
//! Mission: bcrypt password handling and first-run admin bootstrap

use crate::ledger::models::{NewPlayer, Player, Role, RoleSet};
use crate::ledger::LedgerStore;
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::{info, warn};

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> Result<String> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String> {
    hash(password, cost).context("Failed to hash password")
}

/// Look up an active player by email and check the password.
pub fn verify_login(store: &LedgerStore, email: &str, password: &str) -> Result<Option<Player>> {
    let Some(player) = store
        .get_player_by_email(email)
        .context("Failed to load player")?
    else {
        return Ok(None);
    };

    if !player.is_active {
        return Ok(None);
    }

    let valid = verify(password, &player.password_hash).context("Failed to verify password")?;
    Ok(valid.then_some(player))
}

/// Create an ADMIN+PLAYER account when the database has no admin yet.
pub fn ensure_default_admin(
    store: &LedgerStore,
    email: &str,
    password: &str,
) -> Result<Option<Player>> {
    if store.has_admin().context("Failed to check for admin players")? {
        return Ok(None);
    }

    let admin = store
        .create_player(NewPlayer {
            email: email.to_string(),
            name: "Admin".to_string(),
            phone: String::new(),
            password_hash: hash_password(password)?,
            roles: RoleSet::new([Role::Admin, Role::Player]),
        })
        .context("Failed to insert admin player")?;

    info!("🔐 Default admin created (email: {})", admin.email);
    warn!("⚠️  CHANGE DEFAULT PASSWORD IN PRODUCTION!");
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(email: &str, password: &str, active: bool) -> LedgerStore {
        let store = LedgerStore::new(":memory:").unwrap();
        let player = store
            .create_player(NewPlayer {
                email: email.to_string(),
                name: "Jan".to_string(),
                phone: String::new(),
                password_hash: hash_password_with_cost(password, 4).unwrap(),
                roles: RoleSet::player(),
            })
            .unwrap();
        if !active {
            store
                .update_player(
                    player.id,
                    crate::ledger::PlayerUpdate {
                        is_active: Some(false),
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn test_verify_login() {
        let store = store_with("jan@test.pl", "player123", true);

        assert!(verify_login(&store, "jan@test.pl", "player123").unwrap().is_some());
        assert!(verify_login(&store, "JAN@test.pl", "player123").unwrap().is_some());
        assert!(verify_login(&store, "jan@test.pl", "wrong").unwrap().is_none());
        assert!(verify_login(&store, "nobody@test.pl", "player123").unwrap().is_none());
    }

    #[test]
    fn test_inactive_player_cannot_log_in() {
        let store = store_with("jan@test.pl", "player123", false);
        assert!(verify_login(&store, "jan@test.pl", "player123").unwrap().is_none());
    }

    #[test]
    fn test_default_admin_created_once() {
        let store = LedgerStore::new(":memory:").unwrap();

        let admin = ensure_default_admin(&store, "admin@test.pl", "admin123")
            .unwrap()
            .expect("admin should be created");
        assert!(admin.roles.is_admin());
        assert!(admin.roles.contains(Role::Player));

        assert!(ensure_default_admin(&store, "admin@test.pl", "admin123")
            .unwrap()
            .is_none());
        assert_eq!(store.player_count().unwrap(), 1);
    }
}
