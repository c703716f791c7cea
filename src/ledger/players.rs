//! Player directory

use crate::ledger::error::{LedgerError, LedgerResult};
use crate::ledger::models::{NewPlayer, Player, PlayerUpdate, Role};
use crate::ledger::store::{self, LedgerStore};
use tracing::info;
use uuid::Uuid;

fn validate_email(email: &str) -> LedgerResult<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(LedgerError::InvalidArgument(format!(
            "invalid email {email:?}"
        ))),
    }
}

impl LedgerStore {
    pub fn create_player(&self, new: NewPlayer) -> LedgerResult<Player> {
        validate_email(&new.email)?;
        if new.name.trim().is_empty() {
            return Err(LedgerError::InvalidArgument("name is required".to_string()));
        }
        if new.roles.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "at least one role is required".to_string(),
            ));
        }

        let player = self.with_tx(|conn| {
            if store::find_player_by_email(conn, &new.email)?.is_some() {
                return Err(LedgerError::Conflict(format!(
                    "email {} is already registered",
                    new.email.trim()
                )));
            }
            store::insert_player(conn, &new)
        })?;

        info!(user_id = %player.id, roles = %player.roles.to_db(), "👤 Player created: {}", player.name);
        Ok(player)
    }

    /// Edit profile fields. Balance is not reachable from here.
    pub fn update_player(&self, id: Uuid, update: PlayerUpdate) -> LedgerResult<Player> {
        self.update_player_account(id, update, None)
    }

    /// Profile edit plus an optional new password hash, committed together.
    pub fn update_player_account(
        &self,
        id: Uuid,
        update: PlayerUpdate,
        password_hash: Option<&str>,
    ) -> LedgerResult<Player> {
        self.with_tx(|conn| {
            let mut player = store::get_player(conn, id)?;

            if let Some(email) = update.email {
                validate_email(&email)?;
                let email = email.trim().to_lowercase();
                if email != player.email {
                    if store::find_player_by_email(conn, &email)?.is_some() {
                        return Err(LedgerError::Conflict(format!(
                            "email {email} is already registered"
                        )));
                    }
                    player.email = email;
                }
            }
            if let Some(name) = update.name {
                let name = name.trim();
                if name.is_empty() {
                    return Err(LedgerError::InvalidArgument("name is required".to_string()));
                }
                player.name = name.to_string();
            }
            if let Some(phone) = update.phone {
                player.phone = phone.trim().to_string();
            }
            if let Some(roles) = update.roles {
                if roles.is_empty() {
                    return Err(LedgerError::InvalidArgument(
                        "at least one role is required".to_string(),
                    ));
                }
                player.roles = roles;
            }
            if let Some(active) = update.is_active {
                player.is_active = active;
            }

            store::update_player_profile(conn, &player)?;
            if let Some(hash) = password_hash {
                store::update_password_hash(conn, id, hash)?;
                player.password_hash = hash.to_string();
            }
            Ok(player)
        })
    }

    /// Players holding the PLAYER role, sorted by name.
    pub fn list_players(&self) -> LedgerResult<Vec<Player>> {
        self.with_conn(|conn| store::list_players(conn, Some(Role::Player)))
    }

    pub fn has_admin(&self) -> LedgerResult<bool> {
        self.with_conn(|conn| Ok(!store::list_players(conn, Some(Role::Admin))?.is_empty()))
    }

    pub fn player_count(&self) -> LedgerResult<usize> {
        self.with_conn(|conn| Ok(store::list_players(conn, None)?.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::fixtures;
    use crate::ledger::models::RoleSet;
    use crate::money::Money;

    fn new_player(email: &str, name: &str, roles: RoleSet) -> NewPlayer {
        NewPlayer {
            email: email.to_string(),
            name: name.to_string(),
            phone: String::new(),
            password_hash: "hash".to_string(),
            roles,
        }
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let store = fixtures::store();
        store
            .create_player(new_player("jan@test.pl", "Jan", RoleSet::player()))
            .unwrap();

        let err = store
            .create_player(new_player(" JAN@test.pl", "Jan 2", RoleSet::player()))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
        assert!(matches!(
            store
                .create_player(new_player("not-an-email", "X", RoleSet::player()))
                .unwrap_err(),
            LedgerError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_list_players_only_player_role_sorted() {
        let store = fixtures::store();
        store
            .create_player(new_player("z@test.pl", "Zenek", RoleSet::player()))
            .unwrap();
        store
            .create_player(new_player("a@test.pl", "Adam", RoleSet::player()))
            .unwrap();
        store
            .create_player(new_player("boss@test.pl", "Boss", RoleSet::new([Role::Admin])))
            .unwrap();

        let names: Vec<String> = store.list_players().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Adam", "Zenek"]);
        assert_eq!(store.player_count().unwrap(), 3);
    }

    #[test]
    fn test_update_player_profile() {
        let store = fixtures::store();
        let a = fixtures::player(&store, "Adam");
        fixtures::player(&store, "Bartek");

        let updated = store
            .update_player(
                a.id,
                PlayerUpdate {
                    name: Some("Adam Nowak".to_string()),
                    phone: Some("600100200".to_string()),
                    roles: Some(RoleSet::new([Role::Admin, Role::Player])),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Adam Nowak");
        assert!(updated.roles.is_admin());
        assert_eq!(updated.balance, Money::ZERO);

        let taken = store
            .update_player(
                a.id,
                PlayerUpdate {
                    email: Some("bartek@test.pl".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(taken, LedgerError::Conflict(_)));
        assert_eq!(store.get_player(a.id).unwrap().name, "Adam Nowak");
    }

    #[test]
    fn test_update_player_account_is_all_or_nothing() {
        let store = fixtures::store();
        let a = fixtures::player(&store, "Adam");
        fixtures::player(&store, "Bartek");

        let updated = store
            .update_player_account(
                a.id,
                PlayerUpdate {
                    phone: Some("600100200".to_string()),
                    ..Default::default()
                },
                Some("new-hash"),
            )
            .unwrap();
        assert_eq!(updated.password_hash, "new-hash");
        assert_eq!(store.get_player(a.id).unwrap().password_hash, "new-hash");

        let err = store
            .update_player_account(
                a.id,
                PlayerUpdate {
                    email: Some("bartek@test.pl".to_string()),
                    phone: Some("700".to_string()),
                    ..Default::default()
                },
                Some("other-hash"),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
        let stored = store.get_player(a.id).unwrap();
        assert_eq!(stored.phone, "600100200");
        assert_eq!(stored.password_hash, "new-hash");
    }
}
