//! Authentication Models
//! Mission: Token claims and login payloads

use crate::ledger::models::{Caller, Player, RoleSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // player id
    pub email: String,
    pub roles: RoleSet,
    pub exp: usize,
}

impl Claims {
    /// Identity handed to ledger operations. `None` if `sub` is not a UUID.
    pub fn caller(&self) -> Option<Caller> {
        Uuid::parse_str(&self.sub).ok().map(|user_id| Caller {
            user_id,
            roles: self.roles.clone(),
        })
    }
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: usize, // seconds until expiration
    pub user: UserResponse,
}

/// Signed-in user as the frontend sees it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub roles: RoleSet,
}

impl UserResponse {
    pub fn from_player(player: &Player) -> Self {
        Self {
            id: player.id.to_string(),
            email: player.email.clone(),
            name: player.name.clone(),
            roles: player.roles.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::models::Role;

    #[test]
    fn test_claims_serialization() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "jan@test.pl".to_string(),
            roles: RoleSet::new([Role::Admin, Role::Player]),
            exp: 1_900_000_000,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["roles"], serde_json::json!(["ADMIN", "PLAYER"]));

        let back: Claims = serde_json::from_value(json).unwrap();
        assert!(back.roles.is_admin());
    }

    #[test]
    fn test_caller_from_claims() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id.to_string(),
            email: "jan@test.pl".to_string(),
            roles: RoleSet::player(),
            exp: 0,
        };
        let caller = claims.caller().unwrap();
        assert_eq!(caller.user_id, id);
        assert!(!caller.is_admin());

        let bogus = Claims {
            sub: "not-a-uuid".to_string(),
            ..claims
        };
        assert!(bogus.caller().is_none());
    }
}
