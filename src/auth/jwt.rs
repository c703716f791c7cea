//! Session tokens
//!
//! HS256 JWTs carrying the player id, email and roles. Roles travel in the
//! token, so a role change takes effect at the next login.

use crate::auth::models::Claims;
use crate::ledger::models::Player;
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    expiration_hours: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            expiration_hours: 24 * 7, // 7-day tokens by default
        }
    }

    pub fn with_expiration_hours(mut self, hours: i64) -> Self {
        self.expiration_hours = hours;
        self
    }

    /// Generate a JWT token for a player
    pub fn generate_token(&self, player: &Player) -> Result<(String, usize)> {
        let expires_in = self
            .expiration_hours
            .checked_mul(3600)
            .and_then(|secs| usize::try_from(secs).ok())
            .filter(|secs| *secs > 0)
            .context("Token lifetime must be positive")?;

        let expiration = chrono::Duration::try_hours(self.expiration_hours)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: player.id.to_string(),
            email: player.email.clone(),
            roles: player.roles.clone(),
            exp: expiration,
        };

        debug!(
            "Generating JWT for {} ({}), expires in {}h",
            player.email, player.id, self.expiration_hours
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate JWT")?;

        Ok((token, expires_in))
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        debug!("Validated JWT for {}", decoded.claims.email);

        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::models::{Role, RoleSet};
    use crate::money::Money;
    use uuid::Uuid;

    fn create_test_player(roles: RoleSet) -> Player {
        Player {
            id: Uuid::new_v4(),
            email: "jan@test.pl".to_string(),
            name: "Jan".to_string(),
            phone: String::new(),
            password_hash: "hash".to_string(),
            balance: Money::ZERO,
            roles,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        let player = create_test_player(RoleSet::player());

        let (token, expires_in) = handler.generate_token(&player).unwrap();
        assert!(!token.is_empty());
        assert_eq!(expires_in, 24 * 7 * 3600);

        let claims = handler.validate_token(&token).unwrap();
        assert_eq!(claims.email, player.email);
        assert_eq!(claims.sub, player.id.to_string());
        assert_eq!(claims.roles, player.roles);
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let handler = JwtHandler::new("test-secret-key-12345".to_string());
        assert!(handler.validate_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_different_secrets_reject() {
        let handler1 = JwtHandler::new("secret1".to_string());
        let handler2 = JwtHandler::new("secret2".to_string());
        let player = create_test_player(RoleSet::new([Role::Admin]));

        let (token, _) = handler1.generate_token(&player).unwrap();
        assert!(handler2.validate_token(&token).is_err());
    }

    #[test]
    fn test_custom_expiration() {
        let handler = JwtHandler::new("s".to_string()).with_expiration_hours(2);
        let (_, expires_in) = handler
            .generate_token(&create_test_player(RoleSet::player()))
            .unwrap();
        assert_eq!(expires_in, 7200);
    }

    #[test]
    fn test_non_positive_lifetime_refused() {
        let player = create_test_player(RoleSet::player());
        for hours in [0, -1, i64::MIN] {
            let handler = JwtHandler::new("s".to_string()).with_expiration_hours(hours);
            assert!(handler.generate_token(&player).is_err());
        }
    }
}
