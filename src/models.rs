//! Application configuration

use anyhow::Context;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

fn parse_expiration_hours(raw: &str) -> anyhow::Result<i64> {
    let hours: i64 = raw
        .trim()
        .parse()
        .context("JWT_EXPIRATION_HOURS must be an integer")?;
    if hours <= 0 {
        anyhow::bail!("JWT_EXPIRATION_HOURS must be positive, got {hours}");
    }
    Ok(hours)
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub default_admin_email: String,
    pub default_admin_password: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "./kickabout.db".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a valid port number")?;

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("⚠️  JWT_SECRET not set, using development secret");
            DEV_JWT_SECRET.to_string()
        });

        let jwt_expiration_hours = parse_expiration_hours(
            &std::env::var("JWT_EXPIRATION_HOURS").unwrap_or_else(|_| "168".to_string()),
        )?;

        let default_admin_email = std::env::var("DEFAULT_ADMIN_EMAIL")
            .unwrap_or_else(|_| "admin@kickabout.local".to_string());

        let default_admin_password =
            std::env::var("DEFAULT_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        Ok(Self {
            database_path,
            port,
            jwt_secret,
            jwt_expiration_hours,
            default_admin_email,
            default_admin_password,
        })
    }
}
