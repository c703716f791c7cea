//! Authentication Module
//! Mission: Gate the API behind JWT bearer tokens tied to ledger players

pub mod api;
pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod models;

pub use api::AuthState;
pub use jwt::JwtHandler;
pub use middleware::auth_middleware;
pub use models::Claims;
