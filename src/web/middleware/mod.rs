//! Middleware for Web API.

pub mod auth;
pub mod cors;

pub use auth::{session_layer, AdminSession, SessionClaims, SessionState, SESSION_COOKIE};
pub use cors::create_cors_layer;
