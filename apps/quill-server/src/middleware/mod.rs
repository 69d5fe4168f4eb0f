//! Middleware modules.

pub mod auth;
pub mod error;
pub mod guard;
pub mod rate_limit;
