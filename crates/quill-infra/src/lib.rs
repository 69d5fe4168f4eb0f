//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `database` - SQLite/PostgreSQL persistence via SeaORM
//! - `auth` - Argon2 password hashing
//! - `rate-limit` - Rate limiting via governor

#[cfg(feature = "database")]
pub mod database;
pub mod memory;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use memory::InMemoryStore;

#[cfg(feature = "database")]
pub use database::{DatabaseConfig, SeaCommentRepository, SeaPostRepository, SeaUserRepository};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, PasswordConfig};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
