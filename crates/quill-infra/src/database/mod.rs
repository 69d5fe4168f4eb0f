//! Database persistence via SeaORM (SQLite or PostgreSQL).

mod connections;
mod sea_base;
pub mod sea_repo;

pub mod entity;

pub use connections::{DatabaseConfig, connect};
pub use sea_repo::{SeaCommentRepository, SeaPostRepository, SeaUserRepository};

#[cfg(test)]
mod tests;
