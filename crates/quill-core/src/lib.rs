//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! Entities, ports, and the access policy live here with zero infrastructure dependencies.

pub mod access;
pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
