//! SeaORM entities for the blog schema.

pub mod blog_post;
pub mod comment;
pub mod user;
