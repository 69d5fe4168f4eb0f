//! Domain entities - the core business objects.

mod comment;
mod post;
mod user;

pub use comment::{Comment, NewComment};
pub use post::{BlogPost, NewPost, PostDraft, POST_DATE_FORMAT};
pub use user::{NewAccount, NewUser, Role, User};
