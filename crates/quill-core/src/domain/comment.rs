use serde::{Deserialize, Serialize};

/// Comment entity - a reader's note attached to a blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub author_id: i32,
    pub text: String,
}

/// A comment that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i32,
    pub author_id: i32,
    pub text: String,
}

impl NewComment {
    pub fn new(post_id: i32, author_id: i32, text: String) -> Self {
        Self {
            post_id,
            author_id,
            text,
        }
    }
}
