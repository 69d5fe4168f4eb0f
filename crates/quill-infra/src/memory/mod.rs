//! In-memory store - used by tests and when no database is configured.
//!
//! All three tables sit behind one lock so that the post cascade and the
//! comment parent check are atomic with respect to each other.
//! Note: Data is lost on process restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::{
    BlogPost, Comment, NewAccount, NewComment, NewPost, NewUser, Role, User,
};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    posts: Table<BlogPost>,
    comments: Table<Comment>,
}

impl Tables {
    fn insert_user(&mut self, new: NewUser) -> Result<User, RepoError> {
        if self.users.rows.values().any(|u| u.email == new.email) {
            return Err(RepoError::Constraint("email already registered".to_string()));
        }

        let id = self.users.next_id();
        let user = User {
            id,
            email: new.email,
            password_hash: new.password_hash,
            name: new.name,
            role: new.role,
        };
        self.users.rows.insert(id, user.clone());
        Ok(user)
    }
}

/// In-memory implementation of every repository port.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, NewUser, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.tables.read().await.users.rows.values().cloned().collect())
    }

    async fn create(&self, new: NewUser) -> Result<User, RepoError> {
        self.tables.write().await.insert_user(new)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.rows.get(id).cloned())
            .collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.users.rows.len() as u64)
    }

    async fn register(&self, account: NewAccount) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let role = if tables.users.rows.values().any(User::is_admin) {
            Role::Reader
        } else {
            Role::Admin
        };
        tables.insert_user(account.with_role(role))
    }
}

#[async_trait]
impl BaseRepository<BlogPost, NewPost, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<BlogPost>, RepoError> {
        Ok(self.tables.read().await.posts.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<BlogPost>, RepoError> {
        Ok(self.tables.read().await.posts.rows.values().cloned().collect())
    }

    async fn create(&self, new: NewPost) -> Result<BlogPost, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.rows.contains_key(&new.author_id) {
            return Err(RepoError::Constraint(format!(
                "author {} does not exist",
                new.author_id
            )));
        }

        let id = tables.posts.next_id();
        let post = BlogPost {
            id,
            author_id: new.author_id,
            title: new.title,
            subtitle: new.subtitle,
            body: new.body,
            img_url: new.img_url,
            date: new.date,
        };
        tables.posts.rows.insert(id, post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn update(&self, post: BlogPost) -> Result<BlogPost, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.rows.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(format!(
                "author {} does not exist",
                post.author_id
            )));
        }

        let slot = tables.posts.rows.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete_with_comments(&self, id: i32) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.rows.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        let before = tables.comments.rows.len();
        tables.comments.rows.retain(|_, c| c.post_id != id);
        Ok((before - tables.comments.rows.len()) as u64)
    }
}

#[async_trait]
impl BaseRepository<Comment, NewComment, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.rows.values().cloned().collect())
    }

    async fn create(&self, new: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.rows.contains_key(&new.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                new.post_id
            )));
        }
        if !tables.users.rows.contains_key(&new.author_id) {
            return Err(RepoError::Constraint(format!(
                "author {} does not exist",
                new.author_id
            )));
        }

        let id = tables.comments.next_id();
        let comment = Comment {
            id,
            post_id: new.post_id,
            author_id: new.author_id,
            text: new.text,
        };
        tables.comments.rows.insert(id, comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_by_post(&self, post_id: i32) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .rows
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .comments
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}
