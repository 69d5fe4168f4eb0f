//! View models and page rendering.

use std::collections::{BTreeSet, HashMap};

use actix_web::{HttpResponse, http::StatusCode};
use quill_core::domain::{BlogPost, Comment, User};
use quill_shared::ErrorResponse;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tera::Context;

use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::templates::Templates;

const GRAVATAR_SIZE: u32 = 100;
const UNKNOWN_AUTHOR: &str = "Unknown author";

/// Gravatar image for an email address.
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s={GRAVATAR_SIZE}&d=retro&r=g",
        hex::encode(digest)
    )
}

/// The logged-in user as seen by templates.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub name: String,
    pub is_admin: bool,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            is_admin: user.is_admin(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: i32,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
    pub date: String,
    pub author: String,
}

impl PostView {
    pub fn new(post: BlogPost, author: Option<&User>) -> Self {
        Self {
            id: post.id,
            date: post.display_date(),
            title: post.title,
            subtitle: post.subtitle,
            body: post.body,
            img_url: post.img_url,
            author: author.map_or_else(|| UNKNOWN_AUTHOR.to_string(), |u| u.name.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub text: String,
    pub author: String,
    pub avatar_url: String,
}

impl CommentView {
    pub fn new(comment: Comment, author: Option<&User>) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author: author.map_or_else(|| UNKNOWN_AUTHOR.to_string(), |u| u.name.clone()),
            avatar_url: author.map(|u| gravatar_url(&u.email)).unwrap_or_default(),
        }
    }
}

/// Load every distinct author referenced by `author_ids` in one lookup.
pub async fn load_authors(
    state: &AppState,
    author_ids: impl IntoIterator<Item = i32>,
) -> AppResult<HashMap<i32, User>> {
    let ids: Vec<i32> = author_ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    let users = state.users.find_by_ids(&ids).await?;

    Ok(users.into_iter().map(|user| (user.id, user)).collect())
}

/// A page about to be rendered: the shared layout context plus page values.
pub struct Page {
    context: Context,
    status: StatusCode,
}

impl Page {
    pub fn new(identity: Option<&User>, flashes: Vec<String>) -> Self {
        let mut context = Context::new();
        context.insert("current_user", &identity.map(UserView::from));
        context.insert("flashes", &flashes);
        Self {
            context,
            status: StatusCode::OK,
        }
    }

    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn render(self, templates: &Templates, name: &str) -> AppResult<HttpResponse> {
        let html = templates.render(name, &self.context)?;
        Ok(HttpResponse::build(self.status)
            .content_type("text/html; charset=utf-8")
            .body(html))
    }
}

/// Body of the error page.
pub fn error_page(
    templates: &Templates,
    identity: Option<&User>,
    problem: &ErrorResponse,
) -> Result<String, tera::Error> {
    let Page { mut context, .. } = Page::new(identity, Vec::new());
    context.insert("error", problem);
    templates.render("error.html", &context)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use quill_core::domain::{NewAccount, NewUser, Role};
    use quill_core::error::RepoError;
    use quill_core::ports::{BaseRepository, UserRepository};
    use quill_infra::InMemoryStore;

    use super::*;

    fn ada() -> User {
        User {
            id: 1,
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            name: "Ada".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_gravatar_ignores_case_and_whitespace() {
        let url = gravatar_url(" Ada@Example.com ");

        assert_eq!(url, gravatar_url("ada@example.com"));
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        // 32 bytes of SHA-256, hex encoded
        let hash = url.trim_start_matches("https://www.gravatar.com/avatar/");
        assert_eq!(hash.split('?').next().unwrap().len(), 64);
    }

    #[test]
    fn test_post_view_formats_date_and_author() {
        let post = BlogPost {
            id: 3,
            author_id: 1,
            title: "T".to_string(),
            subtitle: "S".to_string(),
            body: "<p>B</p>".to_string(),
            img_url: "U".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 8).unwrap(),
        };

        let view = PostView::new(post.clone(), Some(&ada()));
        assert_eq!(view.date, "October 08, 2026");
        assert_eq!(view.author, "Ada");

        assert_eq!(PostView::new(post, None).author, UNKNOWN_AUTHOR);
    }

    /// Counts lookups made against the wrapped store.
    struct CountingUsers {
        inner: InMemoryStore,
        single: AtomicUsize,
        batched: AtomicUsize,
    }

    #[async_trait]
    impl BaseRepository<User, NewUser, i32> for CountingUsers {
        async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
            self.single.fetch_add(1, Ordering::SeqCst);
            BaseRepository::<User, NewUser, i32>::find_by_id(&self.inner, id).await
        }

        async fn find_all(&self) -> Result<Vec<User>, RepoError> {
            BaseRepository::<User, NewUser, i32>::find_all(&self.inner).await
        }

        async fn create(&self, new: NewUser) -> Result<User, RepoError> {
            BaseRepository::<User, NewUser, i32>::create(&self.inner, new).await
        }
    }

    #[async_trait]
    impl UserRepository for CountingUsers {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            self.inner.find_by_email(email).await
        }

        async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError> {
            self.batched.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_ids(ids).await
        }

        async fn count(&self) -> Result<u64, RepoError> {
            self.inner.count().await
        }

        async fn register(&self, account: NewAccount) -> Result<User, RepoError> {
            self.inner.register(account).await
        }
    }

    #[actix_rt::test]
    async fn test_authors_are_loaded_in_one_lookup() {
        let users = Arc::new(CountingUsers {
            inner: InMemoryStore::new(),
            single: AtomicUsize::new(0),
            batched: AtomicUsize::new(0),
        });
        for n in 1..=3 {
            users
                .register(NewAccount::new(format!("u{n}@x.com"), "h".to_string(), format!("U{n}")))
                .await
                .unwrap();
        }
        let mut state = AppState::in_memory(
            Templates::builtin().unwrap(),
            Arc::new(quill_infra::Argon2PasswordService::new(&Default::default()).unwrap()),
        );
        state.users = users.clone();

        let authors = load_authors(&state, [3, 1, 3, 1, 9]).await.unwrap();

        assert_eq!(authors.len(), 2);
        assert_eq!(authors[&3].name, "U3");
        assert_eq!(users.batched.load(Ordering::SeqCst), 1);
        assert_eq!(users.single.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_user_view_hides_email() {
        let json = serde_json::to_value(UserView::from(&ada())).unwrap();

        assert_eq!(json["is_admin"], true);
        assert!(json.get("email").is_none());
    }
}
