use chrono::NaiveDate;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use quill_core::domain::{BlogPost, NewAccount, NewUser, Role, User};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, PostRepository, UserRepository};

use crate::database::entity::{blog_post, comment, user};
use crate::database::sea_repo::{SeaCommentRepository, SeaPostRepository, SeaUserRepository};

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

fn user_model(id: i32, role: &str) -> user::Model {
    user::Model {
        id,
        email: "ada@example.com".to_owned(),
        password_hash: "$argon2id$hash".to_owned(),
        name: "Ada".to_owned(),
        role: role.to_owned(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![blog_post::Model {
            id: 3,
            author_id: 1,
            title: "Test Post".to_owned(),
            subtitle: "Sub".to_owned(),
            body: "<p>Body</p>".to_owned(),
            img_url: "https://img.example/3.png".to_owned(),
            date,
        }]])
        .into_connection();

    let repo = SeaPostRepository::new(db);
    let posts: &dyn PostRepository = &repo;

    let result: Option<BlogPost> = posts.find_by_id(3).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, 3);
    assert_eq!(post.display_date(), "October 18, 2026");
}

#[tokio::test]
async fn test_find_user_by_email_maps_role() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(1, "admin")]])
        .append_query_results(vec![vec![user_model(2, "superuser")]])
        .into_connection();

    let repo = SeaUserRepository::new(db);

    let admin = repo.find_by_email("ada@example.com").await.unwrap().unwrap();
    let unknown = repo.find_by_email("ada@example.com").await.unwrap().unwrap();

    assert!(admin.is_admin());
    assert_eq!(unknown.role, Role::Reader);
}

#[tokio::test]
async fn test_create_user_returns_assigned_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(1, "admin")]])
        .into_connection();

    let repo = SeaUserRepository::new(db);
    let users: &dyn UserRepository = &repo;

    let user: User = users
        .create(NewUser::new(
            "ada@example.com".to_owned(),
            "$argon2id$hash".to_owned(),
            "Ada".to_owned(),
            Role::Admin,
        ))
        .await
        .unwrap();

    assert_eq!(user.id, 1);
    assert_eq!(user.role, Role::Admin);
}

fn account() -> NewAccount {
    NewAccount::new(
        "ada@example.com".to_owned(),
        "$argon2id$hash".to_owned(),
        "Ada".to_owned(),
    )
}

#[tokio::test]
async fn test_register_promotes_when_no_admin_exists() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(1, "reader")]])
        .append_exec_results(vec![exec(1)])
        .into_connection();

    let repo = SeaUserRepository::new(db);

    let user = repo.register(account()).await.unwrap();

    assert_eq!(user.id, 1);
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn test_register_stays_reader_when_admin_exists() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user_model(2, "reader")]])
        .append_exec_results(vec![exec(0)])
        .into_connection();

    let repo = SeaUserRepository::new(db);

    let user = repo.register(account()).await.unwrap();

    assert_eq!(user.role, Role::Reader);
}

#[tokio::test]
async fn test_delete_with_comments_reports_removed_comments() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![exec(2), exec(1)])
        .into_connection();

    let repo = SeaPostRepository::new(db);

    assert_eq!(repo.delete_with_comments(5).await.unwrap(), 2);
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![exec(0), exec(0)])
        .into_connection();

    let repo = SeaPostRepository::new(db);

    assert!(matches!(
        repo.delete_with_comments(5).await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_comments_for_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            comment::Model {
                id: 1,
                post_id: 3,
                author_id: 2,
                text: "first".to_owned(),
            },
            comment::Model {
                id: 4,
                post_id: 3,
                author_id: 1,
                text: "second".to_owned(),
            },
        ]])
        .append_exec_results(vec![exec(0)])
        .into_connection();

    let repo = SeaCommentRepository::new(db);

    let comments = repo.find_by_post(3).await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[1].text, "second");

    assert!(matches!(repo.delete(99).await, Err(RepoError::NotFound)));
}
