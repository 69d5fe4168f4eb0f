//! SeaORM repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

use quill_core::domain::{BlogPost, Comment, NewAccount, Role, User};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, PostRepository, UserRepository};

use super::entity::blog_post::{self, Entity as PostEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::sea_base::{SeaBaseRepository, query_err, write_err};

/// SeaORM user repository.
pub type SeaUserRepository = SeaBaseRepository<UserEntity>;

/// SeaORM blog post repository.
pub type SeaPostRepository = SeaBaseRepository<PostEntity>;

/// SeaORM comment repository.
pub type SeaCommentRepository = SeaBaseRepository<CommentEntity>;

/// Mask an email address so it can be logged without leaking PII.
pub(crate) fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for SeaUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn())
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(self.conn())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        UserEntity::find().count(self.conn()).await.map_err(query_err)
    }

    /// Insert as a reader, then promote in one conditional `UPDATE`.
    ///
    /// The partial unique index on `role = 'admin'` rejects a second
    /// promotion that raced past the `NOT EXISTS` check; that account stays
    /// a reader.
    async fn register(&self, account: NewAccount) -> Result<User, RepoError> {
        let reader: user::ActiveModel = account.with_role(Role::Reader).into();
        let mut user: User = reader.insert(self.conn()).await.map_err(write_err)?.into();

        let existing_admin = Query::select()
            .expr(Expr::val(1))
            .from(UserEntity)
            .and_where(user::Column::Role.eq(Role::Admin.as_str()))
            .to_owned();

        let promoted = UserEntity::update_many()
            .col_expr(user::Column::Role, Expr::value(Role::Admin.as_str()))
            .filter(user::Column::Id.eq(user.id))
            .filter(Expr::exists(existing_admin).not())
            .exec(self.conn())
            .await
            .map_err(write_err);

        match promoted {
            Ok(result) if result.rows_affected == 1 => user.role = Role::Admin,
            Ok(_) => {}
            Err(RepoError::Constraint(_)) => {
                tracing::debug!(user_id = user.id, "Lost the race to become administrator");
            }
            Err(e) => return Err(e),
        }

        Ok(user)
    }
}

#[async_trait]
impl PostRepository for SeaPostRepository {
    async fn update(&self, post: BlogPost) -> Result<BlogPost, RepoError> {
        let active_model: blog_post::ActiveModel = post.into();
        let model = active_model.update(self.conn()).await.map_err(write_err)?;

        Ok(model.into())
    }

    async fn delete_with_comments(&self, id: i32) -> Result<u64, RepoError> {
        let txn = self.conn().begin().await.map_err(write_err)?;

        let comments = CommentEntity::delete_many()
            .filter(comment::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(write_err)?;

        let post = PostEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(write_err)?;

        if post.rows_affected == 0 {
            txn.rollback().await.map_err(write_err)?;
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(write_err)?;
        tracing::debug!(
            post_id = id,
            comments_removed = comments.rows_affected,
            "Deleted post with comments"
        );

        Ok(comments.rows_affected)
    }
}

#[async_trait]
impl CommentRepository for SeaCommentRepository {
    async fn find_by_post(&self, post_id: i32) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::Id)
            .all(self.conn())
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = CommentEntity::delete_by_id(id)
            .exec(self.conn())
            .await
            .map_err(write_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("ada@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
