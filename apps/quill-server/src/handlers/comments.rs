//! Comments on a single post.

use actix_web::{HttpResponse, http::StatusCode, web};
use quill_core::DomainError;
use quill_core::domain::NewComment;
use quill_core::error::RepoError;
use quill_shared::FormErrors;
use quill_shared::forms::CommentForm;

use super::posts::{find_post, render_post_page};
use super::redirect;
use crate::middleware::auth::CurrentUser;
use crate::middleware::error::AppResult;
use crate::session::SessionContext;
use crate::state::AppState;
use crate::views::Page;

/// POST /post/{post_id}
///
/// On success the post page is shown again with an empty comment form.
pub async fn create_comment(
    state: web::Data<AppState>,
    session: SessionContext,
    user: CurrentUser,
    path: web::Path<i32>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let CurrentUser(user) = user;
    let post = find_post(&state, path.into_inner()).await?;
    let form = form.into_inner();

    let text = match form.validate() {
        Ok(text) => text,
        Err(errors) => {
            let page = Page::new(Some(&user), session.take_flashes()?)
                .status(StatusCode::UNPROCESSABLE_ENTITY);
            return render_post_page(&state, page, post, &form, &errors).await;
        }
    };

    let comment = match state
        .comments
        .create(NewComment::new(post.id, user.id, text))
        .await
    {
        Ok(comment) => comment,
        // The post was deleted between loading and inserting.
        Err(RepoError::Constraint(_)) => {
            return Err(DomainError::NotFound {
                entity_type: "Post",
                id: post.id,
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(
        comment_id = comment.id,
        post_id = post.id,
        author_id = user.id,
        "Comment added"
    );

    let page = Page::new(Some(&user), session.take_flashes()?);
    render_post_page(&state, page, post, &CommentForm::default(), &FormErrors::new()).await
}

/// GET /{post_id}/comment/{comment_id}/delete
pub async fn delete_comment(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(i32, i32)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();

    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|c| c.post_id == post_id)
        .ok_or(DomainError::NotFound {
            entity_type: "Comment",
            id: comment_id,
        })?;

    state.comments.delete(comment.id).await?;
    tracing::info!(comment_id, post_id, admin_id = user.0.id, "Comment deleted");

    Ok(redirect(&format!("/post/{}", comment.post_id)))
}
