//! Blog post pages: the index, single posts, and administration.

use actix_web::{HttpResponse, http::StatusCode, web};
use quill_core::DomainError;
use quill_core::domain::{BlogPost, NewPost, PostDraft, User};
use quill_shared::FormErrors;
use quill_shared::forms::{CommentForm, PostForm, PostInput};

use super::redirect;
use crate::middleware::auth::{CurrentUser, MaybeUser};
use crate::middleware::error::AppResult;
use crate::session::SessionContext;
use crate::state::AppState;
use crate::views::{CommentView, Page, PostView, UserView, load_authors};

/// Load a post or fail with a typed 404.
pub(super) async fn find_post(state: &AppState, post_id: i32) -> AppResult<BlogPost> {
    state.posts.find_by_id(post_id).await?.ok_or_else(|| {
        DomainError::NotFound {
            entity_type: "Post",
            id: post_id,
        }
        .into()
    })
}

/// Render the single-post page with its comments and the comment form.
pub(super) async fn render_post_page(
    state: &AppState,
    page: Page,
    post: BlogPost,
    form: &CommentForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let comments = state.comments.find_by_post(post.id).await?;
    let authors = load_authors(
        state,
        comments.iter().map(|c| c.author_id).chain([post.author_id]),
    )
    .await?;

    let comments: Vec<CommentView> = comments
        .into_iter()
        .map(|c| {
            let author = authors.get(&c.author_id);
            CommentView::new(c, author)
        })
        .collect();
    let post_author = authors.get(&post.author_id);
    let post = PostView::new(post, post_author);

    page.with("post", &post)
        .with("comments", &comments)
        .with("form", form)
        .with("errors", errors)
        .render(&state.templates, "post.html")
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    session: SessionContext,
    identity: MaybeUser,
) -> AppResult<HttpResponse> {
    let posts = state.posts.find_all().await?;
    let authors = load_authors(&state, posts.iter().map(|p| p.author_id)).await?;
    let posts: Vec<PostView> = posts
        .into_iter()
        .map(|p| {
            let author = authors.get(&p.author_id);
            PostView::new(p, author)
        })
        .collect();

    Page::new(identity.user(), session.take_flashes()?)
        .with("posts", &posts)
        .render(&state.templates, "index.html")
}

/// GET /post/{post_id}
pub async fn show_post(
    state: web::Data<AppState>,
    session: SessionContext,
    identity: MaybeUser,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    let page = Page::new(identity.user(), session.take_flashes()?);

    render_post_page(&state, page, post, &CommentForm::default(), &FormErrors::new()).await
}

/// Where the post form submits, and what the page shows above it.
enum Editing {
    New,
    Existing { post_id: i32, authors: Vec<UserView> },
}

fn post_form(
    state: &AppState,
    page: Page,
    editing: &Editing,
    form: &PostForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    let page = match editing {
        Editing::New => page.with("is_edit", &false),
        Editing::Existing { post_id, authors } => page
            .with("is_edit", &true)
            .with("post_id", post_id)
            .with("authors", authors),
    };

    page.with("form", form)
        .with("errors", errors)
        .render(&state.templates, "make-post.html")
}

fn draft(input: PostInput) -> PostDraft {
    PostDraft {
        title: input.title,
        subtitle: input.subtitle,
        body: input.body,
        img_url: input.img_url,
    }
}

/// GET /new-post
pub async fn new_post_page(
    state: web::Data<AppState>,
    session: SessionContext,
    user: CurrentUser,
) -> AppResult<HttpResponse> {
    let page = Page::new(Some(&user.0), session.take_flashes()?);
    post_form(&state, page, &Editing::New, &PostForm::default(), &FormErrors::new())
}

/// POST /new-post
///
/// The logged-in administrator becomes the author; the date is today.
pub async fn create_post(
    state: web::Data<AppState>,
    session: SessionContext,
    user: CurrentUser,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let CurrentUser(user) = user;
    let form = form.into_inner();

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let page = Page::new(Some(&user), session.take_flashes()?)
                .status(StatusCode::UNPROCESSABLE_ENTITY);
            return post_form(&state, page, &Editing::New, &form, &errors);
        }
    };

    let today = chrono::Local::now().date_naive();
    let post = state
        .posts
        .create(NewPost::new(draft(input), user.id, today))
        .await?;
    tracing::info!(post_id = post.id, author_id = user.id, "Post created");

    Ok(redirect("/"))
}

async fn author_choices(state: &AppState) -> AppResult<Vec<UserView>> {
    Ok(state.users.find_all().await?.iter().map(UserView::from).collect())
}

fn form_for(post: &BlogPost) -> PostForm {
    PostForm {
        title: post.title.clone(),
        subtitle: post.subtitle.clone(),
        img_url: post.img_url.clone(),
        author: Some(post.author_id.to_string()),
        body: post.body.clone(),
    }
}

/// GET /edit-post/{post_id}
pub async fn edit_post_page(
    state: web::Data<AppState>,
    session: SessionContext,
    user: CurrentUser,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    let editing = Editing::Existing {
        post_id: post.id,
        authors: author_choices(&state).await?,
    };

    let page = Page::new(Some(&user.0), session.take_flashes()?);
    post_form(&state, page, &editing, &form_for(&post), &FormErrors::new())
}

/// The chosen author, if it names an existing account.
async fn chosen_author(state: &AppState, input: &PostInput) -> AppResult<Option<User>> {
    match input.author_id {
        Some(id) => Ok(state.users.find_by_id(id).await?),
        None => Ok(None),
    }
}

/// POST /edit-post/{post_id}
///
/// Every editable field is overwritten; the creation date is kept.
pub async fn update_post(
    state: web::Data<AppState>,
    session: SessionContext,
    user: CurrentUser,
    path: web::Path<i32>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let CurrentUser(user) = user;
    let mut post = find_post(&state, path.into_inner()).await?;
    let form = form.into_inner();

    let validated = match form.validate_edit() {
        Ok(input) => match chosen_author(&state, &input).await? {
            Some(author) => Ok((input, author)),
            None => {
                let mut errors = FormErrors::new();
                errors.add("author", "Not a valid choice.");
                Err(errors)
            }
        },
        Err(errors) => Err(errors),
    };

    let (input, author) = match validated {
        Ok(valid) => valid,
        Err(errors) => {
            let editing = Editing::Existing {
                post_id: post.id,
                authors: author_choices(&state).await?,
            };
            let page = Page::new(Some(&user), session.take_flashes()?)
                .status(StatusCode::UNPROCESSABLE_ENTITY);
            return post_form(&state, page, &editing, &form, &errors);
        }
    };

    post.apply_edit(draft(input), author.id);
    let post = state.posts.update(post).await?;
    tracing::info!(post_id = post.id, editor_id = user.id, "Post updated");

    Ok(redirect(&format!("/post/{}", post.id)))
}

/// GET /delete/{post_id}
///
/// Removes the post together with all of its comments.
pub async fn delete_post(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = find_post(&state, post_id).await?;

    let comments_removed = state.posts.delete_with_comments(post.id).await?;
    tracing::info!(
        post_id,
        comments_removed,
        admin_id = user.0.id,
        "Post deleted"
    );

    Ok(redirect("/"))
}
