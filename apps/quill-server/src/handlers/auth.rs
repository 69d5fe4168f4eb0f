//! Registration, login, and logout.

use actix_web::{HttpResponse, http::StatusCode, web};
use quill_core::domain::{NewAccount, User};
use quill_core::error::RepoError;
use quill_core::ports::AuthError;
use quill_shared::forms::{Credentials, LoginForm, RegisterForm};
use quill_shared::FormErrors;

use super::redirect;
use crate::middleware::auth::MaybeUser;
use crate::middleware::error::AppResult;
use crate::session::SessionContext;
use crate::state::AppState;
use crate::views::Page;

const ALREADY_REGISTERED: &str = "You've already registered with that email, log in instead!";

fn register_form(
    state: &AppState,
    page: Page,
    form: &RegisterForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    page.with("form", form)
        .with("errors", errors)
        .render(&state.templates, "register.html")
}

fn login_form(
    state: &AppState,
    page: Page,
    form: &LoginForm,
    errors: &FormErrors,
) -> AppResult<HttpResponse> {
    page.with("form", form)
        .with("errors", errors)
        .render(&state.templates, "login.html")
}

/// GET /register
pub async fn register_page(
    state: web::Data<AppState>,
    session: SessionContext,
    identity: MaybeUser,
) -> AppResult<HttpResponse> {
    let page = Page::new(identity.user(), session.take_flashes()?);
    register_form(&state, page, &RegisterForm::default(), &FormErrors::new())
}

/// POST /register
///
/// The first account ever created becomes the administrator.
pub async fn register(
    state: web::Data<AppState>,
    session: SessionContext,
    identity: MaybeUser,
    form: web::Form<RegisterForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(errors) => {
            let page = Page::new(identity.user(), session.take_flashes()?)
                .status(StatusCode::UNPROCESSABLE_ENTITY);
            return register_form(&state, page, &form, &errors);
        }
    };

    if state.users.find_by_email(&registration.email).await?.is_some() {
        session.flash(ALREADY_REGISTERED)?;
        return Ok(redirect("/login"));
    }

    let password_hash = state.passwords.hash(&registration.password)?;
    let account = NewAccount::new(registration.email, password_hash, registration.name);

    let user = match state.users.register(account).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration for the same email.
        Err(RepoError::Constraint(_)) => {
            session.flash(ALREADY_REGISTERED)?;
            return Ok(redirect("/login"));
        }
        Err(e) => return Err(e.into()),
    };

    session.persist_user(user.id)?;
    tracing::info!(user_id = user.id, role = %user.role, "User registered");

    Ok(redirect("/"))
}

/// GET /login
pub async fn login_page(
    state: web::Data<AppState>,
    session: SessionContext,
    identity: MaybeUser,
) -> AppResult<HttpResponse> {
    let page = Page::new(identity.user(), session.take_flashes()?);
    login_form(&state, page, &LoginForm::default(), &FormErrors::new())
}

/// The account matching `credentials`, or `None` when the email is unknown
/// or the password is wrong.
async fn authenticate(state: &AppState, credentials: &Credentials) -> AppResult<Option<User>> {
    let Some(user) = state.users.find_by_email(&credentials.email).await? else {
        return Ok(None);
    };

    let verified = state.passwords.verify(&credentials.password, &user.password_hash)?;
    Ok(verified.then_some(user))
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    session: SessionContext,
    identity: MaybeUser,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let mut flashes = session.take_flashes()?;

    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            let page =
                Page::new(identity.user(), flashes).status(StatusCode::UNPROCESSABLE_ENTITY);
            return login_form(&state, page, &form, &errors);
        }
    };

    match authenticate(&state, &credentials).await? {
        Some(user) => {
            session.persist_user(user.id)?;
            tracing::info!(user_id = user.id, "User logged in");
            Ok(redirect("/"))
        }
        None => {
            tracing::info!("Login rejected");
            flashes.push(AuthError::InvalidCredentials.to_string());
            let page = Page::new(identity.user(), flashes);
            login_form(&state, page, &form, &FormErrors::new())
        }
    }
}

/// GET /logout
pub async fn logout(session: SessionContext, identity: MaybeUser) -> HttpResponse {
    if let Some(user) = identity.user() {
        tracing::info!(user_id = user.id, "User logged out");
    }
    session.purge();
    redirect("/")
}
