//! Static pages.

use actix_web::{HttpResponse, web};

use crate::middleware::auth::MaybeUser;
use crate::middleware::error::AppResult;
use crate::session::SessionContext;
use crate::state::AppState;
use crate::views::Page;

pub async fn about(
    state: web::Data<AppState>,
    session: SessionContext,
    identity: MaybeUser,
) -> AppResult<HttpResponse> {
    Page::new(identity.user(), session.take_flashes()?).render(&state.templates, "about.html")
}

pub async fn contact(
    state: web::Data<AppState>,
    session: SessionContext,
    identity: MaybeUser,
) -> AppResult<HttpResponse> {
    Page::new(identity.user(), session.take_flashes()?).render(&state.templates, "contact.html")
}
