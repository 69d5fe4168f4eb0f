//! Session helpers wrapping `actix_session::Session`.

use std::future::{Ready, ready};

use actix_session::{Session, SessionExt, SessionGetError, SessionInsertError};
use actix_web::{FromRequest, HttpRequest, dev::Payload};

use crate::middleware::error::AppError;

const USER_ID_KEY: &str = "user_id";
const FLASHES_KEY: &str = "_flashes";

/// Typed access to the values this application keeps in the session cookie.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Id of the logged-in user, if any.
    pub fn user_id(&self) -> Result<Option<i32>, AppError> {
        self.0.get::<i32>(USER_ID_KEY).map_err(get_err)
    }

    /// Make `user_id` the session identity.
    ///
    /// The session is renewed first so a pre-login cookie cannot be reused.
    pub fn persist_user(&self, user_id: i32) -> Result<(), AppError> {
        self.0.renew();
        self.0.insert(USER_ID_KEY, user_id).map_err(insert_err)
    }

    /// Drop the identity and every other session value.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Queue a one-shot message for the next rendered page.
    pub fn flash(&self, message: impl Into<String>) -> Result<(), AppError> {
        let mut pending = self.peek_flashes()?;
        pending.push(message.into());
        self.0.insert(FLASHES_KEY, pending).map_err(insert_err)
    }

    /// Remove and return the queued messages.
    pub fn take_flashes(&self) -> Result<Vec<String>, AppError> {
        let pending = self.peek_flashes()?;
        if !pending.is_empty() {
            self.0.remove(FLASHES_KEY);
        }
        Ok(pending)
    }

    fn peek_flashes(&self) -> Result<Vec<String>, AppError> {
        Ok(self
            .0
            .get::<Vec<String>>(FLASHES_KEY)
            .map_err(get_err)?
            .unwrap_or_default())
    }
}

fn get_err(e: SessionGetError) -> AppError {
    AppError::Internal(format!("session read failed: {e}"))
}

fn insert_err(e: SessionInsertError) -> AppError {
    AppError::Internal(format!("session write failed: {e}"))
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(SessionContext(req.get_session())))
    }
}
