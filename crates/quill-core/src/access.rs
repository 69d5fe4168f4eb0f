//! Access policy for guarded routes.
//!
//! A route declares an ordered list of [`Requirement`]s. [`evaluate`] checks
//! them in order against the identity attached to the request and stops at the
//! first one that fails, reporting why.

use std::fmt;

use crate::domain::User;

/// A precondition a request must satisfy before its handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Some identity is attached to the request.
    LoggedIn,
    /// The attached identity carries the administrator role.
    Admin,
}

impl Requirement {
    fn check(self, identity: Option<&User>) -> Decision {
        match (self, identity) {
            (_, None) => Decision::Deny(DenyReason::NotLoggedIn),
            (Requirement::LoggedIn, Some(_)) => Decision::Allow,
            (Requirement::Admin, Some(user)) if user.is_admin() => Decision::Allow,
            (Requirement::Admin, Some(_)) => Decision::Deny(DenyReason::NotAdmin),
        }
    }
}

/// Outcome of evaluating a set of requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotLoggedIn,
    NotAdmin,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NotLoggedIn => f.write_str("login required"),
            DenyReason::NotAdmin => f.write_str("administrator role required"),
        }
    }
}

/// Check `requirements` in order; the first failing one decides.
pub fn evaluate(identity: Option<&User>, requirements: &[Requirement]) -> Decision {
    requirements
        .iter()
        .map(|requirement| requirement.check(identity))
        .find(|decision| !decision.is_allowed())
        .unwrap_or(Decision::Allow)
}
