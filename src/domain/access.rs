//! Access-control evaluator.
//!
//! [`allowed`] is a pure decision over `(actor, action, resource)`. Each
//! resource kind maps to exactly one of three policies:
//!
//! | Resource                 | Policy                 |
//! |--------------------------|------------------------|
//! | category, genre, title   | [`Policy::AdminOrReadOnly`] |
//! | review, comment          | [`Policy::AuthorOrPrivileged`] |
//! | user account management  | [`Policy::AdminOnly`]  |

use super::{Actor, Principal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Only reads are safe.
    #[must_use]
    pub const fn is_safe(self) -> bool {
        matches!(self, Self::Read)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Category,
    Genre,
    Title,
    /// `author_id` is `None` for a review that does not exist yet.
    Review { author_id: Option<i32> },
    Comment { author_id: Option<i32> },
    Account,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    AdminOrReadOnly,
    AuthorOrPrivileged,
    AdminOnly,
}

impl Resource {
    #[must_use]
    pub const fn policy(self) -> Policy {
        match self {
            Self::Category | Self::Genre | Self::Title => Policy::AdminOrReadOnly,
            Self::Review { .. } | Self::Comment { .. } => Policy::AuthorOrPrivileged,
            Self::Account => Policy::AdminOnly,
        }
    }

    const fn author_id(self) -> Option<i32> {
        match self {
            Self::Review { author_id } | Self::Comment { author_id } => author_id,
            _ => None,
        }
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Forbidden,
}

#[must_use]
pub fn allowed(actor: &Actor, action: Action, resource: Resource) -> bool {
    match resource.policy() {
        Policy::AdminOrReadOnly => admin_or_read_only(actor, action),
        Policy::AuthorOrPrivileged => author_or_privileged(actor, action, resource.author_id()),
        Policy::AdminOnly => admin_only(actor),
    }
}

/// Like [`allowed`], but says whether a denial is an authentication or an
/// authorization failure.
pub fn authorize(actor: &Actor, action: Action, resource: Resource) -> Result<(), Denial> {
    if allowed(actor, action, resource) {
        Ok(())
    } else if actor.is_authenticated() {
        Err(Denial::Forbidden)
    } else {
        Err(Denial::Unauthenticated)
    }
}

fn admin_or_read_only(actor: &Actor, action: Action) -> bool {
    if action.is_safe() {
        return true;
    }
    actor.principal().is_some_and(Principal::is_admin)
}

fn author_or_privileged(actor: &Actor, action: Action, author_id: Option<i32>) -> bool {
    if action.is_safe() {
        return true;
    }
    let Some(principal) = actor.principal() else {
        return false;
    };
    if principal.is_privileged() {
        return true;
    }
    match (action, author_id) {
        // The creator becomes the author.
        (Action::Create, None) => true,
        (_, Some(author_id)) => author_id == principal.id,
        _ => false,
    }
}

fn admin_only(actor: &Actor) -> bool {
    actor.principal().is_some_and(Principal::is_admin)
}
