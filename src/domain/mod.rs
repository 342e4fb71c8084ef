//! Identity primitives shared by the access-control evaluator and services.
//!
//! Every mutating service call takes an [`Actor`] explicitly; nothing reads
//! the caller's identity from ambient request context.

pub mod access;
pub mod rating;
pub mod validation;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of user roles.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "moderator")]
    Moderator,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            other => Err(format!(
                "Unknown role '{other}', expected one of: user, moderator, admin"
            )),
        }
    }
}

/// An authenticated user as seen by the access-control evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub is_superuser: bool,
}

impl Principal {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_superuser || matches!(self.role, Role::Admin)
    }

    #[must_use]
    pub const fn is_moderator(&self) -> bool {
        matches!(self.role, Role::Moderator)
    }

    /// Moderator, admin or superuser.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.is_admin() || self.is_moderator()
    }
}

/// The identity behind a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Actor {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl Actor {
    #[must_use]
    pub const fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(p) => Some(p),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub fn user_id(&self) -> Option<i32> {
        self.principal().map(|p| p.id)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.principal().is_some_and(Principal::is_admin)
    }
}

impl From<Principal> for Actor {
    fn from(principal: Principal) -> Self {
        Self::Authenticated(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role, is_superuser: bool) -> Principal {
        Principal {
            id: 1,
            username: "alice".to_string(),
            role,
            is_superuser,
        }
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_superuser_is_admin_regardless_of_role() {
        assert!(principal(Role::User, true).is_admin());
        assert!(principal(Role::Admin, false).is_admin());
        assert!(!principal(Role::Moderator, false).is_admin());
    }

    #[test]
    fn test_privileged() {
        assert!(principal(Role::Moderator, false).is_privileged());
        assert!(principal(Role::Admin, false).is_privileged());
        assert!(!principal(Role::User, false).is_privileged());
    }

    #[test]
    fn test_anonymous_has_no_identity() {
        let actor = Actor::default();
        assert!(!actor.is_authenticated());
        assert_eq!(actor.user_id(), None);
        assert!(!actor.is_admin());
    }
}
