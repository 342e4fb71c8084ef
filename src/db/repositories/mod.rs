pub mod catalog;
pub mod comment;
pub mod confirmation;
pub mod review;
pub mod title;
pub mod user;

use sea_orm::{DbErr, SqlErr};

/// Result of a write that may collide with a unique constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    Written(T),
    Duplicate,
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
