pub mod prelude;

pub mod categories;
pub mod comments;
pub mod confirmation_codes;
pub mod genres;
pub mod reviews;
pub mod title_genres;
pub mod titles;
pub mod users;
