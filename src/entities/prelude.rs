pub use super::categories::Entity as Categories;
pub use super::comments::Entity as Comments;
pub use super::confirmation_codes::Entity as ConfirmationCodes;
pub use super::genres::Entity as Genres;
pub use super::reviews::Entity as Reviews;
pub use super::title_genres::Entity as TitleGenres;
pub use super::titles::Entity as Titles;
pub use super::users::Entity as Users;
