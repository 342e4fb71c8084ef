use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::Role;
use crate::entities::{categories, genres, users};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    /// Total matching rows, ignoring `limit`/`offset`.
    pub count: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub const fn new(results: Vec<T>, count: u64) -> Self {
        Self { count, results }
    }
}

/// Tells "absent" (`None`) apart from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TitleQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub year: Option<i32>,
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDto {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<users::Model> for UserDto {
    fn from(user: users::Model) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDto {
    pub name: String,
    pub slug: String,
}

impl From<categories::Model> for CategoryDto {
    fn from(model: categories::Model) -> Self {
        Self {
            name: model.name,
            slug: model.slug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreDto {
    pub name: String,
    pub slug: String,
}

impl From<genres::Model> for GenreDto {
    fn from(model: genres::Model) -> Self {
        Self {
            name: model.name,
            slug: model.slug,
        }
    }
}

/// Body for creating a category or a genre.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogEntryRequest {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleDto {
    pub id: i32,
    pub name: String,
    pub year: i32,
    /// Rounded mean review score; `null` until the first review.
    pub rating: Option<i32>,
    pub description: Option<String>,
    pub genre: Vec<GenreDto>,
    pub category: Option<CategoryDto>,
}

impl From<crate::db::TitleRecord> for TitleDto {
    fn from(record: crate::db::TitleRecord) -> Self {
        Self {
            id: record.title.id,
            name: record.title.name,
            year: record.title.year,
            rating: record.rating,
            description: record.title.description,
            genre: record.genres.into_iter().map(GenreDto::from).collect(),
            category: record.category.map(CategoryDto::from),
        }
    }
}

/// Titles reference their category and genres by slug.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTitleRequest {
    pub name: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub genre: Vec<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
    #[serde(deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
}

// ============================================================================
// Reviews & comments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewDto {
    pub id: i32,
    pub text: String,
    /// Author username.
    pub author: String,
    pub score: i32,
    pub pub_date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateReviewRequest {
    pub text: String,
    pub score: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateReviewRequest {
    pub text: Option<String>,
    pub score: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentDto {
    pub id: i32,
    pub text: String,
    pub author: String,
    pub pub_date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentRequest {
    pub text: String,
}

// ============================================================================
// System
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_title_distinguishes_null_from_absent() {
        let absent: UpdateTitleRequest = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(absent.category, None);
        assert_eq!(absent.description, None);

        let cleared: UpdateTitleRequest =
            serde_json::from_str(r#"{"category": null, "description": null}"#).unwrap();
        assert_eq!(cleared.category, Some(None));
        assert_eq!(cleared.description, Some(None));

        let set: UpdateTitleRequest = serde_json::from_str(r#"{"category": "film"}"#).unwrap();
        assert_eq!(set.category, Some(Some("film".to_string())));
    }

    #[test]
    fn test_missing_fields_default() {
        let req: SignupRequest = serde_json::from_str("{}").unwrap();
        assert!(req.username.is_empty());
        assert!(req.email.is_empty());
    }

    #[test]
    fn test_role_deserializes_lowercase() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"role": "moderator"}"#).unwrap();
        assert_eq!(req.role, Some(Role::Moderator));
        assert!(serde_json::from_str::<UpdateUserRequest>(r#"{"role": "god"}"#).is_err());
    }
}
