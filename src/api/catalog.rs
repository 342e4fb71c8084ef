use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery, CurrentActor};
use super::validation::{normalize_search, validate_page};
use super::{
    ApiError, ApiResponse, AppState, CatalogEntryRequest, CategoryDto, GenreDto, ListQuery, Page,
};

// ============================================================================
// Categories
// ============================================================================

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ApiResponse<Page<CategoryDto>>>, ApiError> {
    let (limit, offset) = validate_page(query.limit, query.offset, &state.pagination().await)?;
    let page = state
        .catalog_service()
        .list_categories(normalize_search(query.search.as_deref()), limit, offset)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiJson(payload): ApiJson<CatalogEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>), ApiError> {
    let category = state
        .catalog_service()
        .create_category(&actor, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(category))))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(slug): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    state
        .catalog_service()
        .delete_category(&actor, &slug)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Genres
// ============================================================================

pub async fn list_genres(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ApiResponse<Page<GenreDto>>>, ApiError> {
    let (limit, offset) = validate_page(query.limit, query.offset, &state.pagination().await)?;
    let page = state
        .catalog_service()
        .list_genres(normalize_search(query.search.as_deref()), limit, offset)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiJson(payload): ApiJson<CatalogEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GenreDto>>), ApiError> {
    let genre = state.catalog_service().create_genre(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(genre))))
}

pub async fn delete_genre(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(slug): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    state.catalog_service().delete_genre(&actor, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
