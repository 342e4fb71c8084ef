use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery, CurrentActor};
use super::validation::{normalize_search, validate_id, validate_page};
use super::{
    ApiError, ApiResponse, AppState, CreateTitleRequest, Page, TitleDto, TitleQuery,
    UpdateTitleRequest,
};
use crate::db::TitleFilter;

/// GET /titles?category=&genre=&name=&year=
pub async fn list_titles(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<TitleQuery>,
) -> Result<Json<ApiResponse<Page<TitleDto>>>, ApiError> {
    let (limit, offset) = validate_page(query.limit, query.offset, &state.pagination().await)?;

    let filter = TitleFilter {
        category: normalize_search(query.category.as_deref()).map(str::to_string),
        genre: normalize_search(query.genre.as_deref()).map(str::to_string),
        name: normalize_search(query.name.as_deref()).map(str::to_string),
        year: query.year,
    };

    let page = state
        .catalog_service()
        .list_titles(&filter, limit, offset)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn get_title(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<TitleDto>>, ApiError> {
    let id = validate_id("title", id)?;
    let title = state.catalog_service().get_title(id).await?;
    Ok(Json(ApiResponse::success(title)))
}

pub async fn create_title(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiJson(payload): ApiJson<CreateTitleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TitleDto>>), ApiError> {
    let title = state
        .catalog_service()
        .create_title(&actor, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(title))))
}

pub async fn update_title(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateTitleRequest>,
) -> Result<Json<ApiResponse<TitleDto>>, ApiError> {
    let id = validate_id("title", id)?;
    let title = state
        .catalog_service()
        .update_title(&actor, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(title)))
}

pub async fn delete_title(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id("title", id)?;
    state.catalog_service().delete_title(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
