use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery, CurrentActor};
use super::validation::{normalize_search, validate_page};
use super::{
    ApiError, ApiResponse, AppState, CreateUserRequest, ListQuery, Page, UpdateUserRequest,
    UserDto,
};

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ApiResponse<Page<UserDto>>>, ApiError> {
    let (limit, offset) = validate_page(query.limit, query.offset, &state.pagination().await)?;
    let page = state
        .user_service()
        .list(&actor, normalize_search(query.search.as_deref()), limit, offset)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let user = state.user_service().create(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.user_service().get(&actor, &username).await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(username): ApiPath<String>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .user_service()
        .update(&actor, &username, payload)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(username): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    state.user_service().delete(&actor, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.user_service().me(&actor).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PATCH /users/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.user_service().update_me(&actor, payload).await?;
    Ok(Json(ApiResponse::success(user)))
}
