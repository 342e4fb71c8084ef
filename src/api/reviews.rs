use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath, ApiQuery, CurrentActor};
use super::validation::{validate_id, validate_page};
use super::{
    ApiError, ApiResponse, AppState, CommentDto, CommentRequest, CreateReviewRequest, ListQuery,
    Page, ReviewDto, UpdateReviewRequest,
};

fn review_path(title_id: i32, review_id: i32) -> Result<(i32, i32), ApiError> {
    Ok((
        validate_id("title", title_id)?,
        validate_id("review", review_id)?,
    ))
}

// ============================================================================
// Reviews
// ============================================================================

pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    ApiPath(title_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ApiResponse<Page<ReviewDto>>>, ApiError> {
    let title_id = validate_id("title", title_id)?;
    let (limit, offset) = validate_page(query.limit, query.offset, &state.pagination().await)?;
    let page = state
        .review_service()
        .list_reviews(title_id, limit, offset)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(title_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewDto>>), ApiError> {
    let title_id = validate_id("title", title_id)?;
    let review = state
        .review_service()
        .create_review(&actor, title_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(review))))
}

pub async fn get_review(
    State(state): State<Arc<AppState>>,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
) -> Result<Json<ApiResponse<ReviewDto>>, ApiError> {
    let (title_id, review_id) = review_path(title_id, review_id)?;
    let review = state
        .review_service()
        .get_review(title_id, review_id)
        .await?;
    Ok(Json(ApiResponse::success(review)))
}

pub async fn update_review(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
    ApiJson(payload): ApiJson<UpdateReviewRequest>,
) -> Result<Json<ApiResponse<ReviewDto>>, ApiError> {
    let (title_id, review_id) = review_path(title_id, review_id)?;
    let review = state
        .review_service()
        .update_review(&actor, title_id, review_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(review)))
}

pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let (title_id, review_id) = review_path(title_id, review_id)?;
    state
        .review_service()
        .delete_review(&actor, title_id, review_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Comments
// ============================================================================

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ApiResponse<Page<CommentDto>>>, ApiError> {
    let (title_id, review_id) = review_path(title_id, review_id)?;
    let (limit, offset) = validate_page(query.limit, query.offset, &state.pagination().await)?;
    let page = state
        .review_service()
        .list_comments(title_id, review_id, limit, offset)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath((title_id, review_id)): ApiPath<(i32, i32)>,
    ApiJson(payload): ApiJson<CommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentDto>>), ApiError> {
    let (title_id, review_id) = review_path(title_id, review_id)?;
    let comment = state
        .review_service()
        .create_comment(&actor, title_id, review_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(comment))))
}

pub async fn get_comment(
    State(state): State<Arc<AppState>>,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(i32, i32, i32)>,
) -> Result<Json<ApiResponse<CommentDto>>, ApiError> {
    let (title_id, review_id) = review_path(title_id, review_id)?;
    let comment_id = validate_id("comment", comment_id)?;
    let comment = state
        .review_service()
        .get_comment(title_id, review_id, comment_id)
        .await?;
    Ok(Json(ApiResponse::success(comment)))
}

pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(i32, i32, i32)>,
    ApiJson(payload): ApiJson<CommentRequest>,
) -> Result<Json<ApiResponse<CommentDto>>, ApiError> {
    let (title_id, review_id) = review_path(title_id, review_id)?;
    let comment_id = validate_id("comment", comment_id)?;
    let comment = state
        .review_service()
        .update_comment(&actor, title_id, review_id, comment_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(comment)))
}

pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    CurrentActor(actor): CurrentActor,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(i32, i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let (title_id, review_id) = review_path(title_id, review_id)?;
    let comment_id = validate_id("comment", comment_id)?;
    state
        .review_service()
        .delete_comment(&actor, title_id, review_id, comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
