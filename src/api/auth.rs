use axum::{Json, extract::State};
use std::sync::Arc;

use super::extract::ApiJson;
use super::{
    ApiError, ApiResponse, AppState, SignupRequest, SignupResponse, TokenRequest, TokenResponse,
};

/// POST /auth/signup
/// Registers the pair (or re-registers it) and mails a confirmation code.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<Json<ApiResponse<SignupResponse>>, ApiError> {
    let response = state
        .auth_service()
        .signup(payload.username.trim(), payload.email.trim())
        .await?;

    Ok(Json(ApiResponse::success(response)))
}

/// POST /auth/token
/// Exchanges a confirmation code for an access token.
pub async fn token(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<TokenRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let token = state
        .auth_service()
        .issue_token(&payload.username, payload.confirmation_code.trim())
        .await?;

    Ok(Json(ApiResponse::success(TokenResponse { token })))
}
