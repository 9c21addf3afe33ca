use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::response::{success, success_message};
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: crate::models::User,
    pub token: String,
}

/// 本地账户登录
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state.auth.login(&request.email, &request.password).await?;

    Ok(success(SessionResponse {
        user: session.user,
        token: session.token,
    }))
}

/// 游客登录
pub async fn login_as_guest(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let session = state.auth.login_as_guest().await;

    Ok(success(SessionResponse {
        user: session.user,
        token: session.token,
    }))
}

/// 登出并清除保存的会话
pub async fn logout(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state.auth.logout().await;
    Ok(success_message("Logged out"))
}

/// 查询当前会话
pub async fn get_session(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(success(state.auth.current_user().await))
}
