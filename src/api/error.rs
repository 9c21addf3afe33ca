use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::external::CatalogError;
use crate::models::AuthError;

/// 统一的API错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 未找到资源
    NotFound(String),
    /// 请求参数错误
    BadRequest(String),
    /// 权限错误
    Unauthorized(String),
    /// 内部服务器错误
    Internal(String),
    /// 远端目录服务错误
    Catalog(CatalogError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Catalog(err) => write!(f, "Catalog error: {}", err),
        }
    }
}

impl std::error::Error for ApiError {}

/// 从目录服务错误转换
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

/// 从认证错误转换
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
            AuthError::Unknown => ApiError::Internal(err.to_string()),
        }
    }
}

/// 从anyhow::Error转换
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// 实现IntoResponse，将错误转换为HTTP响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(ref msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            ApiError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            ApiError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal server error occurred".to_string(),
                )
            }
            ApiError::Catalog(ref err) => {
                let status = match err {
                    CatalogError::NoConnection => StatusCode::SERVICE_UNAVAILABLE,
                    CatalogError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                    CatalogError::Server(_) | CatalogError::Decode(_) | CatalogError::NoData => {
                        StatusCode::BAD_GATEWAY
                    }
                    // 取消在引擎内部已降级，到达这里按内部错误兜底
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                tracing::error!("Catalog error: {}", err);
                (status, "catalog_error", err.to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ApiError::NotFound("Film not found".to_string());
        assert_eq!(error.to_string(), "Not found: Film not found");
    }

    #[test]
    fn test_catalog_error_conversion() {
        let api_error: ApiError = CatalogError::Server(502).into();
        assert!(matches!(api_error, ApiError::Catalog(CatalogError::Server(502))));
    }

    #[test]
    fn test_auth_error_conversion() {
        let api_error: ApiError = AuthError::InvalidCredentials.into();
        assert!(matches!(api_error, ApiError::Unauthorized(_)));
    }
}
