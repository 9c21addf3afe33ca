use axum::{extract::State, response::IntoResponse};
use chrono::{Duration, Utc};
use serde_json::json;

use crate::services::DEFAULT_RETENTION_DAYS;

use super::error::{ApiError, ApiResult};
use super::response::success;
use super::AppState;

/// 健康检查端点
pub async fn health_check(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    // 检查数据库连接
    state.database.verify_integrity().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::Internal("Database connection failed".to_string())
    })?;

    let network = if state.films.is_connected() {
        "connected"
    } else {
        "disconnected"
    };

    Ok(success(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "database": "connected",
        "catalog_network": network
    })))
}

/// 获取系统统计信息
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let stats = state
        .database
        .get_stats()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to get database stats: {}", e)))?;

    Ok(success(json!({
        "favorite_count": stats.favorite_count,
        "cached_film_count": stats.cached_film_count,
        "brand_count": stats.brand_count,
        "database_size_mb": stats.database_size_mb(),
        "network_connected": state.films.is_connected(),
        "timestamp": Utc::now().to_rfc3339()
    })))
}

/// 立即清理过期缓存
pub async fn purge_cache(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let retention = Duration::days(retention_days());
    let removed = state.films.purge_stale(Utc::now(), retention).await;

    Ok(success(json!({
        "removed": removed,
        "timestamp": Utc::now().to_rfc3339()
    })))
}

/// 缓存保留天数，可经环境变量覆盖
pub fn retention_days() -> i64 {
    std::env::var("CACHE_RETENTION_DAYS")
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(DEFAULT_RETENTION_DAYS)
}
