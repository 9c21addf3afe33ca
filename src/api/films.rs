use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::models::{Film, FilmFilter, FilmSortOption};

use super::error::{ApiError, ApiResult};
use super::response::{success, PaginatedResponse};
use super::AppState;

/// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct FilmListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// 排序参数，如 "name" 或 "popularity-desc"
    pub sort: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub force_refresh: Option<bool>,
}

/// 品牌查询参数
#[derive(Debug, Deserialize)]
pub struct BrandListParams {
    pub force_refresh: Option<bool>,
}

/// 获取合并后的胶片列表（远端分页 + 本地收藏）
pub async fn get_film_list(
    Query(params): Query<FilmListParams>,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(25).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);

    let sort_option = match params.sort.as_deref() {
        Some(value) => FilmSortOption::from_api_value(value)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown sort value: {}", value)))?,
        None => FilmSortOption::default(),
    };

    let filter = FilmFilter {
        search_text: params.search.unwrap_or_default(),
        selected_brand: params.brand,
        sort_option,
    };

    let cancel = CancellationToken::new();
    let page = state
        .films
        .fetch_films(
            &filter,
            limit,
            offset,
            params.force_refresh.unwrap_or(false),
            &cancel,
        )
        .await?;

    Ok(PaginatedResponse::new(page.films, page.total, limit, offset))
}

/// 获取单部胶片，只覆盖本地收藏
pub async fn get_film_detail(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    match state.films.film_by_id(&id).await {
        Some(film) => Ok(success(film)),
        None => Err(ApiError::NotFound(format!("Film '{}' is not cached", id))),
    }
}

/// 切换收藏状态
///
/// 首次收藏需要完整的胶片记录作为请求体，因此条目随请求提交
pub async fn toggle_favorite(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(film): Json<Film>,
) -> ApiResult<impl IntoResponse> {
    if film.id != id {
        return Err(ApiError::BadRequest(format!(
            "Film id mismatch: path '{}', body '{}'",
            id, film.id
        )));
    }

    let updated = state.films.toggle_favorite(&film).await?;
    Ok(success(updated))
}

/// 获取收藏列表
pub async fn get_favorites(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let favorites = state.films.favorite_films().await;
    Ok(success(favorites))
}

/// 获取品牌列表
pub async fn get_brands(
    Query(params): Query<BrandListParams>,
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let cancel = CancellationToken::new();
    let brands = state
        .films
        .fetch_brands(params.force_refresh.unwrap_or(false), &cancel)
        .await;

    Ok(success(brands))
}
