use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::database::FilmRepository;
use crate::models::Film;

/// 默认的缓存保留天数
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

/// 本地数据服务层
///
/// 封装收藏存储的业务语义：读取失败降级为空结果并记录日志，
/// 写入失败原样上抛，已持久化状态保持不变
#[derive(Clone)]
pub struct DataService {
    repository: Arc<dyn FilmRepository>,
}

impl DataService {
    pub fn new(repository: Arc<dyn FilmRepository>) -> Self {
        Self { repository }
    }

    /// 全部收藏胶片，读取失败时返回空列表
    pub async fn favorite_films(&self) -> Vec<Film> {
        match self.repository.get_favorite_films().await {
            Ok(films) => films,
            Err(err) => {
                tracing::warn!("Error fetching favorite films: {}", err);
                Vec::new()
            }
        }
    }

    /// 按 id 查询缓存记录
    pub async fn favorite_by_id(&self, id: &str) -> Option<Film> {
        match self.repository.get_film_by_id(id).await {
            Ok(film) => film,
            Err(err) => {
                tracing::warn!("Error fetching cached film {}: {}", id, err);
                None
            }
        }
    }

    pub async fn is_favorite(&self, id: &str) -> bool {
        match self.repository.is_favorite(id).await {
            Ok(is_favorite) => is_favorite,
            Err(err) => {
                tracing::warn!("Error checking favorite status for {}: {}", id, err);
                false
            }
        }
    }

    pub async fn favorite_count(&self) -> i64 {
        match self.repository.get_favorite_count().await {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!("Error counting favorite films: {}", err);
                0
            }
        }
    }

    /// 加入收藏，写入的记录一律强制 is_favorite = true
    pub async fn add_to_favorites(&self, film: &Film) -> Result<()> {
        let favorited = film.with_favorite(true);
        self.repository.upsert_favorite(&favorited).await
    }

    /// 取消收藏即删除持久化记录
    pub async fn remove_from_favorites(&self, id: &str) -> Result<()> {
        self.repository.delete_film(id).await
    }

    /// 整表替换品牌缓存
    pub async fn save_brands(&self, brands: &[String]) -> Result<()> {
        self.repository.replace_brands(brands).await
    }

    /// 品牌缓存读取路径，始终按字母序返回
    pub async fn cached_brands(&self) -> Vec<String> {
        match self.repository.get_brands().await {
            Ok(mut brands) => {
                brands.sort();
                brands
            }
            Err(err) => {
                tracing::warn!("Error fetching cached brands: {}", err);
                Vec::new()
            }
        }
    }

    /// 清理过期缓存
    ///
    /// 删除超出保留窗口且未被收藏的胶片记录，以及超期的品牌记录。
    /// 收藏记录永不按时效清理
    pub async fn clear_old_cache(&self, now: DateTime<Utc>, retention: Duration) -> u64 {
        let cutoff = now - retention;

        match self.repository.purge_stale(cutoff).await {
            Ok(removed) => {
                if removed > 0 {
                    tracing::info!("Cleared {} stale cache records", removed);
                }
                removed
            }
            Err(err) => {
                tracing::warn!("Error clearing old cache: {}", err);
                0
            }
        }
    }
}
