use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::external::{CatalogApi, CatalogError, CatalogQuery, ConnectivityHandle, NetworkStatus};
use crate::models::{sort_films, Film, FilmFilter, FilmsDTO};

use super::data_service::DataService;

/// 胶片列表同步引擎
///
/// 将远端目录的分页结果与本地收藏合并为单一有序去重视图：
/// 首页收藏前置，断网回退本地，取消静默降级。
/// 远端接口与本地存储均为注入的依赖
pub struct FilmService {
    catalog: Arc<dyn CatalogApi>,
    data: DataService,
    connectivity: ConnectivityHandle,
    /// 同一胶片的收藏切换互斥，不同胶片互不阻塞
    toggle_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FilmService {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        data: DataService,
        connectivity: ConnectivityHandle,
    ) -> Self {
        Self {
            catalog,
            data,
            connectivity,
            toggle_locks: Mutex::new(HashMap::new()),
        }
    }

    /// 拉取一页合并后的列表
    ///
    /// offset 为调用方持有的状态：加载成功后由调用方递增，
    /// 失败时由调用方回滚。取消的远端请求不会以错误形式暴露，
    /// 而是按离线分支降级；其余远端错误原样上抛
    pub async fn fetch_films(
        &self,
        filter: &FilmFilter,
        limit: i64,
        offset: i64,
        force_refresh: bool,
        cancel: &CancellationToken,
    ) -> Result<FilmsDTO, CatalogError> {
        tracing::debug!(
            "fetch_films called with offset: {}, search: {:?}, force_refresh: {}",
            offset,
            filter.search_term(),
            force_refresh
        );

        // 先取全部收藏并套用当前筛选
        let favorites = self.data.favorite_films().await;
        let filtered_favorites =
            filter_favorites(&favorites, filter.brand(), filter.search_term());

        tracing::debug!(
            "Found {} total favorites, {} filtered favorites",
            favorites.len(),
            filtered_favorites.len()
        );

        // 连通状态只在此处读取一次，请求期间的翻转不影响本次分支决定
        let connected = self.connectivity.is_connected();
        tracing::debug!("Network connected: {}", connected);

        if connected {
            let query = CatalogQuery {
                brand: filter.brand(),
                sort_option: filter.sort_option,
                search_text: filter.search_term(),
                limit,
                offset,
                force_refresh,
            };

            match self.catalog.fetch_films(query, cancel).await {
                Ok(response) => {
                    tracing::debug!(
                        "Network fetch successful: {} films, total: {}",
                        response.films.len(),
                        response.total
                    );
                    return Ok(merge_page(response, filtered_favorites, filter, offset));
                }
                Err(err) if err.is_cancelled() => {
                    // 被取消的请求按"没有新数据"处理，走收藏回退
                    tracing::debug!("Catalog request cancelled, falling back to favorites");
                }
                Err(err) => {
                    tracing::warn!("Catalog fetch failed: {}", err);
                    return Err(err);
                }
            }
        }

        // 离线或请求被取消：仅首页返回收藏，后续页无离线分页
        if offset == 0 {
            let mut sorted_favorites = filtered_favorites;
            sort_films(&mut sorted_favorites, filter.sort_option);
            let total = sorted_favorites.len() as i64;

            tracing::debug!("Returning {} offline favorites", total);
            Ok(FilmsDTO {
                films: sorted_favorites,
                total,
            })
        } else {
            tracing::debug!("Returning empty page for offline pagination");
            Ok(FilmsDTO {
                films: Vec::new(),
                total: 0,
            })
        }
    }

    /// 按 id 查询单部胶片，只覆盖本地收藏
    pub async fn film_by_id(&self, id: &str) -> Option<Film> {
        self.data.favorite_by_id(id).await
    }

    /// 切换收藏状态
    ///
    /// 对同一 id 的读改写串行化；返回翻转了收藏标记的副本
    pub async fn toggle_favorite(&self, film: &Film) -> Result<Film> {
        let lock = self.toggle_lock_for(&film.id).await;
        let _guard = lock.lock().await;

        let is_favorite = self.data.is_favorite(&film.id).await;

        if is_favorite {
            self.data.remove_from_favorites(&film.id).await?;
            Ok(film.with_favorite(false))
        } else {
            self.data.add_to_favorites(film).await?;
            Ok(film.with_favorite(true))
        }
    }

    pub async fn favorite_films(&self) -> Vec<Film> {
        self.data.favorite_films().await
    }

    pub async fn is_favorite(&self, id: &str) -> bool {
        self.data.is_favorite(id).await
    }

    /// 拉取品牌列表
    ///
    /// 联网且要求强制刷新时走远端并整表落库；
    /// 取消或失败一律回退到持久化列表（读取路径按字母序）
    pub async fn fetch_brands(&self, force_refresh: bool, cancel: &CancellationToken) -> Vec<String> {
        if self.connectivity.is_connected() && force_refresh {
            match self.catalog.fetch_brands(cancel).await {
                Ok(brands) => {
                    if let Err(err) = self.data.save_brands(&brands).await {
                        tracing::warn!("Failed to persist brand list: {}", err);
                    }
                    return brands;
                }
                Err(err) if err.is_cancelled() => {
                    tracing::debug!("Brands request cancelled, using cache");
                }
                Err(err) => {
                    tracing::warn!("Network brands fetch failed, falling back to cache: {}", err);
                }
            }
        }

        self.data.cached_brands().await
    }

    /// 清理超出保留窗口的缓存，收藏记录不受影响
    pub async fn purge_stale(&self, now: DateTime<Utc>, retention: Duration) -> u64 {
        self.data.clear_old_cache(now, retention).await
    }

    pub fn is_connected(&self) -> bool {
        self.connectivity.is_connected()
    }

    pub fn connectivity(&self) -> ConnectivityHandle {
        self.connectivity.clone()
    }

    pub fn subscribe_network(&self) -> watch::Receiver<NetworkStatus> {
        self.connectivity.subscribe()
    }

    async fn toggle_lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.toggle_locks.lock().await;
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// 收藏筛选谓词：品牌精确匹配，搜索词对型号或品牌做不区分大小写的子串匹配
fn filter_favorites(favorites: &[Film], brand: Option<&str>, search: Option<&str>) -> Vec<Film> {
    favorites
        .iter()
        .filter(|film| {
            let brand_matches = brand.map_or(true, |b| film.brand == b);
            let search_matches = search.map_or(true, |s| {
                let needle = s.to_lowercase();
                film.model.to_lowercase().contains(&needle)
                    || film.brand.to_lowercase().contains(&needle)
            });
            brand_matches && search_matches
        })
        .cloned()
        .collect()
}

/// 合并一页远端结果与筛选后的收藏
///
/// 远端条目按收藏集合打标；首页把不在远端结果中的收藏排序后前置，
/// 总数相应加上前置条数（后续页不再重复这些收藏）。
/// 出现在远端结果中的收藏保留在远端序列里，只打标不剔除，
/// 由列表控制器在合并多页时按 id 去重
fn merge_page(
    response: FilmsDTO,
    filtered_favorites: Vec<Film>,
    filter: &FilmFilter,
    offset: i64,
) -> FilmsDTO {
    let favorite_ids: HashSet<String> = filtered_favorites
        .iter()
        .map(|film| film.id.clone())
        .collect();

    let mut network_films: Vec<Film> = response
        .films
        .into_iter()
        .map(|film| {
            let is_favorite = favorite_ids.contains(&film.id);
            Film {
                is_favorite,
                ..film
            }
        })
        .collect();

    if offset == 0 {
        let network_ids: HashSet<String> =
            network_films.iter().map(|film| film.id.clone()).collect();

        let mut favorites_not_in_network: Vec<Film> = filtered_favorites
            .into_iter()
            .filter(|film| !network_ids.contains(&film.id))
            .collect();

        tracing::debug!(
            "First page - prepending {} favorites not in network response",
            favorites_not_in_network.len()
        );

        // 两半各自独立排序，收藏整体排在远端结果之前
        sort_films(&mut favorites_not_in_network, filter.sort_option);
        sort_films(&mut network_films, filter.sort_option);

        let total = response.total + favorites_not_in_network.len() as i64;

        let mut films = favorites_not_in_network;
        films.extend(network_films);

        FilmsDTO { films, total }
    } else {
        sort_films(&mut network_films, filter.sort_option);

        FilmsDTO {
            films: network_films,
            total: response.total,
        }
    }
}
