use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::models::{sort_films, Film, FilmFilter, FilmSortOption};

use super::film_service::FilmService;

/// 每页条数
pub const ITEMS_PER_PAGE: i64 = 25;

/// 列表的可见状态快照
///
/// 收藏段与普通段分开维护：收藏段在本地排序，
/// 普通段保持远端返回顺序
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub favorite_films: Vec<Film>,
    pub regular_films: Vec<Film>,
    pub brands: Vec<String>,
    pub filter: FilmFilter,
    pub current_offset: i64,
    pub has_more: bool,
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub is_refreshing: bool,
    pub error_message: Option<String>,
    pub total_films_shown: usize,
    pub is_connected: bool,
    pub show_offline_banner: bool,
}

impl ListSnapshot {
    fn new() -> Self {
        Self {
            favorite_films: Vec::new(),
            regular_films: Vec::new(),
            brands: Vec::new(),
            filter: FilmFilter::default(),
            current_offset: 0,
            has_more: true,
            is_loading: false,
            is_loading_more: false,
            is_refreshing: false,
            error_message: None,
            total_films_shown: 0,
            is_connected: true,
            show_offline_banner: false,
        }
    }

    /// 合并后的完整列表：收藏段在前
    pub fn films(&self) -> Vec<Film> {
        let mut films = self.favorite_films.clone();
        films.extend(self.regular_films.iter().cloned());
        films
    }

    pub fn is_empty(&self) -> bool {
        self.favorite_films.is_empty() && self.regular_films.is_empty() && !self.is_loading
    }
}

/// 列表控制器
///
/// 持有分页状态并按查询序列串行化操作：
/// 刷新之间最新一次胜出（取消前一次在途刷新），
/// 加载更多在刷新或另一次加载更多进行中时直接拒绝。
/// 收藏切换对界面乐观生效
pub struct FilmsListController {
    service: Arc<FilmService>,
    state: Mutex<ListSnapshot>,
    /// 在途刷新的取消令牌，新刷新到来时取消旧的
    refresh_token: Mutex<Option<CancellationToken>>,
}

impl FilmsListController {
    pub fn new(service: Arc<FilmService>) -> Arc<Self> {
        let controller = Arc::new(Self {
            service: service.clone(),
            state: Mutex::new(ListSnapshot::new()),
            refresh_token: Mutex::new(None),
        });

        // 订阅连通状态，断网且列表非空时亮出离线横幅
        let weak = Arc::downgrade(&controller);
        let mut network_rx = service.subscribe_network();
        tokio::spawn(async move {
            while network_rx.changed().await.is_ok() {
                let Some(controller) = weak.upgrade() else {
                    break;
                };
                let connected =
                    *network_rx.borrow() == crate::external::NetworkStatus::Connected;

                let mut state = controller.state.lock().await;
                state.is_connected = connected;
                state.show_offline_banner = !connected
                    && !(state.favorite_films.is_empty() && state.regular_films.is_empty());
            }
        });

        controller
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        self.state.lock().await.clone()
    }

    pub async fn load_initial(&self) {
        self.load_brands(false).await;
        self.load_films(false).await;
    }

    /// 刷新：最新一次胜出
    ///
    /// 取消上一轮在途刷新，重置分页后强制重拉品牌与首页。
    /// 若本轮在应用结果前已被更新的刷新取代，则静默丢弃结果
    pub async fn refresh(&self) {
        let token = CancellationToken::new();
        {
            let mut slot = self.refresh_token.lock().await;
            if let Some(previous) = slot.replace(token.clone()) {
                previous.cancel();
            }
        }

        let filter = {
            let mut state = self.state.lock().await;
            state.is_refreshing = true;
            state.current_offset = 0;
            state.has_more = true;
            state.error_message = None;
            state.filter.clone()
        };

        // 品牌与首页并发拉取，共享同一个取消令牌
        let (brands, result) = tokio::join!(
            self.service.fetch_brands(true, &token),
            self.service
                .fetch_films(&filter, ITEMS_PER_PAGE, 0, true, &token)
        );

        if token.is_cancelled() {
            tracing::debug!("refresh superseded, discarding results");
            return;
        }

        match result {
            Ok(response) => {
                let mut state = self.state.lock().await;
                state.brands = brands;
                let page_len = response.films.len() as i64;
                Self::apply_first_page(&mut state, response.films, filter.sort_option);
                state.has_more = page_len >= ITEMS_PER_PAGE;
                state.is_refreshing = false;
            }
            Err(err) => {
                let mut state = self.state.lock().await;
                state.is_refreshing = false;
                if !err.is_cancelled() {
                    state.error_message = Some(format!("Failed to refresh: {}", err));
                }
            }
        }
    }

    /// 加载更多
    ///
    /// 刷新或另一次加载更多在途时直接拒绝；
    /// 先推进 offset，失败时回滚，下次重试同一页
    pub async fn load_more(&self) {
        let (filter, offset) = {
            let mut state = self.state.lock().await;
            if state.is_loading_more || !state.has_more || state.is_loading || state.is_refreshing
            {
                tracing::debug!(
                    "load_more blocked - is_loading_more: {}, has_more: {}, is_loading: {}, is_refreshing: {}",
                    state.is_loading_more,
                    state.has_more,
                    state.is_loading,
                    state.is_refreshing
                );
                return;
            }
            state.is_loading_more = true;
            state.current_offset += ITEMS_PER_PAGE;
            (state.filter.clone(), state.current_offset)
        };

        let token = CancellationToken::new();
        let result = self
            .service
            .fetch_films(&filter, ITEMS_PER_PAGE, offset, false, &token)
            .await;

        match result {
            Ok(response) => {
                let mut state = self.state.lock().await;

                // 后续页中打了收藏标的行首页已经展示过，丢弃以保证按 id 去重
                let new_regular: Vec<Film> = response
                    .films
                    .iter()
                    .filter(|film| !film.is_favorite)
                    .cloned()
                    .collect();

                state.has_more = response.films.len() as i64 >= ITEMS_PER_PAGE;
                state.regular_films.extend(new_regular);
                state.total_films_shown =
                    state.favorite_films.len() + state.regular_films.len();
                state.is_loading_more = false;
            }
            Err(err) => {
                let mut state = self.state.lock().await;
                // 失败回滚 offset
                state.current_offset -= ITEMS_PER_PAGE;
                state.is_loading_more = false;
                if !err.is_cancelled() {
                    state.error_message = Some(format!("Failed to load more: {}", err));
                }
            }
        }
    }

    /// 应用搜索词并重载列表
    pub async fn search(&self, search_text: impl Into<String>) {
        {
            let mut state = self.state.lock().await;
            state.filter.search_text = search_text.into();
            state.current_offset = 0;
            state.has_more = true;
            state.favorite_films.clear();
            state.regular_films.clear();
        }
        self.load_films(false).await;
    }

    /// 切换排序：收藏段就地重排，普通段按新排序重新拉取
    pub async fn apply_sort_change(&self, sort_option: FilmSortOption) {
        {
            let mut state = self.state.lock().await;
            state.filter.sort_option = sort_option;
            state.current_offset = 0;
            state.has_more = true;

            let sort = state.filter.sort_option;
            sort_films(&mut state.favorite_films, sort);
            state.regular_films.clear();
        }
        self.load_films(true).await;
    }

    /// 切换品牌筛选并重新拉取
    pub async fn apply_brand_change(&self, brand: Option<String>) {
        {
            let mut state = self.state.lock().await;
            state.filter.selected_brand = brand;
            state.current_offset = 0;
            state.has_more = true;
            state.favorite_films.clear();
            state.regular_films.clear();
        }
        self.load_films(true).await;
    }

    /// 清空全部筛选并刷新
    pub async fn clear_filters(&self) {
        {
            let mut state = self.state.lock().await;
            state.filter.reset();
            state.current_offset = 0;
            state.has_more = true;
            state.favorite_films.clear();
            state.regular_films.clear();
        }
        self.refresh().await;
    }

    /// 切换收藏并乐观更新两个分段
    pub async fn toggle_favorite(&self, film: &Film) {
        match self.service.toggle_favorite(film).await {
            Ok(updated) => {
                let mut state = self.state.lock().await;
                let sort = state.filter.sort_option;

                if let Some(index) = state
                    .favorite_films
                    .iter()
                    .position(|f| f.id == film.id)
                {
                    if updated.is_favorite {
                        state.favorite_films[index] = updated;
                    } else {
                        state.favorite_films.remove(index);
                        state.regular_films.push(updated);
                        sort_films(&mut state.regular_films, sort);
                    }
                } else if let Some(index) =
                    state.regular_films.iter().position(|f| f.id == film.id)
                {
                    if updated.is_favorite {
                        state.regular_films.remove(index);
                        state.favorite_films.push(updated);
                        sort_films(&mut state.favorite_films, sort);
                    } else {
                        state.regular_films[index] = updated;
                    }
                }

                state.total_films_shown =
                    state.favorite_films.len() + state.regular_films.len();
            }
            Err(err) => {
                let mut state = self.state.lock().await;
                state.error_message = Some(format!("Failed to update favorite: {}", err));
            }
        }
    }

    /// 详情页回写：按最新收藏标记把条目挪到正确分段
    pub async fn update_film(&self, updated: &Film) {
        let needs_refresh = {
            let mut state = self.state.lock().await;
            let sort = state.filter.sort_option;

            let favorite_index = state
                .favorite_films
                .iter()
                .position(|f| f.id == updated.id);
            let regular_index = state.regular_films.iter().position(|f| f.id == updated.id);

            if updated.is_favorite {
                if let Some(index) = regular_index {
                    state.regular_films.remove(index);
                }

                if let Some(index) = favorite_index {
                    state.favorite_films[index] = updated.clone();
                } else {
                    state.favorite_films.push(updated.clone());
                }
                sort_films(&mut state.favorite_films, sort);
            } else {
                if let Some(index) = favorite_index {
                    state.favorite_films.remove(index);
                }
                if let Some(index) = regular_index {
                    state.regular_films[index] = updated.clone();
                }
            }

            state.total_films_shown = state.favorite_films.len() + state.regular_films.len();

            // 取消收藏后该条目在远端序列中的位置未知，刷新拿到正确排位
            !updated.is_favorite
        };

        if needs_refresh {
            self.refresh().await;
        }
    }

    pub async fn load_brands(&self, force_refresh: bool) {
        let token = CancellationToken::new();
        let brands = self.service.fetch_brands(force_refresh, &token).await;

        let mut state = self.state.lock().await;
        state.brands = brands;
    }

    pub async fn dismiss_offline_banner(&self) {
        let mut state = self.state.lock().await;
        state.show_offline_banner = false;
    }

    /// 按当前筛选加载首页，替换两个分段
    async fn load_films(&self, force_refresh: bool) {
        let (filter, offset) = {
            let mut state = self.state.lock().await;
            state.is_loading = true;
            state.error_message = None;
            (state.filter.clone(), state.current_offset)
        };

        let token = CancellationToken::new();
        let result = self
            .service
            .fetch_films(&filter, ITEMS_PER_PAGE, offset, force_refresh, &token)
            .await;

        match result {
            Ok(response) => {
                let mut state = self.state.lock().await;
                let page_len = response.films.len() as i64;
                Self::apply_first_page(&mut state, response.films, filter.sort_option);
                state.has_more = page_len >= ITEMS_PER_PAGE;
                state.is_loading = false;
            }
            Err(err) => {
                let mut state = self.state.lock().await;
                state.is_loading = false;
                if !err.is_cancelled() {
                    state.error_message = Some(err.to_string());
                }
            }
        }
    }

    /// 首页结果按收藏标记切分：收藏段本地排序，普通段保持远端顺序
    fn apply_first_page(state: &mut ListSnapshot, films: Vec<Film>, sort: FilmSortOption) {
        let mut favorites = Vec::new();
        let mut regular = Vec::new();

        for film in films {
            if film.is_favorite {
                favorites.push(film);
            } else {
                regular.push(film);
            }
        }

        sort_films(&mut favorites, sort);

        state.favorite_films = favorites;
        state.regular_films = regular;
        state.total_films_shown = state.favorite_films.len() + state.regular_films.len();
    }
}
