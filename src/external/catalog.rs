use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::error::CatalogError;
use crate::models::{FilmSortOption, FilmsDTO};

/// 默认的远端目录服务地址
pub const DEFAULT_BASE_URL: &str = "https://www.analogfilm.club/api";

/// 单次请求超时
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 目录列表查询参数
///
/// force_refresh 只是提示远端绕过缓存（Cache-Control: no-cache），
/// 不改变任何合并逻辑
#[derive(Debug, Clone, Copy)]
pub struct CatalogQuery<'a> {
    pub brand: Option<&'a str>,
    pub sort_option: FilmSortOption,
    pub search_text: Option<&'a str>,
    pub limit: i64,
    pub offset: i64,
    pub force_refresh: bool,
}

/// 远端目录服务接口
///
/// 同步引擎只依赖该接口，具体实现由启动处注入
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_films(
        &self,
        query: CatalogQuery<'_>,
        cancel: &CancellationToken,
    ) -> Result<FilmsDTO, CatalogError>;

    async fn fetch_brands(&self, cancel: &CancellationToken) -> Result<Vec<String>, CatalogError>;
}

/// 目录服务 HTTP 客户端
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        // 启动时校验一次地址，后续请求直接拼接
        Url::parse(base_url).map_err(|_| CatalogError::InvalidUrl)?;

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 从环境变量读取服务地址
    pub fn from_env() -> Result<Self, CatalogError> {
        let base_url =
            std::env::var("CATALOG_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn fetch_films(
        &self,
        query: CatalogQuery<'_>,
        cancel: &CancellationToken,
    ) -> Result<FilmsDTO, CatalogError> {
        let url = format!("{}/films", self.base_url);
        let sort = query.sort_option.api_value();

        let mut params: Vec<(&str, String)> = vec![
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
            ("sort", sort.clone()),
        ];

        if let Some(brand) = query.brand.filter(|b| !b.is_empty()) {
            params.push(("brand", brand.to_string()));
        }

        if let Some(search) = query.search_text.filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }

        tracing::debug!(
            "Catalog request: {} (sort: {}, brand: {:?}, search: {:?}, limit: {}, offset: {})",
            url,
            sort,
            query.brand,
            query.search_text,
            query.limit,
            query.offset
        );

        let mut request = self
            .client
            .get(&url)
            .query(&params)
            .timeout(REQUEST_TIMEOUT);

        if query.force_refresh {
            request = request.header(reqwest::header::CACHE_CONTROL, "no-cache");
        }

        let fetch = async {
            let response = request.send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(CatalogError::Server(status.as_u16()));
            }

            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                return Err(CatalogError::NoData);
            }

            serde_json::from_slice::<FilmsDTO>(&bytes)
                .map_err(|err| CatalogError::Decode(err.to_string()))
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CatalogError::Cancelled),
            result = fetch => result,
        }
    }

    async fn fetch_brands(&self, cancel: &CancellationToken) -> Result<Vec<String>, CatalogError> {
        let url = format!("{}/films/brands", self.base_url);

        let request = self.client.get(&url).timeout(REQUEST_TIMEOUT);

        let fetch = async {
            let response = request.send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(CatalogError::Server(status.as_u16()));
            }

            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                return Err(CatalogError::NoData);
            }

            serde_json::from_slice::<Vec<String>>(&bytes)
                .map_err(|err| CatalogError::Decode(err.to_string()))
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CatalogError::Cancelled),
            result = fetch => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(matches!(
            HttpCatalogClient::new("not a url"),
            Err(CatalogError::InvalidUrl)
        ));
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let client = HttpCatalogClient::new("https://example.com/api/").unwrap();
        assert_eq!(client.base_url, "https://example.com/api");
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_short_circuits() {
        let client = HttpCatalogClient::new("https://example.invalid/api").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = client.fetch_brands(&cancel).await;
        assert!(matches!(result, Err(CatalogError::Cancelled)));
    }
}
