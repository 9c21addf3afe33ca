// 远端目录服务错误类型定义
//
// 覆盖请求构造、传输、解码与取消的完整错误分类。
// 取消不是用户可见错误：同步引擎捕获后回退到离线分支

use thiserror::Error;

/// 目录接口的统一错误类型
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid URL")]
    InvalidUrl,

    #[error("No data received")]
    NoData,

    #[error("Failed to decode data: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error with status code: {0}")]
    Server(u16),

    #[error("No internet connection")]
    NoConnection,

    #[error("Request timeout")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Unknown error occurred")]
    Unknown,
}

impl CatalogError {
    /// 取消的请求不作为用户可见错误对待
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }
}

// 实现从 reqwest::Error 到 CatalogError 的转换
impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CatalogError::Timeout
        } else if err.is_status() {
            match err.status() {
                Some(status) => CatalogError::Server(status.as_u16()),
                None => CatalogError::Network(err.to_string()),
            }
        } else if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else if err.is_connect() {
            CatalogError::NoConnection
        } else if err.is_builder() {
            CatalogError::InvalidUrl
        } else {
            CatalogError::Network(err.to_string())
        }
    }
}
