//! 错误处理体系 (Error Handling System)
//!
//! 定义领域相关的错误类型以及全局 Result 别名。
//! 章节级失败在抓取单元内被吸收为占位文本，只有 `NoChaptersFound`
//! 与 `PrimingFailed` 会作为显式失败结果抵达 API 层。

use thiserror::Error;

/// 全局错误定义 (Spider Domain Errors)
#[derive(Error, Debug)]
pub enum SpiderError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("未知站点: {0}")]
    UnknownSite(String),

    /// 前置 Cookie 请求失败，依赖它的搜索被短路
    #[error("Priming request failed: {0}")]
    PrimingFailed(String),

    #[error("未找到章节")]
    NoChaptersFound,

    #[error("Retries exhausted after {attempts} attempts: {reason}")]
    ExhaustedRetries { attempts: u32, reason: String },

    #[error("Download cancelled")]
    Cancelled,
}

/// 全局 Result 别名
pub type Result<T> = std::result::Result<T, SpiderError>;

impl SpiderError {
    /// 是否属于网络层故障 (超时 / 连接失败 / 非 2xx 状态)
    pub fn is_network(&self) -> bool {
        match self {
            SpiderError::Network(_) => true,
            SpiderError::Middleware(reqwest_middleware::Error::Reqwest(_)) => true,
            SpiderError::Middleware(reqwest_middleware::Error::Middleware(err)) => err
                .downcast_ref::<SpiderError>()
                .is_some_and(SpiderError::is_network),
            SpiderError::PrimingFailed(_) => true,
            _ => false,
        }
    }

    /// 是否需要作为显式失败结果返回给调用方
    pub fn is_surfaced(&self) -> bool {
        matches!(
            self,
            SpiderError::NoChaptersFound | SpiderError::PrimingFailed(_)
        )
    }
}
