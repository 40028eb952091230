//! HTTP 客户端封装 (HTTP Client Wrapper)
//!
//! 持有可复用的连接上下文：固定 Header 集、Cookie 存储与固定超时。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};

use crate::core::error::{Result, SpiderError};
use crate::interfaces::fetcher::{PageFetcher, PageRequest};
use crate::network::middleware::{HeaderOverrideMiddleware, HeaderOverrides, RequestLogMiddleware};

#[derive(Clone)]
pub struct HttpService {
    client: ClientWithMiddleware,
}

impl HttpService {
    /// 以站点的基础 Header 集构建客户端
    ///
    /// Cookie 存储随客户端实例存活，前置请求写入的 Cookie 会被后续请求带上。
    pub fn new(base_headers: HeaderMap, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(base_headers)
            .cookie_store(true)
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(SpiderError::Network)?;

        let client = ClientBuilder::new(client)
            .with(HeaderOverrideMiddleware)
            .with(RequestLogMiddleware)
            .build();

        Ok(Self { client })
    }

    /// 发起 GET 请求并按 UTF-8 解码响应体
    ///
    /// 非 2xx 状态视为失败。
    pub async fn get_text(&self, req: &PageRequest) -> Result<String> {
        let mut rb = self.client.get(&req.url);
        if !req.query.is_empty() {
            rb = rb.query(&req.query);
        }
        if !req.headers.is_empty() {
            rb = rb.with_extension(HeaderOverrides(req.headers.clone()));
        }

        let resp = rb.send().await.map_err(SpiderError::Middleware)?;
        let resp = resp.error_for_status().map_err(SpiderError::Network)?;
        let bytes = resp.bytes().await.map_err(SpiderError::Network)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl PageFetcher for HttpService {
    async fn fetch(&self, req: &PageRequest) -> Result<String> {
        self.get_text(req).await
    }
}
