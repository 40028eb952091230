//! 页面获取接口
//!
//! 抓取单元与站点只依赖"GET 一个页面并拿回正文"这一能力，
//! 生产环境由 `HttpService` 实现，测试中可替换为内存桩。

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::core::error::Result;

/// 单次 GET 请求描述
///
/// `headers` 是本次调用的派生覆盖值，不会回写到客户端的基础 Header 集。
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
}

impl PageRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// 附加覆盖 Header；非法值直接忽略
    pub fn header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(val) = HeaderValue::from_str(value) {
            self.headers.insert(name, val);
        }
        self
    }
}

/// 页面获取能力
///
/// 不做任何重试，重试由调用方负责。
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, req: &PageRequest) -> Result<String>;
}
