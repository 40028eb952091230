use std::time::Instant;

use reqwest::header::HeaderMap;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use tracing::debug;

/// 单次请求的 Header 覆盖值
///
/// 作为请求扩展传入，由 [`HeaderOverrideMiddleware`] 注入，基础 Header 集保持不变。
#[derive(Debug, Clone, Default)]
pub struct HeaderOverrides(pub HeaderMap);

/// Header 覆盖注入中间件
pub struct HeaderOverrideMiddleware;

#[async_trait::async_trait]
impl Middleware for HeaderOverrideMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        if let Some(overrides) = extensions.get::<HeaderOverrides>() {
            let headers = req.headers_mut();
            for (k, v) in overrides.0.iter() {
                headers.insert(k.clone(), v.clone());
            }
        }
        next.run(req, extensions).await
    }
}

/// 请求耗时记录中间件
pub struct RequestLogMiddleware;

#[async_trait::async_trait]
impl Middleware for RequestLogMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let url = req.url().clone();
        let started = Instant::now();
        let result = next.run(req, extensions).await;
        match &result {
            Ok(resp) => debug!(
                url = %url,
                status = resp.status().as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "GET 完成"
            ),
            Err(e) => debug!(url = %url, error = %e, "GET 失败"),
        }
        result
    }
}
