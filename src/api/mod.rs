//! HTTP 接口层
//!
//! `/search` 与 `/download` 两个路由加健康检查，只做参数校验与 JSON 整形。

mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::core::config::AppConfig;
use crate::core::error::Result;
use crate::engine::DownloadEngine;
use crate::network::HttpService;
use crate::sites::SiteRegistry;

pub use handlers::{DownloadResponse, SearchResponse};

pub const HEALTH_MESSAGE: &str =
    "笔趣阁小说 API 正常运行！\nEndpoints: /search?q=... , /download?url=...&title=...&author=...";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<SiteRegistry>,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(SiteRegistry::new()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// 为单个请求构造全新的引擎与客户端
    pub fn engine(&self, site: Option<&str>) -> Result<DownloadEngine> {
        let id = site
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.config.default_site);
        let profile = self.registry.create(id, self.config.site(id))?;
        let http = HttpService::new(profile.base_headers(), self.config.spider.timeout())?;
        Ok(DownloadEngine::new(profile, Arc::new(http), &self.config.spider)
            .with_shutdown(self.shutdown.clone()))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { HEALTH_MESSAGE }))
        .route("/search", get(handlers::search))
        .route("/download", get(handlers::download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
