//! biquge 站点模块
//!
//! 搜索走 JSON 接口，必须先请求一次写 Cookie 的前置页面；
//! 正文首尾带有站点注入的样板文字，通过 token 剥离去除。

mod indexer;
mod selectors;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, REFERER, USER_AGENT};
use tracing::{debug, warn};
use url::Url;

use crate::core::config::SiteConfig;
use crate::core::error::{Result, SpiderError};
use crate::core::model::{ChapterRef, HeaderStyle, SearchResult};
use crate::interfaces::{PageFetcher, PageRequest, SiteProfile};
use crate::sites::cleaner;
use crate::utils::TokenStrip;

pub use self::selectors::SiteSelectors;

pub const DEFAULT_BASE_URL: &str = "https://www.bqgl.cc";
pub const DEFAULT_WORKER_CAP: usize = 20;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 正文样板剥离：首 1 个 token 为章节标题，末 2 个 token 为站点推广语
pub const BOILERPLATE_STRIP: TokenStrip = TokenStrip {
    leading: 1,
    trailing: 2,
};

const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");
const XHR_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

/// biquge 站点实现
pub struct Biquge {
    base: Url,
    worker_cap: usize,
    user_agent: String,
    body_strip: TokenStrip,
}

impl Biquge {
    pub fn new(config: SiteConfig) -> Result<Self> {
        let base = Url::parse(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        Ok(Self {
            base,
            worker_cap: config.concurrent_tasks.unwrap_or(DEFAULT_WORKER_CAP),
            user_agent: config
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            body_strip: BOILERPLATE_STRIP,
        })
    }

    /// 替换正文 token 剥离规则
    pub fn with_body_strip(mut self, strip: TokenStrip) -> Self {
        self.body_strip = strip;
        self
    }

    /// 以 XHR 形式发出的请求
    fn xhr(&self, path: &str, keyword: &str, referer: &str) -> PageRequest {
        PageRequest::get(self.resolve(path))
            .query("q", keyword)
            .header(REFERER, referer)
            .header(ACCEPT, XHR_ACCEPT)
            .header(X_REQUESTED_WITH, "XMLHttpRequest")
    }

    fn search_referer(&self, keyword: &str) -> Result<String> {
        let query = serde_urlencoded::to_string([("q", keyword)])
            .map_err(|e| SpiderError::Parse(e.to_string()))?;
        Ok(format!("{}?{}", self.resolve("/s"), query))
    }
}

#[async_trait]
impl SiteProfile for Biquge {
    fn id(&self) -> &str {
        "biquge"
    }

    fn base_url(&self) -> &Url {
        &self.base
    }

    fn worker_cap(&self) -> usize {
        self.worker_cap
    }

    fn header_style(&self) -> HeaderStyle {
        HeaderStyle::Bracketed
    }

    fn base_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(ua) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        headers
    }

    async fn search(&self, fetcher: &dyn PageFetcher, keyword: &str) -> Result<Vec<SearchResult>> {
        // 前置请求写入 Cookie，失败则不再发起真正的搜索
        let priming = self.xhr("/user/hm.html", keyword, self.base.as_str());
        fetcher.fetch(&priming).await.map_err(|e| {
            warn!(keyword, error = %e, "搜索前置请求失败");
            SpiderError::PrimingFailed(e.to_string())
        })?;
        debug!(keyword, "前置请求完成");

        let referer = self.search_referer(keyword)?;
        let req = self.xhr("/user/search.html", keyword, &referer);
        match fetcher.fetch(&req).await {
            Ok(body) => Ok(self.parse_search_results(&body)),
            Err(e) => {
                warn!(keyword, error = %e, "搜索请求失败");
                Ok(Vec::new())
            }
        }
    }

    fn parse_search_results(&self, body: &str) -> Vec<SearchResult> {
        indexer::parse_search_json(body)
    }

    fn parse_chapter_list(&self, body: &str, page_url: &Url) -> Vec<ChapterRef> {
        indexer::parse_chapters_html(body, page_url)
    }

    fn parse_chapter_body(&self, body: &str) -> Result<String> {
        let cleaned = cleaner::strip_decorations(body, selectors::CONTENT_ADS)?;
        let raw = cleaner::container_text(&cleaned, &SiteSelectors::get().content)?;
        Ok(self.body_strip.apply(&raw))
    }
}
