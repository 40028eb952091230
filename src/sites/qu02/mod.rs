//! qu02 站点模块
//!
//! HTML 搜索页 + `#list` 目录 + `#content` 正文。

mod indexer;
mod selectors;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::warn;
use url::Url;

use crate::core::config::SiteConfig;
use crate::core::error::Result;
use crate::core::model::{ChapterRef, HeaderStyle, SearchResult};
use crate::interfaces::{PageFetcher, PageRequest, SiteProfile};
use crate::sites::cleaner;
use crate::utils::normalize_lines;

pub use self::selectors::SiteSelectors;

pub const DEFAULT_BASE_URL: &str = "https://www.qu02.cc";
pub const DEFAULT_WORKER_CAP: usize = 3;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// 与站点部署行为一致的关键字编码集 (保留 `-._~/`)
const KEYWORD_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// 预先编码关键字
///
/// 编码后的值还会被查询串编码器再编码一次，站点按这种双重编码解析搜索词。
pub fn encode_keyword(keyword: &str) -> String {
    utf8_percent_encode(keyword, KEYWORD_SET).to_string()
}

/// qu02 站点实现
pub struct Qu02 {
    base: Url,
    worker_cap: usize,
    user_agent: String,
}

impl Qu02 {
    pub fn new(config: SiteConfig) -> Result<Self> {
        let base = Url::parse(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        Ok(Self {
            base,
            worker_cap: config.concurrent_tasks.unwrap_or(DEFAULT_WORKER_CAP),
            user_agent: config
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

#[async_trait]
impl SiteProfile for Qu02 {
    fn id(&self) -> &str {
        "qu02"
    }

    fn base_url(&self) -> &Url {
        &self.base
    }

    fn worker_cap(&self) -> usize {
        self.worker_cap
    }

    fn header_style(&self) -> HeaderStyle {
        HeaderStyle::Labeled
    }

    fn base_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(ua) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        headers
    }

    async fn search(&self, fetcher: &dyn PageFetcher, keyword: &str) -> Result<Vec<SearchResult>> {
        let req = PageRequest::get(self.resolve("/search.html")).query("s", encode_keyword(keyword));
        match fetcher.fetch(&req).await {
            Ok(body) => Ok(self.parse_search_results(&body)),
            Err(e) => {
                warn!(keyword, error = %e, "搜索请求失败");
                Ok(Vec::new())
            }
        }
    }

    fn parse_search_results(&self, body: &str) -> Vec<SearchResult> {
        indexer::parse_search_html(body)
    }

    fn parse_chapter_list(&self, body: &str, page_url: &Url) -> Vec<ChapterRef> {
        indexer::parse_chapters_html(body, page_url)
    }

    fn parse_chapter_body(&self, body: &str) -> Result<String> {
        let cleaned = cleaner::strip_decorations(body, selectors::CONTENT_ADS)?;
        let raw = cleaner::container_text(&cleaned, &SiteSelectors::get().content)?;
        Ok(normalize_lines(&raw))
    }
}
