//! 站点定义
//!
//! 每个目标站点实现一个 `SiteProfile`，提供 Header 常量、搜索流程
//! 以及三种解析函数；共享逻辑中不出现任何站点特定字符串。

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use url::Url;

use crate::core::error::Result;
use crate::core::model::{ChapterRef, HeaderStyle, SearchResult};
use crate::interfaces::fetcher::PageFetcher;
use crate::utils::to_absolute_url;

/// 站点能力接口
#[async_trait]
pub trait SiteProfile: Send + Sync {
    /// 站点唯一标识
    fn id(&self) -> &str;

    /// 基础 URL
    fn base_url(&self) -> &Url;

    /// 章节并发上限
    fn worker_cap(&self) -> usize;

    /// 输出文本的头部样式
    fn header_style(&self) -> HeaderStyle;

    /// 客户端基础 Header 集 (不可变)
    fn base_headers(&self) -> HeaderMap;

    /// 将站内链接补全为绝对地址
    fn resolve(&self, href: &str) -> String {
        to_absolute_url(self.base_url(), href)
    }

    /// 关键字搜索
    ///
    /// 网络与解析失败吸收为空列表；只有前置请求失败以 `PrimingFailed` 返回。
    async fn search(&self, fetcher: &dyn PageFetcher, keyword: &str) -> Result<Vec<SearchResult>>;

    /// 解析搜索响应，跳过字段缺失的条目
    fn parse_search_results(&self, body: &str) -> Vec<SearchResult>;

    /// 按阅读顺序解析目录页，`page_url` 用于补全相对链接
    fn parse_chapter_list(&self, body: &str, page_url: &Url) -> Vec<ChapterRef>;

    /// 提取并清洗正文；找不到正文容器时返回 `Parse` 错误
    fn parse_chapter_body(&self, body: &str) -> Result<String>;
}
