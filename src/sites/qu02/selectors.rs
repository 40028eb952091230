//! qu02 选择器
//!
//! 预编译的 CSS 选择器

use std::sync::OnceLock;

use scraper::Selector;

/// 正文容器内需要剔除的广告节点 (供流式改写使用)
pub const CONTENT_ADS: &str = "#content div";

/// 站点选择器集合
pub struct SiteSelectors {
    pub search_item: Selector,
    pub first_link: Selector,
    pub title_link: Selector,
    pub author: Selector,
    pub chapter_link: Selector,
    pub content: Selector,
}

static SELECTORS: OnceLock<SiteSelectors> = OnceLock::new();

impl SiteSelectors {
    /// 获取全局选择器实例
    pub fn get() -> &'static SiteSelectors {
        SELECTORS.get_or_init(|| SiteSelectors {
            search_item: Selector::parse(".novelslist2 li").unwrap(),
            first_link: Selector::parse("a").unwrap(),
            title_link: Selector::parse(".s2 a").unwrap(),
            author: Selector::parse(".s4").unwrap(),
            chapter_link: Selector::parse("#list dl dd a").unwrap(),
            content: Selector::parse("#content").unwrap(),
        })
    }
}
