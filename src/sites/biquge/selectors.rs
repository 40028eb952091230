//! biquge 选择器

use std::sync::OnceLock;

use scraper::Selector;

/// 隐藏章节占位链接的 href
pub const HIDDEN_PLACEHOLDER_HREF: &str = "javascript:dd_show()";

/// 正文容器内需要剔除的广告节点 (供流式改写使用)
pub const CONTENT_ADS: &str = "#chaptercontent div";

pub struct SiteSelectors {
    pub list_anchor: Selector,
    pub hidden_block: Selector,
    pub hidden_anchor: Selector,
    pub content: Selector,
}

static SELECTORS: OnceLock<SiteSelectors> = OnceLock::new();

impl SiteSelectors {
    pub fn get() -> &'static SiteSelectors {
        SELECTORS.get_or_init(|| SiteSelectors {
            list_anchor: Selector::parse("div.listmain dl dd > a").unwrap(),
            hidden_block: Selector::parse("span.dd_hide").unwrap(),
            hidden_anchor: Selector::parse("dd > a").unwrap(),
            content: Selector::parse("#chaptercontent").unwrap(),
        })
    }
}
