//! 正文清洗 (Content Cleaning)
//!
//! 先用流式改写移除正文容器内的广告节点，再用 DOM 选择器取出容器文本。

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use scraper::{Html, Selector};

use crate::core::error::{Result, SpiderError};

/// 移除 `ad_selector` 命中的节点，并把 `<br>` 展开为换行
pub fn strip_decorations(html: &str, ad_selector: &str) -> Result<String> {
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(ad_selector, |el| {
                    el.remove();
                    Ok(())
                }),
                element!("br", |el| {
                    el.replace("\n", ContentType::Text);
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|e| SpiderError::Parse(format!("HTML rewrite failed: {}", e)))
}

/// 取出容器内的原始文本 (未做空白规整)
pub fn container_text(html: &str, container: &Selector) -> Result<String> {
    let doc = Html::parse_document(html);
    let node = doc
        .select(container)
        .next()
        .ok_or_else(|| SpiderError::Parse("Content container not found".into()))?;
    Ok(node.text().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ads_inside_container_are_removed() {
        let html = r#"<html><body><div id="content">第一段<br/><div class="ad">广告</div>第二段</div><div>页脚</div></body></html>"#;
        let cleaned = strip_decorations(html, "#content div").unwrap();
        let text = container_text(&cleaned, &Selector::parse("#content").unwrap()).unwrap();
        assert_eq!(text, "第一段\n第二段");
        assert!(cleaned.contains("页脚"));
    }

    #[test]
    fn missing_container_is_parse_error() {
        let err = container_text("<p>nothing</p>", &Selector::parse("#content").unwrap())
            .unwrap_err();
        assert!(matches!(err, SpiderError::Parse(_)));
    }
}
