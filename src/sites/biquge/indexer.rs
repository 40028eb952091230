//! biquge 索引解析
//!
//! 搜索接口直接返回 JSON 数组；目录页中的"展开全部章节"占位链接
//! 需要在原位置展开为紧随其后的隐藏章节块。

use scraper::{ElementRef, Html};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::core::model::{ChapterRef, SearchResult};

use super::selectors::HIDDEN_PLACEHOLDER_HREF;
use super::SiteSelectors;

fn text_field(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// 解析 JSON 搜索响应
///
/// 响应不是数组 (例如限流时返回的数字) 时得到空列表。
pub fn parse_search_json(body: &str) -> Vec<SearchResult> {
    let items = match serde_json::from_str::<Vec<Value>>(body) {
        Ok(items) => items,
        Err(e) => {
            debug!(error = %e, "搜索响应不是 JSON 数组");
            return Vec::new();
        }
    };

    items
        .iter()
        .filter_map(|item| {
            Some(SearchResult {
                title: text_field(item, "articlename")?,
                author: text_field(item, "author")?,
                url: text_field(item, "url_list")?,
            })
        })
        .collect()
}

struct ChapterCollector<'a> {
    page_url: &'a Url,
    chapters: Vec<ChapterRef>,
}

impl ChapterCollector<'_> {
    fn push(&mut self, anchor: ElementRef<'_>) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            return;
        };
        let title = anchor.text().collect::<String>().trim().to_string();
        if href.is_empty() || title.is_empty() {
            return;
        }
        let Ok(url) = self.page_url.join(href) else {
            return;
        };

        let index = self.chapters.len();
        self.chapters.push(ChapterRef {
            index,
            title,
            url: url.to_string(),
        });
    }
}

/// 占位链接所在 `dd` 之后的第一个隐藏章节块
fn hidden_block_after<'a>(placeholder: ElementRef<'a>) -> Option<ElementRef<'a>> {
    let s = SiteSelectors::get();
    let dd = placeholder.parent().and_then(ElementRef::wrap)?;
    dd.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| s.hidden_block.matches(el))
}

fn inside_hidden_block(anchor: ElementRef<'_>) -> bool {
    let s = SiteSelectors::get();
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| s.hidden_block.matches(&el))
}

/// 解析章节目录 (`div.listmain`)
pub fn parse_chapters_html(html: &str, page_url: &Url) -> Vec<ChapterRef> {
    let doc = Html::parse_document(html);
    let s = SiteSelectors::get();
    let mut collector = ChapterCollector {
        page_url,
        chapters: Vec::new(),
    };

    for anchor in doc.select(&s.list_anchor) {
        // 隐藏块只通过占位链接展开
        if inside_hidden_block(anchor) {
            continue;
        }

        let is_placeholder = anchor
            .value()
            .attr("href")
            .is_some_and(|h| h.trim() == HIDDEN_PLACEHOLDER_HREF);

        if is_placeholder {
            if let Some(block) = hidden_block_after(anchor) {
                for hidden in block.select(&s.hidden_anchor) {
                    collector.push(hidden);
                }
            }
            continue;
        }

        collector.push(anchor);
    }

    collector.chapters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_search_skips_incomplete_items() {
        let body = r#"[
            {"articlename":"剑来","author":"烽火戏诸侯","url_list":"/book/1/"},
            {"articlename":"无作者","url_list":"/book/2/"},
            {"articlename":"","author":"某人","url_list":"/book/3/"},
            {"articlename":"诡秘之主","author":"爱潜水的乌贼","url_list":"/book/4/","intro":"..."}
        ]"#;
        let results = parse_search_json(body);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].url, "/book/4/");
    }

    #[test]
    fn json_search_tolerates_garbage() {
        assert!(parse_search_json("1").is_empty());
        assert!(parse_search_json("<html>busy</html>").is_empty());
        assert!(parse_search_json("").is_empty());
    }

    #[test]
    fn hidden_chapters_are_spliced_at_placeholder() {
        let html = r#"
<div class="listmain"><dl>
  <dd><a href="/book/1/1.html">第一章</a></dd>
  <dd><a href="/book/1/2.html">第二章</a></dd>
  <dd class="more pc_none"><a href="javascript:dd_show()">&lt;&lt;---展开全部章节---&gt;&gt;</a></dd>
  <span class="dd_hide">
    <dd><a href="/book/1/3.html">第三章</a></dd>
    <dd><a href="/book/1/4.html">第四章</a></dd>
    <dd><a href="/book/1/5.html">第五章</a></dd>
  </span>
  <dd><a href="/book/1/6.html">第六章</a></dd>
</dl></div>"#;
        let page = Url::parse("https://www.bqgl.cc/book/1/").unwrap();
        let chapters = parse_chapters_html(html, &page);

        let titles: Vec<_> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["第一章", "第二章", "第三章", "第四章", "第五章", "第六章"]
        );
        for (i, c) in chapters.iter().enumerate() {
            assert_eq!(c.index, i);
        }
        assert_eq!(chapters[2].url, "https://www.bqgl.cc/book/1/3.html");
    }

    #[test]
    fn placeholder_without_block_is_dropped() {
        let html = r#"
<div class="listmain"><dl>
  <dd><a href="/book/1/1.html">第一章</a></dd>
  <dd class="more"><a href="javascript:dd_show()">展开全部章节</a></dd>
  <dd><a href="/book/1/2.html">第二章</a></dd>
</dl></div>"#;
        let page = Url::parse("https://www.bqgl.cc/book/1/").unwrap();
        let chapters = parse_chapters_html(html, &page);
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[1].index, 1);
        assert_eq!(chapters[1].title, "第二章");
    }
}
