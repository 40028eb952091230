//! qu02 索引解析
//!
//! 负责搜索结果列表与章节目录的解析

use scraper::{ElementRef, Html};
use url::Url;

use crate::core::model::{ChapterRef, SearchResult};

use super::SiteSelectors;

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// 解析搜索结果页 (`.novelslist2 li`)
pub fn parse_search_html(html: &str) -> Vec<SearchResult> {
    let doc = Html::parse_document(html);
    let s = SiteSelectors::get();

    doc.select(&s.search_item)
        .filter_map(|item| {
            let href = item
                .select(&s.first_link)
                .next()?
                .value()
                .attr("href")
                .filter(|h| !h.is_empty())?;

            let title = item.select(&s.title_link).next().map(element_text)?;
            let author = item.select(&s.author).next().map(element_text)?;
            if title.is_empty() || author.is_empty() {
                return None;
            }

            Some(SearchResult {
                title,
                author,
                url: href.to_string(),
            })
        })
        .collect()
}

/// 解析章节目录 (`#list dl dd a`)
pub fn parse_chapters_html(html: &str, page_url: &Url) -> Vec<ChapterRef> {
    let doc = Html::parse_document(html);
    let s = SiteSelectors::get();

    let mut chapters = Vec::new();
    for link in doc.select(&s.chapter_link) {
        let Some(href) = link.value().attr("href").filter(|h| !h.is_empty()) else {
            continue;
        };
        let title = element_text(link);
        if title.is_empty() {
            continue;
        }
        let Ok(url) = page_url.join(href) else {
            continue;
        };

        chapters.push(ChapterRef {
            index: chapters.len(),
            title,
            url: url.to_string(),
        });
    }
    chapters
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
<div class="novelslist2"><ul>
  <li><span class="s1">类别</span><span class="s2">作品名称</span><span class="s4">作者</span></li>
  <li><span class="s1"><a href="/book/1/">[仙侠]</a></span><span class="s2"><a href="/book/1/">剑来</a></span><span class="s4">烽火戏诸侯</span></li>
  <li><span class="s2"><a href="/book/2/">雪中悍刀行</a></span></li>
  <li><span class="s2"><a href="/book/3/">诡秘之主</a></span><span class="s4">爱潜水的乌贼</span></li>
</ul></div>"#;

    #[test]
    fn search_skips_malformed_items() {
        let results = parse_search_html(SEARCH_PAGE);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "剑来");
        assert_eq!(results[0].author, "烽火戏诸侯");
        assert_eq!(results[0].url, "/book/1/");
        assert_eq!(results[1].title, "诡秘之主");
    }

    #[test]
    fn chapter_list_keeps_document_order() {
        let html = r#"
<div id="list"><dl>
  <dt>正文</dt>
  <dd><a href="1.html">第一章 惊蛰</a></dd>
  <dd><a href="/book/1/2.html">第二章 开门</a></dd>
  <dd><a href="">空链接</a></dd>
  <dd><a href="3.html">第三章 日出</a></dd>
</dl></div>"#;
        let page = Url::parse("https://www.qu02.cc/book/1/").unwrap();
        let chapters = parse_chapters_html(html, &page);

        let indexes: Vec<_> = chapters.iter().map(|c| c.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(chapters[0].url, "https://www.qu02.cc/book/1/1.html");
        assert_eq!(chapters[1].url, "https://www.qu02.cc/book/1/2.html");
        assert_eq!(chapters[2].title, "第三章 日出");
    }

    #[test]
    fn missing_list_yields_nothing() {
        let page = Url::parse("https://www.qu02.cc/book/9/").unwrap();
        assert!(parse_chapters_html("<html><body>404</body></html>", &page).is_empty());
    }
}
