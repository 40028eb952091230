//! 下载调度引擎 (Orchestration Engine)
//!
//! 负责搜索转发、目录发现，以及章节的并发抓取与按序重组。

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::core::config::SpiderConfig;
use crate::core::error::{Result, SpiderError};
use crate::core::model::{ChapterContent, ChapterRef, NovelMeta, NovelText, SearchResult};
use crate::interfaces::{PageFetcher, PageRequest, SiteProfile};

use super::context::{RetryPolicy, RuntimeContext};
use super::task;

/// 核心调度引擎
///
/// 每个请求独立构造，不跨请求共享状态。
pub struct DownloadEngine {
    site: Arc<dyn SiteProfile>,
    fetcher: Arc<dyn PageFetcher>,
    retry: RetryPolicy,
    shutdown: CancellationToken,
}

impl DownloadEngine {
    pub fn new(
        site: Arc<dyn SiteProfile>,
        fetcher: Arc<dyn PageFetcher>,
        config: &SpiderConfig,
    ) -> Self {
        Self {
            site,
            fetcher,
            retry: RetryPolicy::from(config),
            shutdown: CancellationToken::new(),
        }
    }

    /// 绑定外部取消令牌 (进程退出时中止在途抓取)
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn site(&self) -> &Arc<dyn SiteProfile> {
        &self.site
    }

    /// 关键字搜索
    pub async fn search(&self, keyword: &str) -> Result<Vec<SearchResult>> {
        let results = self.site.search(self.fetcher.as_ref(), keyword).await?;
        info!(keyword, count = results.len(), "搜索完成");
        Ok(results)
    }

    /// 获取章节目录；任何失败都得到空列表
    pub async fn discover_chapters(&self, novel_url: &str) -> Vec<ChapterRef> {
        let page_url = match Url::parse(novel_url) {
            Ok(u) => u,
            Err(e) => {
                warn!(url = novel_url, error = %e, "目录地址无效");
                return Vec::new();
            }
        };

        match self.fetcher.fetch(&PageRequest::get(novel_url)).await {
            Ok(html) => {
                let chapters = self.site.parse_chapter_list(&html, &page_url);
                debug!(url = novel_url, total = chapters.len(), "目录解析完成");
                chapters
            }
            Err(e) => {
                warn!(url = novel_url, error = %e, "目录获取失败");
                Vec::new()
            }
        }
    }

    /// 下载整本小说：目录发现 + 并发抓取
    pub async fn download_novel(&self, meta: NovelMeta) -> Result<NovelText> {
        let chapters = self.discover_chapters(&meta.source_url).await;
        self.download_all(meta, chapters).await
    }

    /// 并发抓取全部章节并按序号拼接
    ///
    /// 阻塞直至所有章节完成；单章失败以占位文本出现在结果中。
    pub async fn download_all(
        &self,
        meta: NovelMeta,
        mut chapters: Vec<ChapterRef>,
    ) -> Result<NovelText> {
        if chapters.is_empty() {
            return Err(SpiderError::NoChaptersFound);
        }
        chapters.sort_by_key(|c| c.index);

        let total = chapters.len();
        let workers = self.site.worker_cap().clamp(1, total);
        info!(title = %meta.title, total, workers, "共发现 {} 个章节", total);

        let ctx = Arc::new(RuntimeContext::new(
            self.site.clone(),
            self.fetcher.clone(),
            workers,
            self.retry,
            total,
        ));

        // 每个槽位只由一个任务写入一次，下标即排序后的位置
        let mut slots: Vec<Option<ChapterContent>> = vec![None; total];
        let mut join_set = JoinSet::new();
        for (slot, chapter) in chapters.iter().enumerate() {
            let fut = task::fetch_chapter(chapter.clone(), ctx.clone());
            join_set.spawn(async move { (slot, fut.await) });
        }

        loop {
            let next = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    join_set.abort_all();
                    warn!(title = %meta.title, "下载已取消");
                    return Err(SpiderError::Cancelled);
                }
                res = join_set.join_next() => res,
            };

            let Some(res) = next else { break };
            match res {
                Ok((slot, content)) => {
                    if slots[slot].replace(content).is_some() {
                        warn!(slot, "章节槽位被重复写入");
                    }
                }
                Err(e) => error!("并发调度错误: {}", e),
            }
        }

        let contents: Vec<ChapterContent> = chapters
            .iter()
            .zip(slots)
            .map(|(chapter, slot)| slot.unwrap_or_else(|| ChapterContent::lost(chapter)))
            .collect();

        let novel = NovelText::assemble(meta, self.site.header_style(), &contents);
        info!(
            title = %novel.meta.title,
            chapters = novel.chapter_count,
            chars = novel.char_len(),
            "下载完成"
        );
        Ok(novel)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::header::HeaderMap;

    use super::*;
    use crate::core::model::HeaderStyle;

    /// 按正文容器 `#c` 解析的最小站点
    struct StubSite {
        base: Url,
        cap: usize,
    }

    #[async_trait]
    impl SiteProfile for StubSite {
        fn id(&self) -> &str {
            "stub"
        }
        fn base_url(&self) -> &Url {
            &self.base
        }
        fn worker_cap(&self) -> usize {
            self.cap
        }
        fn header_style(&self) -> HeaderStyle {
            HeaderStyle::Bracketed
        }
        fn base_headers(&self) -> HeaderMap {
            HeaderMap::new()
        }
        async fn search(
            &self,
            _fetcher: &dyn PageFetcher,
            _keyword: &str,
        ) -> Result<Vec<SearchResult>> {
            Ok(Vec::new())
        }
        fn parse_search_results(&self, _body: &str) -> Vec<SearchResult> {
            Vec::new()
        }
        fn parse_chapter_list(&self, body: &str, page_url: &Url) -> Vec<ChapterRef> {
            body.lines()
                .filter(|l| !l.trim().is_empty())
                .enumerate()
                .map(|(index, path)| ChapterRef {
                    index,
                    title: format!("第{}章", index + 1),
                    url: page_url.join(path.trim()).unwrap().to_string(),
                })
                .collect()
        }
        fn parse_chapter_body(&self, body: &str) -> Result<String> {
            body.strip_prefix("#c:")
                .map(str::to_string)
                .ok_or_else(|| SpiderError::Parse("Content container not found".into()))
        }
    }

    /// 每个 URL 一份脚本：前 `failures` 次失败，之后延迟 `delay` 返回 `body`
    #[derive(Clone)]
    struct Script {
        failures: usize,
        delay: Duration,
        body: String,
    }

    #[derive(Default)]
    struct MockFetcher {
        scripts: HashMap<String, Script>,
        calls: Mutex<HashMap<String, usize>>,
        in_flight: Mutex<(usize, usize)>,
    }

    impl MockFetcher {
        fn calls(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }

        fn peak_in_flight(&self) -> usize {
            self.in_flight.lock().unwrap().1
        }
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch(&self, req: &PageRequest) -> Result<String> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                let n = calls.entry(req.url.clone()).or_insert(0);
                *n += 1;
                *n
            };
            let script = self
                .scripts
                .get(&req.url)
                .cloned()
                .ok_or_else(|| SpiderError::Parse(format!("no script for {}", req.url)))?;

            {
                let mut g = self.in_flight.lock().unwrap();
                g.0 += 1;
                g.1 = g.1.max(g.0);
            }
            tokio::time::sleep(script.delay).await;
            self.in_flight.lock().unwrap().0 -= 1;

            if n <= script.failures {
                return Err(SpiderError::Parse(format!("HTTP 503 on attempt {n}")));
            }
            Ok(script.body)
        }
    }

    const BASE: &str = "http://novel.test/book/1/";

    fn chapter(index: usize) -> ChapterRef {
        ChapterRef {
            index,
            title: format!("第{}章", index + 1),
            url: format!("{BASE}{index}.html"),
        }
    }

    fn meta() -> NovelMeta {
        NovelMeta {
            title: "测试之书".into(),
            author: "佚名".into(),
            source_url: BASE.into(),
        }
    }

    fn engine(fetcher: Arc<MockFetcher>, cap: usize) -> DownloadEngine {
        let site = Arc::new(StubSite {
            base: Url::parse(BASE).unwrap(),
            cap,
        });
        let cfg = SpiderConfig::builder()
            .retry_count(3)
            .retry_backoff_ms(1)
            .build();
        DownloadEngine::new(site, fetcher, &cfg)
    }

    #[tokio::test]
    async fn output_order_ignores_completion_order() {
        let mut fetcher = MockFetcher::default();
        // 越靠前的章节越晚完成
        for i in 0..6 {
            fetcher.scripts.insert(
                chapter(i).url,
                Script {
                    failures: 0,
                    delay: Duration::from_millis(60 - 10 * i as u64),
                    body: format!("#c:正文{i}"),
                },
            );
        }
        let fetcher = Arc::new(fetcher);
        let chapters: Vec<_> = (0..6).rev().map(chapter).collect();

        let novel = engine(fetcher, 6)
            .download_all(meta(), chapters)
            .await
            .unwrap();

        assert_eq!(novel.chapter_count, 6);
        let mut expected = HeaderStyle::Bracketed.render(&meta());
        for i in 0..6 {
            expected.push_str(&format!("\n\n第{}章\n\n正文{}\n", i + 1, i));
        }
        assert_eq!(novel.content, expected);
    }

    #[tokio::test]
    async fn empty_chapter_list_fails_fast() {
        let fetcher = Arc::new(MockFetcher::default());
        let err = engine(fetcher, 3)
            .download_all(meta(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SpiderError::NoChaptersFound));
    }

    #[tokio::test]
    async fn retry_then_succeed_keeps_real_body() {
        let mut fetcher = MockFetcher::default();
        fetcher.scripts.insert(
            chapter(0).url,
            Script {
                failures: 2,
                delay: Duration::ZERO,
                body: "#c:第三次成功".into(),
            },
        );
        let fetcher = Arc::new(fetcher);

        let novel = engine(fetcher.clone(), 3)
            .download_all(meta(), vec![chapter(0)])
            .await
            .unwrap();

        assert!(novel.content.ends_with("\n\n第1章\n\n第三次成功\n"));
        assert!(!novel.content.contains("下载失败"));
        assert_eq!(fetcher.calls(&chapter(0).url), 3);
    }

    #[tokio::test]
    async fn exhausted_chapter_becomes_placeholder() {
        let mut fetcher = MockFetcher::default();
        fetcher.scripts.insert(
            chapter(0).url,
            Script {
                failures: 0,
                delay: Duration::ZERO,
                body: "#c:正常".into(),
            },
        );
        fetcher.scripts.insert(
            chapter(1).url,
            Script {
                failures: 5,
                delay: Duration::ZERO,
                body: "#c:不会出现".into(),
            },
        );
        let fetcher = Arc::new(fetcher);

        let novel = engine(fetcher.clone(), 3)
            .download_all(meta(), vec![chapter(0), chapter(1)])
            .await
            .unwrap();

        assert_eq!(novel.chapter_count, 2);
        assert!(novel
            .content
            .ends_with("\n\n第2章\n\n[下载失败: Parsing error: HTTP 503 on attempt 3]\n"));
        assert_eq!(fetcher.calls(&chapter(1).url), 3);
    }

    #[tokio::test]
    async fn missing_container_counts_as_failed_attempt() {
        let mut fetcher = MockFetcher::default();
        fetcher.scripts.insert(
            chapter(0).url,
            Script {
                failures: 0,
                delay: Duration::ZERO,
                body: "<html>维护中</html>".into(),
            },
        );
        let fetcher = Arc::new(fetcher);

        let novel = engine(fetcher.clone(), 3)
            .download_all(meta(), vec![chapter(0)])
            .await
            .unwrap();

        assert!(novel.content.contains("[下载失败: Parsing error: Content container not found]"));
        assert_eq!(fetcher.calls(&chapter(0).url), 3);
    }

    #[tokio::test]
    async fn worker_pool_never_exceeds_cap() {
        let mut fetcher = MockFetcher::default();
        for i in 0..8 {
            fetcher.scripts.insert(
                chapter(i).url,
                Script {
                    failures: 0,
                    delay: Duration::from_millis(20),
                    body: format!("#c:{i}"),
                },
            );
        }
        let fetcher = Arc::new(fetcher);

        engine(fetcher.clone(), 3)
            .download_all(meta(), (0..8).map(chapter).collect())
            .await
            .unwrap();

        assert!(fetcher.peak_in_flight() <= 3);
    }

    #[tokio::test]
    async fn cancellation_aborts_download() {
        let mut fetcher = MockFetcher::default();
        fetcher.scripts.insert(
            chapter(0).url,
            Script {
                failures: 0,
                delay: Duration::from_secs(30),
                body: "#c:慢".into(),
            },
        );
        let fetcher = Arc::new(fetcher);
        let token = CancellationToken::new();
        let engine = engine(fetcher, 3).with_shutdown(token.clone());

        let cancel = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        let err = engine
            .download_all(meta(), vec![chapter(0)])
            .await
            .unwrap_err();
        cancel.await.unwrap();
        assert!(matches!(err, SpiderError::Cancelled));
    }

    #[tokio::test]
    async fn download_novel_discovers_then_fetches() {
        let mut fetcher = MockFetcher::default();
        fetcher.scripts.insert(
            BASE.into(),
            Script {
                failures: 0,
                delay: Duration::ZERO,
                body: "0.html\n1.html\n".into(),
            },
        );
        for i in 0..2 {
            fetcher.scripts.insert(
                chapter(i).url,
                Script {
                    failures: 0,
                    delay: Duration::ZERO,
                    body: format!("#c:内容{i}"),
                },
            );
        }
        let novel = engine(Arc::new(fetcher), 3)
            .download_novel(meta())
            .await
            .unwrap();
        assert_eq!(novel.chapter_count, 2);
        assert!(novel.content.contains("内容1"));
    }

    #[tokio::test]
    async fn unreachable_index_page_means_no_chapters() {
        let fetcher = Arc::new(MockFetcher::default());
        let err = engine(fetcher, 3).download_novel(meta()).await.unwrap_err();
        assert!(matches!(err, SpiderError::NoChaptersFound));
    }
}
