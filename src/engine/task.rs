//! 单章抓取与重试单元
//!
//! 永不向外抛错：重试耗尽时把失败原因折叠进占位文本。

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::{error, info, warn};

use crate::core::error::{Result, SpiderError};
use crate::core::model::{ChapterContent, ChapterRef};
use crate::interfaces::PageRequest;

use super::context::RuntimeContext;

/// 在工作池许可内抓取一章
pub async fn fetch_chapter(chapter: ChapterRef, ctx: Arc<RuntimeContext>) -> ChapterContent {
    let _permit = match ctx.semaphore.acquire().await {
        Ok(permit) => permit,
        Err(e) => return ChapterContent::failed(&chapter, &e.to_string()),
    };

    let content = match fetch_with_retry(&chapter, &ctx).await {
        Ok(text) => ChapterContent::success(&chapter, &text),
        Err(e) => {
            error!(chapter = %chapter.title, index = chapter.index, "{}", e);
            let reason = match e {
                SpiderError::ExhaustedRetries { reason, .. } => reason,
                other => other.to_string(),
            };
            ChapterContent::failed(&chapter, &reason)
        }
    };

    let completed = ctx.completed_chapters.fetch_add(1, Ordering::SeqCst) + 1;
    info!("[{}/{}] {}", completed, ctx.total_chapters, chapter.title);

    content
}

/// 固定次数重试，间隔固定，不做指数增长
pub async fn fetch_with_retry(chapter: &ChapterRef, ctx: &RuntimeContext) -> Result<String> {
    let attempts = ctx.retry.attempts;
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match fetch_once(chapter, ctx).await {
            Ok(text) => return Ok(text),
            Err(e) => {
                warn!(
                    chapter = %chapter.title,
                    attempt,
                    network = e.is_network(),
                    "章节抓取失败 (第 {}/{} 次): {}",
                    attempt,
                    attempts,
                    e
                );
                last_error = e.to_string();
            }
        }

        if attempt < attempts {
            tokio::time::sleep(ctx.retry.backoff).await;
        }
    }

    Err(SpiderError::ExhaustedRetries {
        attempts,
        reason: last_error,
    })
}

/// 单次尝试：GET 后解析正文，缺少正文容器同样算作失败
async fn fetch_once(chapter: &ChapterRef, ctx: &RuntimeContext) -> Result<String> {
    let html = ctx.fetcher.fetch(&PageRequest::get(&chapter.url)).await?;
    ctx.site.parse_chapter_body(&html)
}
