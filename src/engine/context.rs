//! 引擎运行时上下文 (Runtime Context)
//!
//! 维护单次下载内并发任务间的共享状态、资源配额及进度统计。

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::core::config::SpiderConfig;
use crate::interfaces::{PageFetcher, SiteProfile};

/// 单章重试策略：固定次数、固定间隔
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl From<&SpiderConfig> for RetryPolicy {
    fn from(cfg: &SpiderConfig) -> Self {
        Self {
            attempts: cfg.retry_count.max(1),
            backoff: cfg.retry_backoff(),
        }
    }
}

/// 任务执行运行时上下文
///
/// 所有字段对工作任务只读，完成计数除外。
pub struct RuntimeContext {
    /// 目标站点
    pub site: Arc<dyn SiteProfile>,
    /// 页面获取实现 (共享只读的连接上下文)
    pub fetcher: Arc<dyn PageFetcher>,
    /// 并发控制信号量，许可数即工作池大小
    pub semaphore: Arc<Semaphore>,
    pub retry: RetryPolicy,
    /// 本次下载的章节总数
    pub total_chapters: usize,
    /// 原子计数：已完成的章节数
    pub completed_chapters: AtomicUsize,
}

impl RuntimeContext {
    pub fn new(
        site: Arc<dyn SiteProfile>,
        fetcher: Arc<dyn PageFetcher>,
        workers: usize,
        retry: RetryPolicy,
        total_chapters: usize,
    ) -> Self {
        Self {
            site,
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers)),
            retry,
            total_chapters,
            completed_chapters: AtomicUsize::new(0),
        }
    }
}
