//! 小说抓取代理 (Novel Scraping Proxy)
//!
//! 按关键字搜索目标站点，或按目录页地址并发抓取全部章节并拼接为纯文本。

pub mod api;
pub mod core;
pub mod engine;
pub mod interfaces;
pub mod logging;
pub mod network;
pub mod sites;
pub mod utils;
