//! 领域模型 (Domain Model)
//!
//! 所有实体只存活于单次请求之内，不做持久化。

use serde::{Deserialize, Serialize};

/// 搜索结果条目
///
/// 字段名与对外 JSON 保持一致 (`articlename` / `author` / `url_list`)。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "articlename")]
    pub title: String,
    pub author: String,
    /// 站点返回的相对或绝对链接
    #[serde(rename = "url_list")]
    pub url: String,
}

/// 章节引用，由目录解析按阅读顺序产生
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRef {
    /// 从 0 开始的稠密序号，最终拼接只依赖它排序
    pub index: usize,
    pub title: String,
    pub url: String,
}

/// 单章抓取结果
///
/// `body` 已经是最终文本块；失败时为带章节名与原因的占位文本。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterContent {
    pub index: usize,
    pub title: String,
    pub body: String,
}

impl ChapterContent {
    pub fn success(chapter: &ChapterRef, text: &str) -> Self {
        Self {
            index: chapter.index,
            title: chapter.title.clone(),
            body: format!("\n\n{}\n\n{}\n", chapter.title, text),
        }
    }

    pub fn failed(chapter: &ChapterRef, reason: &str) -> Self {
        Self {
            index: chapter.index,
            title: chapter.title.clone(),
            body: format!("\n\n{}\n\n[下载失败: {}]\n", chapter.title, reason),
        }
    }

    /// 工作任务异常退出时的补位内容
    pub fn lost(chapter: &ChapterRef) -> Self {
        Self {
            index: chapter.index,
            title: chapter.title.clone(),
            body: format!("\n\n{}\n\n[内容丢失]\n", chapter.title),
        }
    }
}

/// 下载请求携带的书籍信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelMeta {
    pub title: String,
    pub author: String,
    /// 已补全为绝对地址的目录页
    pub source_url: String,
}

/// 文本头部样式，随站点变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// `书名：{title}\n作者：{author}\n来源：{url}\n\n`
    Labeled,
    /// `《{title}》\n作者：{author}\n来源：{url}\n\n`
    Bracketed,
}

impl HeaderStyle {
    pub fn render(self, meta: &NovelMeta) -> String {
        match self {
            HeaderStyle::Labeled => format!(
                "书名：{}\n作者：{}\n来源：{}\n\n",
                meta.title, meta.author, meta.source_url
            ),
            HeaderStyle::Bracketed => format!(
                "《{}》\n作者：{}\n来源：{}\n\n",
                meta.title, meta.author, meta.source_url
            ),
        }
    }
}

/// 最终拼接完成的整本文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelText {
    pub meta: NovelMeta,
    /// 章节块数量
    pub chapter_count: usize,
    pub content: String,
}

impl NovelText {
    /// 按序号升序拼接；调用方保证 `chapters` 已经按 index 排列
    pub fn assemble(meta: NovelMeta, style: HeaderStyle, chapters: &[ChapterContent]) -> Self {
        let mut content = style.render(&meta);
        for chapter in chapters {
            content.push_str(&chapter.body);
        }
        Self {
            meta,
            chapter_count: chapters.len(),
            content,
        }
    }

    /// 按 Unicode 标量计数的字符数
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}
