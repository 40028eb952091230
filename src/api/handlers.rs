use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::core::error::SpiderError;
use crate::core::model::{NovelMeta, SearchResult};

use super::AppState;

const DEFAULT_TITLE: &str = "未知小说";
const DEFAULT_AUTHOR: &str = "未知作者";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
    site: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    url: Option<String>,
    title: Option<String>,
    author: Option<String>,
    site: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub keyword: String,
    pub count: usize,
    pub results: Vec<SearchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DownloadResponse {
    fn failed(error: String) -> Self {
        Self {
            success: false,
            title: None,
            author: None,
            content_length: None,
            content: None,
            error: Some(error),
        }
    }
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn search(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> Response {
    let Some(keyword) = non_blank(q.q) else {
        return bad_request("参数 q 不能为空".into());
    };

    let engine = match state.engine(q.site.as_deref()) {
        Ok(engine) => engine,
        Err(e @ SpiderError::UnknownSite(_)) => return bad_request(e.to_string()),
        Err(e) => {
            error!(error = %e, "引擎初始化失败");
            let body = SearchResponse {
                keyword,
                count: 0,
                results: Vec::new(),
                error: Some(e.to_string()),
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }
    };

    match engine.search(&keyword).await {
        Ok(results) => Json(SearchResponse {
            keyword,
            count: results.len(),
            results,
            error: None,
        })
        .into_response(),
        Err(e) => {
            let status = if e.is_surfaced() {
                StatusCode::BAD_GATEWAY
            } else {
                error!(error = %e, "搜索失败");
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let body = SearchResponse {
                keyword,
                count: 0,
                results: Vec::new(),
                error: Some(e.to_string()),
            };
            (status, Json(body)).into_response()
        }
    }
}

pub async fn download(
    State(state): State<AppState>,
    Query(q): Query<DownloadQuery>,
) -> Response {
    let Some(raw_url) = non_blank(q.url) else {
        return bad_request("参数 url 不能为空".into());
    };
    let title = q.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let author = q.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

    let engine = match state.engine(q.site.as_deref()) {
        Ok(engine) => engine,
        Err(e @ SpiderError::UnknownSite(_)) => return bad_request(e.to_string()),
        Err(e) => {
            error!(error = %e, "引擎初始化失败");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DownloadResponse::failed(e.to_string())),
            )
                .into_response();
        }
    };

    let meta = NovelMeta {
        title: title.clone(),
        author: author.clone(),
        source_url: engine.site().resolve(&raw_url),
    };
    info!(title = %meta.title, url = %meta.source_url, "开始下载");

    match engine.download_novel(meta).await {
        Ok(novel) => Json(DownloadResponse {
            success: true,
            title: Some(title),
            author: Some(author),
            content_length: Some(novel.char_len()),
            content: Some(novel.content),
            error: None,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "下载失败");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DownloadResponse::failed(e.to_string())),
            )
                .into_response()
        }
    }
}
