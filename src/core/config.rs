//! 配置管理系统 (Configuration Management)
//!
//! 负责 `config.toml` 的反序列化及其层级结构映射，支持环境变量覆盖与默认值回退机制。

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use bon::Builder;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::core::error::{Result, SpiderError};

/// 全局应用配置
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct AppConfig {
    /// HTTP 服务监听参数
    #[serde(default)]
    #[builder(default)]
    pub server: ServerConfig,

    /// 抓取引擎通用参数
    #[serde(default)]
    #[builder(default)]
    pub spider: SpiderConfig,

    /// 请求未指定 `site` 时使用的站点
    #[serde(default = "default_site")]
    #[builder(default = default_site())]
    pub default_site: String,

    /// 站点特定配置覆盖映射
    #[serde(default)]
    #[builder(default)]
    pub sites: HashMap<String, SiteConfig>,
}

/// 服务监听配置
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    #[builder(default = default_host())]
    pub host: String,
    #[serde(default = "default_port")]
    #[builder(default = default_port())]
    pub port: u16,
}

/// 抓取引擎参数
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct SpiderConfig {
    /// 单次 HTTP 请求超时 (秒)
    #[serde(default = "default_timeout_secs")]
    #[builder(default = default_timeout_secs())]
    pub timeout_secs: u64,
    /// 单章最大尝试次数
    #[serde(default = "default_retry_count")]
    #[builder(default = default_retry_count())]
    pub retry_count: u32,
    /// 两次尝试之间的固定等待 (毫秒)，不做指数退避
    #[serde(default = "default_retry_backoff_ms")]
    #[builder(default = default_retry_backoff_ms())]
    pub retry_backoff_ms: u64,
}

/// 站点特定配置覆盖
#[derive(Debug, Deserialize, Builder, Clone, Default)]
pub struct SiteConfig {
    /// 自定义域名 (镜像站点或测试桩)
    pub base_url: Option<String>,
    /// 站点独占并发上限
    pub concurrent_tasks: Option<usize>,
    /// 覆盖默认 User-Agent
    pub user_agent: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            spider: SpiderConfig::default(),
            default_site: default_site(),
            sites: HashMap::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl SpiderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

fn default_site() -> String {
    "qu02".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_retry_count() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    1000
}

impl AppConfig {
    /// 从工作目录下的 `config.toml` 加载
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// 从指定文件加载，并叠加 `NOVEL__*` 环境变量与裸 `PORT`
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let builder = Config::builder();

        let builder = if config_path.exists() {
            builder.add_source(File::from(config_path))
        } else {
            builder
        };

        let mut builder = builder.add_source(
            Environment::with_prefix("NOVEL")
                .prefix_separator("__")
                .separator("__"),
        );

        if let Ok(port) = std::env::var("PORT") {
            builder = builder
                .set_override("server.port", port)
                .map_err(SpiderError::Config)?;
        }

        let settings = builder.build().map_err(SpiderError::Config)?;
        settings.try_deserialize().map_err(SpiderError::Config)
    }

    /// 获取站点配置，未配置时返回空覆盖
    pub fn site(&self, id: &str) -> SiteConfig {
        self.sites.get(id).cloned().unwrap_or_default()
    }
}
