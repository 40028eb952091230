//! 应用程序入口 (Application Entrypoint)
//!
//! 负责 CLI 指令解析、遥测层初始化、配置加载及 HTTP 服务生命周期管理。

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use novel_proxy::api::{self, AppState};
use novel_proxy::core::config::AppConfig;

/// 命令行参数，优先级高于配置文件
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
    /// 监听地址
    #[arg(long)]
    host: Option<String>,
    /// 监听端口
    #[arg(short, long)]
    port: Option<u16>,
    /// 默认站点标识 (qu02 / biquge)
    #[arg(short, long)]
    site: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    novel_proxy::logging::init()?;

    let cli = Cli::parse();
    let mut config = AppConfig::load_from(&cli.config)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(site) = cli.site {
        config.default_site = site;
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(default_site = %config.default_site, "starting novel-proxy");

    // 信号处理与优雅退出 (Signal Handling)
    let shutdown = CancellationToken::new();
    let state = AppState::new(config).with_shutdown(shutdown.clone());
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("收到退出信号，正在关闭...");
            }
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
