use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use three_card_server::{serve, AppState, ServerConfig};

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();
    init_logger(config.verbose);

    if let Err(e) = config.validate() {
        error!("配置无效: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    let state = AppState::new(&config);
    let addr = config.addr();
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("无法监听 {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("服务器正在监听 {}", addr);
    state.manager.record(format!("服务器启动，端口 {}", addr.port()));

    if let Err(e) = serve(listener, state.clone(), shutdown_signal()).await {
        error!("服务器异常退出: {}", e);
        std::process::exit(1);
    }

    state.manager.record("服务器已停止");
}

fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("three_card_server=debug,three_card_core=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("three_card_server=info,three_card_core=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("收到停止信号，正在关闭服务器");
    }
}
