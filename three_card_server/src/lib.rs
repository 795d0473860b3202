//! 三张牌扑克服务器
//!
//! 每个 WebSocket 连接对应一个独立的任务和一个 `Session`，
//! 连接之间只共享 `GameManager`（事件日志与在线连接数）。

mod config;
mod connection;
mod manager;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ws::WebSocketUpgrade, ConnectInfo, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;

use three_card_core::BetLimits;

pub use config::{ConfigError, ServerConfig};
pub use connection::ConnectionError;
pub use manager::{GameManager, LogEntry};

/// 状态接口返回的最近事件条数
const STATUS_EVENTS: usize = 50;

// 服务器全局状态
pub struct AppState {
    pub manager: Arc<GameManager>,
    pub limits: BetLimits,
    pub decision_timeout: Option<Duration>,
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub connections: usize,
    pub events: Vec<String>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> SharedState {
        Arc::new(AppState {
            manager: Arc::new(GameManager::new()),
            limits: config.limits(),
            decision_timeout: config.decision_timeout(),
        })
    }
}

pub fn app(state: SharedState) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

/// 在给定的监听器上运行服务器，直到 `shutdown` 完成
pub async fn serve(
    listener: TcpListener,
    state: SharedState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, app(state).into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await
}

/// 处理 WebSocket 连接请求
async fn websocket_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection::handle_socket(socket, peer, state))
}

async fn status_handler(State(state): State<SharedState>) -> Json<StatusReport> {
    Json(StatusReport {
        connections: state.manager.connection_count(),
        events: state.manager.recent(STATUS_EVENTS).iter().map(ToString::to_string).collect(),
    })
}
