use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitStream, StreamExt};
use futures_util::SinkExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use three_card_core::{decode, encode, ClientMessage, Phase, ServerMessage, Session, SessionError, WireError};

use crate::manager::GameManager;
use crate::SharedState;

/// 会话级错误，出现后连接关闭
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("连接错误: {0}")]
    Transport(#[from] axum::Error),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("不支持二进制帧")]
    BinaryFrame,

    #[error("发送通道已关闭")]
    WriterClosed,
}

impl ConnectionError {
    /// 协议错误需要在关闭前告知客户端；传输层错误则无法再发送
    fn is_protocol(&self) -> bool {
        matches!(self, ConnectionError::Wire(_) | ConnectionError::Session(_) | ConnectionError::BinaryFrame)
    }
}

/// 连接计数守卫。无论连接以何种方式结束，释放时都会把计数减一。
struct ConnectionGuard {
    manager: Arc<GameManager>,
    peer: SocketAddr,
}

impl ConnectionGuard {
    fn open(manager: Arc<GameManager>, peer: SocketAddr) -> Self {
        manager.connection_opened(peer);
        ConnectionGuard { manager, peer }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.manager.connection_closed(self.peer);
    }
}

/// 处理单个 WebSocket 连接的生命周期
pub(crate) async fn handle_socket(socket: WebSocket, peer: SocketAddr, state: SharedState) {
    let _guard = ConnectionGuard::open(state.manager.clone(), peer);
    let (mut sender, mut receiver) = socket.split();

    // 创建一个 MPSC 通道，用于把会话产生的消息交给发送任务
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(32);

    // 启动一个新任务，专门负责将 MPSC 通道中的消息发送到 WebSocket
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let payload = match encode(&msg) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("消息编码失败: {}", e);
                    break;
                }
            };
            if sender.send(Message::Text(payload.into())).await.is_err() {
                // 发送失败，说明客户端已断开，退出任务
                break;
            }
        }
        let _ = sender.close().await;
    });

    let mut session = Session::new(peer.to_string(), state.limits, state.manager.clone());
    info!(session = %session.id(), %peer, "会话开始");

    match run_session(&mut session, &mut receiver, &tx, state.decision_timeout).await {
        Ok(()) => debug!(session = %session.id(), "客户端正常断开"),
        Err(e) => {
            warn!(session = %session.id(), error = %e, "会话异常终止");
            state.manager.record(format!("客户端 {} 异常断开: {}", peer, e));
            if e.is_protocol() {
                let _ = tx.send(ServerMessage::Error { message: e.to_string() }).await;
            }
        }
    }
    session.close();

    // 关闭通道后发送任务会把剩余消息发完再关闭连接
    drop(tx);
    let _ = writer.await;
    info!(session = %session.id(), total_winnings = session.total_winnings(), "会话结束");
}

/// 会话主循环，读取客户端消息并驱动状态机，直到会话关闭
async fn run_session(
    session: &mut Session,
    receiver: &mut SplitStream<WebSocket>,
    tx: &mpsc::Sender<ServerMessage>,
    decision_timeout: Option<Duration>,
) -> Result<(), ConnectionError> {
    send(tx, session.welcome()).await?;

    while !session.is_closed() {
        let frame = match (decision_timeout, session.phase()) {
            (Some(limit), Phase::Dealt) => match tokio::time::timeout(limit, receiver.next()).await {
                Ok(frame) => frame,
                Err(_) => {
                    for msg in session.expire_decision()? {
                        send(tx, msg).await?;
                    }
                    continue;
                }
            },
            _ => receiver.next().await,
        };

        let msg = match frame {
            // 连接已关闭，等同于 Disconnect
            None | Some(Ok(Message::Close(_))) => ClientMessage::Disconnect,
            Some(Ok(Message::Text(text))) => decode::<ClientMessage>(text.as_str())?,
            Some(Ok(Message::Binary(_))) => return Err(ConnectionError::BinaryFrame),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        };

        match session.handle(msg) {
            Ok(replies) => {
                for reply in replies {
                    send(tx, reply).await?;
                }
            }
            // 下注被拒绝不影响会话，等待玩家重新下注
            Err(e) if !e.is_fatal() => debug!(session = %session.id(), error = %e, "忽略无效下注"),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

async fn send(tx: &mpsc::Sender<ServerMessage>, msg: ServerMessage) -> Result<(), ConnectionError> {
    tx.send(msg).await.map_err(|_| ConnectionError::WriterClosed)
}
