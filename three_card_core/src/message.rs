use crate::card::Hand;
use crate::error::WireError;
use crate::state::{BetLimits, RoundResult};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

// --- 客户端 -> 服务器 的消息 ---
// 一个 WebSocket 文本帧对应一条消息，用 `kind` 字段区分类型。

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum ClientMessage {
    /// 开局下注。每一注为 0 或在桌面上下限内
    Bets { ante: u32, pair_plus: u32 },
    /// 看牌后跟注，跟注金额等于底注
    Play,
    /// 看牌后弃牌
    Fold,
    /// 主动断开
    Disconnect,
    /// 无法识别的消息类型，忽略但记录
    #[serde(other)]
    Unknown,
}

// --- 服务器 -> 客户端 的消息 ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum ServerMessage {
    /// 连接建立后发送一次
    Welcome { limits: BetLimits, total_winnings: i64 },

    /// 发牌。只包含玩家自己的手牌，庄家手牌在结算时才公开
    Deal { player_hand: Hand },

    /// 本局结算结果
    Result(RoundResult),

    /// 会话因协议错误即将关闭
    Error { message: String },
}

impl ClientMessage {
    /// 消息类型名，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Bets { .. } => "Bets",
            ClientMessage::Play => "Play",
            ClientMessage::Fold => "Fold",
            ClientMessage::Disconnect => "Disconnect",
            ClientMessage::Unknown => "Unknown",
        }
    }
}

/// 编码为一个文本帧
pub fn encode<T: Serialize>(message: &T) -> Result<String, WireError> {
    serde_json::to_string(message).map_err(WireError::Encode)
}

/// 从一个文本帧解码
pub fn decode<T: DeserializeOwned>(frame: &str) -> Result<T, WireError> {
    serde_json::from_str(frame).map_err(WireError::Decode)
}
