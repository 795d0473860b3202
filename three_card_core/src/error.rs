use crate::state::Phase;
use thiserror::Error;

/// 牌面数据不合法（一般来自线上解码）
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CardError {
    #[error("无效的点数: {0}，应在 2 到 14 之间")]
    InvalidRank(u8),

    #[error("无效的花色: {0}，应在 1 到 4 之间")]
    InvalidSuit(u8),

    #[error("一手牌中出现了重复的牌")]
    DuplicateCard,
}

/// 牌堆错误。每局都用一副新牌，只发 6 张，正常情况下不可能出现。
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeckError {
    #[error("牌堆已空，剩余 {remaining} 张，需要 {needed} 张")]
    Empty { remaining: usize, needed: usize },

    #[error("牌堆数据损坏: {0}")]
    Corrupt(#[from] CardError),
}

/// 下注校验失败。可恢复：状态不变，玩家重新下注即可。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("底注 (Ante) 必须为 0 或在 {min} 到 {max} 之间，收到 {value}")]
    Ante { value: u32, min: u32, max: u32 },

    #[error("对子加注 (Pair Plus) 必须为 0 或在 {min} 到 {max} 之间，收到 {value}")]
    PairPlus { value: u32, min: u32, max: u32 },

    #[error("无效的金额: {0:?}")]
    NotANumber(String),
}

/// 编解码错误
#[derive(Debug, Error)]
pub enum WireError {
    #[error("消息编码失败: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("消息解码失败: {0}")]
    Decode(#[source] serde_json::Error),
}

/// 会话状态机错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("当前阶段 {phase:?} 不接受 {kind} 消息")]
    UnexpectedMessage { phase: Phase, kind: &'static str },

    #[error("会话已关闭")]
    Closed,

    #[error("内部错误: {0}")]
    Deck(#[from] DeckError),

    #[error("会话状态不一致: {0}")]
    Inconsistent(&'static str),
}

impl SessionError {
    /// 除了下注校验失败，其余错误都会终止会话
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SessionError::Validation(_))
    }
}
