//! 客户端一侧的牌桌视图
//!
//! 把服务器消息分发给表现层回调，并在发送前用同一套规则校验下注。

use crate::card::Hand;
use crate::error::ValidationError;
use crate::message::{ClientMessage, ServerMessage};
use crate::state::{BetLimits, Outcome, Phase, RoundResult};

/// 表现层实现的回调
pub trait RoundObserver {
    fn on_welcome(&mut self, _limits: BetLimits, _total_winnings: i64) {}

    fn on_dealt(&mut self, hand: &Hand);

    /// 结算时公开的完整信息，在 `on_result` 之前调用
    fn on_showdown(&mut self, _result: &RoundResult) {}

    fn on_result(&mut self, outcome: Outcome, round_delta: i64, total_winnings: i64);

    fn on_error(&mut self, message: &str);
}

#[derive(Debug, Clone)]
pub struct ClientTable {
    limits: BetLimits,
    phase: Phase,
    hand: Option<Hand>,
    /// 服务器记录的本连接累计输赢
    server_total: i64,
    /// 重新开始时的累计值，显示的累计从这里起算
    baseline: i64,
    /// 已发出 Bets/Play/Fold，还没等到 Deal 或 Result
    in_flight: bool,
}

impl ClientTable {
    pub fn new() -> Self {
        ClientTable {
            limits: BetLimits::default(),
            phase: Phase::AwaitingBets,
            hand: None,
            server_total: 0,
            baseline: 0,
            in_flight: false,
        }
    }

    pub fn limits(&self) -> BetLimits {
        self.limits
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn hand(&self) -> Option<&Hand> {
        self.hand.as_ref()
    }

    /// 自上次重新开始以来的累计输赢
    pub fn total_winnings(&self) -> i64 {
        self.server_total - self.baseline
    }

    /// 校验用户输入的下注，通过后生成 Bets 消息
    pub fn submit_bets(&self, ante: &str, pair_plus: &str) -> Result<ClientMessage, ValidationError> {
        let bets = self.limits.submit_bets(ante, pair_plus)?;
        Ok(ClientMessage::Bets { ante: bets.ante, pair_plus: bets.pair_plus })
    }

    /// 是否正在等待服务器回应上一条操作
    pub fn waiting_for_server(&self) -> bool {
        self.in_flight
    }

    /// 现在是否可以开始新的一局
    pub fn can_bet(&self) -> bool {
        !self.in_flight && matches!(self.phase, Phase::AwaitingBets | Phase::Resolved)
    }

    /// 现在是否可以跟注或弃牌
    pub fn awaiting_decision(&self) -> bool {
        !self.in_flight && self.phase == Phase::Dealt
    }

    /// 记录一条已发出的消息。在收到回应之前不再允许新的下注或决定。
    pub fn sent(&mut self, msg: &ClientMessage) {
        if matches!(msg, ClientMessage::Bets { .. } | ClientMessage::Play | ClientMessage::Fold) {
            self.in_flight = true;
        }
    }

    /// 重新开始：显示的累计输赢清零，服务器上的记录不变
    pub fn fresh_start(&mut self) {
        self.baseline = self.server_total;
    }

    pub fn dispatch(&mut self, msg: ServerMessage, observer: &mut impl RoundObserver) {
        match msg {
            ServerMessage::Welcome { limits, total_winnings } => {
                self.limits = limits;
                self.server_total = total_winnings;
                self.baseline = 0;
                observer.on_welcome(limits, self.total_winnings());
            }
            ServerMessage::Deal { player_hand } => {
                self.hand = Some(player_hand);
                self.phase = Phase::Dealt;
                self.in_flight = false;
                observer.on_dealt(&player_hand);
            }
            ServerMessage::Result(result) => {
                self.phase = Phase::Resolved;
                self.in_flight = false;
                self.server_total = result.total_winnings;
                observer.on_showdown(&result);
                observer.on_result(result.outcome, result.round_delta, self.total_winnings());
            }
            ServerMessage::Error { message } => {
                self.phase = Phase::Closed;
                self.in_flight = false;
                observer.on_error(&message);
            }
        }
    }

    /// 连接中断时调用
    pub fn connection_lost(&mut self, reason: &str, observer: &mut impl RoundObserver) {
        if self.phase != Phase::Closed {
            self.phase = Phase::Closed;
            self.in_flight = false;
            observer.on_error(reason);
        }
    }
}

impl Default for ClientTable {
    fn default() -> Self {
        ClientTable::new()
    }
}
