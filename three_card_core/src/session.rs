use crate::deck::Deck;
use crate::error::SessionError;
use crate::message::{ClientMessage, ServerMessage};
use crate::state::{BetLimits, Bets, Decision, Phase, RoundRecord, SessionId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, warn};

/// 事件日志协作者。服务器在所有会话之间共享一个实现。
pub trait EventLog: Send + Sync {
    fn log_event(&self, text: String);
}

/// 单个连接的牌局状态机
///
/// 阶段流转：
/// `AwaitingBets -> Dealt -> (AwaitingDecision) -> Resolved -> Dealt -> ...`，
/// 任意阶段断开或出现致命错误都进入 `Closed`。
///
/// 会话之间不共享任何牌局状态，唯一共享的是 `EventLog`。
pub struct Session<R = StdRng> {
    id: SessionId,
    peer: String,
    phase: Phase,
    round: Option<RoundRecord>,
    total_winnings: i64,
    limits: BetLimits,
    rng: R,
    log: Arc<dyn EventLog>,
}

impl Session<StdRng> {
    pub fn new(peer: impl Into<String>, limits: BetLimits, log: Arc<dyn EventLog>) -> Self {
        Session::with_rng(peer, limits, log, StdRng::from_os_rng())
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(peer: impl Into<String>, limits: BetLimits, log: Arc<dyn EventLog>, rng: R) -> Self {
        Session {
            id: SessionId::new_v4(),
            peer: peer.into(),
            phase: Phase::AwaitingBets,
            round: None,
            total_winnings: 0,
            limits,
            rng,
            log,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn total_winnings(&self) -> i64 {
        self.total_winnings
    }

    /// 当前（或刚结算完的）这一局
    pub fn round(&self) -> Option<&RoundRecord> {
        self.round.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    /// 连接建立时发给客户端的欢迎消息
    pub fn welcome(&self) -> ServerMessage {
        ServerMessage::Welcome { limits: self.limits, total_winnings: self.total_winnings }
    }

    /// 处理一条客户端消息，返回需要发送给客户端的消息
    ///
    /// 下注校验失败返回 `SessionError::Validation`，状态不变；
    /// 其余错误都是致命的，会话随之进入 `Closed`。
    pub fn handle(&mut self, msg: ClientMessage) -> Result<Vec<ServerMessage>, SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }

        match (self.phase, msg) {
            (_, ClientMessage::Disconnect) => {
                self.close();
                Ok(vec![])
            }
            (_, ClientMessage::Unknown) => {
                warn!(session = %self.id, phase = ?self.phase, "收到无法识别的消息类型，已忽略");
                self.log.log_event(format!("客户端 {}: 收到无法识别的消息类型", self.peer));
                Ok(vec![])
            }
            (Phase::AwaitingBets | Phase::Resolved, ClientMessage::Bets { ante, pair_plus }) => {
                self.start_round(Bets { ante, pair_plus })
            }
            (Phase::Dealt, ClientMessage::Play) => {
                self.phase = Phase::AwaitingDecision;
                self.finish_round(Decision::Play)
            }
            (Phase::Dealt, ClientMessage::Fold) => self.finish_round(Decision::Fold),
            (phase, other) => {
                self.close();
                Err(SessionError::UnexpectedMessage { phase, kind: other.kind() })
            }
        }
    }

    /// 玩家在限定时间内没有做出选择，按弃牌处理。不在 `Dealt` 阶段时什么都不做。
    pub fn expire_decision(&mut self) -> Result<Vec<ServerMessage>, SessionError> {
        if self.phase != Phase::Dealt {
            return Ok(vec![]);
        }
        self.log.log_event(format!("客户端 {}: 等待决定超时，自动弃牌", self.peer));
        self.finish_round(Decision::Fold)
    }

    /// 进入终止状态，之后不再接受任何消息
    pub fn close(&mut self) {
        if !self.is_closed() {
            debug!(session = %self.id, phase = ?self.phase, "会话关闭");
            self.phase = Phase::Closed;
            self.round = None;
        }
    }

    // --- 状态流转 ---

    fn start_round(&mut self, bets: Bets) -> Result<Vec<ServerMessage>, SessionError> {
        let bets = match self.limits.validate(bets) {
            Ok(bets) => bets,
            Err(e) => {
                debug!(session = %self.id, error = %e, "下注被拒绝");
                self.log.log_event(format!("客户端 {}: 下注被拒绝 ({})", self.peer, e));
                return Err(e.into());
            }
        };

        // 每局都用一副新洗的牌
        let mut deck = Deck::shuffled(&mut self.rng);
        let dealt = deck.deal_hand().and_then(|player| deck.deal_hand().map(|dealer| (player, dealer)));
        let (player_hand, dealer_hand) = match dealt {
            Ok(hands) => hands,
            Err(e) => {
                self.close();
                return Err(e.into());
            }
        };

        self.round = Some(RoundRecord::new(bets, player_hand, dealer_hand));
        self.phase = Phase::Dealt;
        debug!(session = %self.id, ante = bets.ante, pair_plus = bets.pair_plus, "已发牌");

        Ok(vec![ServerMessage::Deal { player_hand }])
    }

    fn finish_round(&mut self, decision: Decision) -> Result<Vec<ServerMessage>, SessionError> {
        let Some(round) = self.round.as_mut() else {
            self.phase = Phase::Closed;
            return Err(SessionError::Inconsistent("发牌后没有牌局记录"));
        };

        let outcome = round.resolve(decision);
        self.total_winnings += round.round_delta();
        self.phase = Phase::Resolved;

        let bets = round.bets;
        let mut text = match decision {
            Decision::Fold => {
                let mut s = format!("玩家弃牌，输掉底注 ${}", bets.ante);
                if bets.pair_plus > 0 {
                    s += &format!(" 和对子加注 ${}", bets.pair_plus);
                }
                s
            }
            Decision::Play => format!(
                "{}{}。下注: 底注=${}, 跟注=${}, 对子加注=${}",
                outcome,
                if round.dealer_qualifies { "" } else { "（庄家未达资格）" },
                bets.ante,
                round.play,
                bets.pair_plus,
            ),
        };
        if round.pair_plus_payout > 0 {
            text += &format!("，赢得对子加注 ${}", round.pair_plus_payout);
        }
        self.log.log_event(format!("客户端 {}: {}", self.peer, text));

        let Some(result) = round.to_result(self.total_winnings) else {
            self.phase = Phase::Closed;
            return Err(SessionError::Inconsistent("结算后没有结果"));
        };
        Ok(vec![ServerMessage::Result(result)])
    }
}

// --- 单元测试 ---
