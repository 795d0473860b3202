use crate::card::Hand;
use crate::error::ValidationError;
use crate::eval::{compare, dealer_qualifies, pair_plus_payout};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 每个连接一个会话，用 Uuid 区分
pub type SessionId = uuid::Uuid;

/// 下注上下限。每一注都必须为 0 或落在 [min, max] 内。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetLimits {
    pub min: u32,
    pub max: u32,
}

/// 开局时提交的下注
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bets {
    pub ante: u32,
    pub pair_plus: u32,
}

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    AwaitingBets,
    /// 已发牌，等待玩家选择跟注或弃牌
    Dealt,
    /// 玩家已跟注，等待结算（只在处理 Play 的过程中短暂存在）
    AwaitingDecision,
    /// 本局已结算，可以开始下一局
    Resolved,
    Closed,
}

/// 玩家看牌后的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Play,
    Fold,
}

/// 一局的结果（针对底注和跟注）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    PlayerWins,
    DealerWins,
    Push,
}

/// 当前这一局的记录。下注被接受时创建，结算后交给日志并丢弃。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    pub bets: Bets,
    /// 跟注金额，跟注时等于底注，弃牌时为 0
    pub play: u32,
    pub player_hand: Hand,
    pub dealer_hand: Hand,
    pub dealer_qualifies: bool,
    pub decision: Option<Decision>,
    pub outcome: Option<Outcome>,
    pub pair_plus_payout: u32,
}

/// Result 消息的内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub outcome: Outcome,
    pub folded: bool,
    pub dealer_qualifies: bool,
    pub pair_plus_payout: u32,
    pub bets: Bets,
    pub play: u32,
    pub player_hand: Hand,
    /// 庄家手牌只在结算时公开
    pub dealer_hand: Hand,
    /// 本局输赢
    pub round_delta: i64,
    /// 本连接累计输赢
    pub total_winnings: i64,
}

impl Default for BetLimits {
    fn default() -> Self {
        BetLimits { min: 5, max: 25 }
    }
}

impl BetLimits {
    /// 单注是否合法：0 表示不下这一注
    pub fn allows(&self, amount: u32) -> bool {
        amount == 0 || (self.min..=self.max).contains(&amount)
    }

    pub fn validate(&self, bets: Bets) -> Result<Bets, ValidationError> {
        if !self.allows(bets.ante) {
            return Err(ValidationError::Ante { value: bets.ante, min: self.min, max: self.max });
        }
        if !self.allows(bets.pair_plus) {
            return Err(ValidationError::PairPlus { value: bets.pair_plus, min: self.min, max: self.max });
        }
        Ok(bets)
    }

    /// 表现层提交的原始输入：解析并校验
    pub fn submit_bets(&self, ante: &str, pair_plus: &str) -> Result<Bets, ValidationError> {
        let parse = |s: &str| {
            s.trim().parse::<u32>().map_err(|_| ValidationError::NotANumber(s.to_string()))
        };
        self.validate(Bets { ante: parse(ante)?, pair_plus: parse(pair_plus)? })
    }
}

impl RoundRecord {
    pub fn new(bets: Bets, player_hand: Hand, dealer_hand: Hand) -> Self {
        RoundRecord {
            bets,
            play: 0,
            player_hand,
            dealer_hand,
            dealer_qualifies: dealer_qualifies(&dealer_hand),
            decision: None,
            outcome: None,
            pair_plus_payout: 0,
        }
    }

    /// 按玩家的选择结算本局，返回结算结果
    pub fn resolve(&mut self, decision: Decision) -> Outcome {
        let outcome = match decision {
            Decision::Fold => {
                // 弃牌：底注和对子加注全部输掉
                self.play = 0;
                self.pair_plus_payout = 0;
                Outcome::DealerWins
            }
            Decision::Play => {
                self.play = self.bets.ante;
                // Pair Plus 只看玩家手牌，和庄家是否够资格无关
                self.pair_plus_payout = pair_plus_payout(&self.player_hand, self.bets.pair_plus);
                if self.dealer_qualifies {
                    Outcome::from_comparison(&self.player_hand, &self.dealer_hand)
                } else {
                    Outcome::Push
                }
            }
        };
        self.decision = Some(decision);
        self.outcome = Some(outcome);
        outcome
    }

    /// 本局输赢。未结算时为 0。
    pub fn round_delta(&self) -> i64 {
        let Some(outcome) = self.outcome else { return 0 };
        let stake = i64::from(self.bets.ante) + i64::from(self.play);
        let main = match outcome {
            Outcome::PlayerWins => stake,
            Outcome::DealerWins => -stake,
            Outcome::Push => 0,
        };
        main + i64::from(self.pair_plus_payout) - i64::from(self.bets.pair_plus)
    }

    pub fn to_result(&self, total_winnings: i64) -> Option<RoundResult> {
        Some(RoundResult {
            outcome: self.outcome?,
            folded: self.decision == Some(Decision::Fold),
            dealer_qualifies: self.dealer_qualifies,
            pair_plus_payout: self.pair_plus_payout,
            bets: self.bets,
            play: self.play,
            player_hand: self.player_hand,
            dealer_hand: self.dealer_hand,
            round_delta: self.round_delta(),
            total_winnings,
        })
    }
}

impl Outcome {
    /// 由玩家与庄家手牌的比较得出结果
    pub fn from_comparison(player: &Hand, dealer: &Hand) -> Outcome {
        match compare(dealer, player) {
            std::cmp::Ordering::Greater => Outcome::DealerWins,
            std::cmp::Ordering::Less => Outcome::PlayerWins,
            std::cmp::Ordering::Equal => Outcome::Push,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Outcome::PlayerWins => "玩家获胜",
            Outcome::DealerWins => "庄家获胜",
            Outcome::Push => "平局",
        })
    }
}
