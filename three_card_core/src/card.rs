use crate::error::CardError;
use serde::{Deserialize, Serialize};
use std::fmt;

// --- 核心数据结构定义 ---

/// 花色 (Suit)
/// 数值即线上格式：1=梅花 2=方块 3=红心 4=黑桃
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Suit {
    Club = 1,    // 梅花 ♣️
    Diamond = 2, // 方块 ♦️
    Heart = 3,   // 红心 ♥️
    Spade = 4,   // 黑桃 ♠️
}

/// 点数 (Rank)
/// 数值为 2..=14，J/Q/K/A 分别是 11..=14。
/// 三张牌扑克里 A 只当最大，不参与 A-2-3 顺子。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

/// 单张扑克牌 (Card)
///
/// 两张牌相等当且仅当点数和花色都相同；牌力比较只看点数，见 `eval` 模块。
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

/// 一手三张牌 (Hand)
///
/// 创建后不可变。三张牌必须互不相同。
/// 存储顺序就是发牌顺序，评估时只对副本排序。
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "[Card; 3]", into = "[Card; 3]")]
pub struct Hand([Card; 3]);

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven,
        Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
    ];

    /// 点数的整数值 (2..=14)
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }
}

impl Hand {
    pub fn new(cards: [Card; 3]) -> Result<Hand, CardError> {
        let [a, b, c] = cards;
        if a == b || b == c || a == c {
            return Err(CardError::DuplicateCard);
        }
        Ok(Hand(cards))
    }

    /// 按发牌顺序返回三张牌
    pub fn cards(&self) -> &[Card; 3] {
        &self.0
    }

    /// 按点数从小到大排序后的副本，原手牌不变
    pub fn sorted(&self) -> [Card; 3] {
        let mut cards = self.0;
        cards.sort_by_key(|c| c.rank);
        cards
    }

    /// 最大的点数
    pub fn high_rank(&self) -> Rank {
        self.sorted()[2].rank
    }
}

// --- 线上格式转换 ---

impl TryFrom<u8> for Suit {
    type Error = CardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Suit::ALL
            .into_iter()
            .find(|s| *s as u8 == value)
            .ok_or(CardError::InvalidSuit(value))
    }
}

impl From<Suit> for u8 {
    fn from(suit: Suit) -> u8 {
        suit as u8
    }
}

impl TryFrom<u8> for Rank {
    type Error = CardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::ALL
            .into_iter()
            .find(|r| r.value() == value)
            .ok_or(CardError::InvalidRank(value))
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> u8 {
        rank.value()
    }
}

impl TryFrom<[Card; 3]> for Hand {
    type Error = CardError;

    fn try_from(cards: [Card; 3]) -> Result<Self, Self::Error> {
        Hand::new(cards)
    }
}

impl From<Hand> for [Card; 3] {
    fn from(hand: Hand) -> [Card; 3] {
        hand.0
    }
}

// --- 实现辅助功能 ---

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Suit::Club => "♣️",
            Suit::Diamond => "♦️",
            Suit::Heart => "♥️",
            Suit::Spade => "♠️",
        })
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rank::Jack => write!(f, "J"),
            Rank::Queen => write!(f, "Q"),
            Rank::King => write!(f, "K"),
            Rank::Ace => write!(f, "A"),
            other => write!(f, "{}", other.value()),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c] = &self.0;
        write!(f, "{} {} {}", a, b, c)
    }
}
