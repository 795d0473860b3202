use crate::card::{Card, Hand, Rank, Suit};
use crate::error::DeckError;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;

/// 一副 52 张的牌，每局新建一副，发完即丢弃
#[derive(Debug, Clone)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    /// 按固定顺序创建一副完整的牌：花色 1..=4，每个花色点数 2..=14
    pub fn new() -> Deck {
        let mut cards = VecDeque::with_capacity(52);
        for &suit in &Suit::ALL {
            for &rank in &Rank::ALL {
                cards.push_back(Card { rank, suit });
            }
        }
        Deck { cards }
    }

    /// 新建并洗好的一副牌，每局开始时使用
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Deck {
        let mut deck = Deck::new();
        deck.shuffle(rng);
        deck
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.make_contiguous().shuffle(rng);
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// 从牌顶发一张牌
    pub fn deal_card(&mut self) -> Result<Card, DeckError> {
        self.cards.pop_front().ok_or(DeckError::Empty { remaining: 0, needed: 1 })
    }

    /// 发一手三张牌。牌不够时不发任何牌。
    pub fn deal_hand(&mut self) -> Result<Hand, DeckError> {
        if self.cards.len() < 3 {
            return Err(DeckError::Empty { remaining: self.cards.len(), needed: 3 });
        }
        let cards = [self.deal_card()?, self.deal_card()?, self.deal_card()?];
        Ok(Hand::new(cards)?)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Deck::new()
    }
}
