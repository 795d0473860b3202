//! 三张牌牌型评估
//!
//! 全部是纯函数，不持有任何共享可变状态，可以在任意多个会话中并发调用。
//! 需要排序时只对手牌的副本排序。

use crate::card::Hand;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// 牌型等级
/// 数值越大牌型越大，可以直接利用 `Ord` 比较。
/// 注意三张牌扑克里顺子比同花大。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandCategory {
    HighCard = 1,      // 高牌
    Pair = 2,          // 对子
    Flush = 3,         // 同花
    Straight = 4,      // 顺子
    ThreeOfAKind = 5,  // 三条
    StraightFlush = 6, // 同花顺
}

/// 庄家资格线：最大牌至少是 Q
pub const DEALER_QUALIFY_RANK: u8 = 12;

impl HandCategory {
    /// Pair Plus 赔率，高牌没有赔付
    pub fn pair_plus_multiplier(self) -> u32 {
        match self {
            HandCategory::HighCard => 0,
            HandCategory::Pair => 1,
            HandCategory::Flush => 3,
            HandCategory::Straight => 6,
            HandCategory::ThreeOfAKind => 30,
            HandCategory::StraightFlush => 40,
        }
    }
}

/// 评估一手牌的牌型
pub fn category(hand: &Hand) -> HandCategory {
    let cards = hand.sorted();
    let [r0, r1, r2] = cards.map(|c| c.rank.value());

    let is_flush = cards.windows(2).all(|w| w[0].suit == w[1].suit);
    // 不允许 A-2-3 这种绕回的顺子
    let is_straight = r1 == r0 + 1 && r2 == r1 + 1;

    if is_straight && is_flush {
        HandCategory::StraightFlush
    } else if r0 == r2 {
        HandCategory::ThreeOfAKind
    } else if is_straight {
        HandCategory::Straight
    } else if is_flush {
        HandCategory::Flush
    } else if r0 == r1 || r1 == r2 {
        // 已排序，对子一定相邻
        HandCategory::Pair
    } else {
        HandCategory::HighCard
    }
}

/// 比较两手牌。`Greater` 表示 `a` 赢，`Less` 表示 `b` 赢。
///
/// 牌型相同时从最大的牌开始逐张比较点数，三张点数都相同则为平局，花色不参与比较。
pub fn compare(a: &Hand, b: &Hand) -> Ordering {
    category(a).cmp(&category(b)).then_with(|| {
        let ra = a.sorted().map(|c| c.rank);
        let rb = b.sorted().map(|c| c.rank);
        (0..3).rev()
            .map(|i| ra[i].cmp(&rb[i]))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

/// 庄家是否达到开牌资格 (Q 高或更好)
pub fn dealer_qualifies(dealer: &Hand) -> bool {
    dealer.high_rank().value() >= DEALER_QUALIFY_RANK
}

/// Pair Plus 派彩金额（不含本金），低于对子为 0
pub fn pair_plus_payout(hand: &Hand, stake: u32) -> u32 {
    stake * category(hand).pair_plus_multiplier()
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            HandCategory::HighCard => "高牌",
            HandCategory::Pair => "对子",
            HandCategory::Flush => "同花",
            HandCategory::Straight => "顺子",
            HandCategory::ThreeOfAKind => "三条",
            HandCategory::StraightFlush => "同花顺",
        })
    }
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Rank, Suit};
    use crate::deck::Deck;
    use Rank::*;
    use Suit::*;

    // 辅助函数，用于快速创建手牌
    fn hand(cards: [(Rank, Suit); 3]) -> Hand {
        Hand::new(cards.map(|(r, s)| Card::new(r, s))).unwrap()
    }

    // --- 牌型测试 ---
    #[test]
    fn test_high_card() {
        assert_eq!(category(&hand([(Two, Club), (Five, Diamond), (Nine, Heart)])), HandCategory::HighCard);
    }

    #[test]
    fn test_pair() {
        assert_eq!(category(&hand([(Ten, Club), (Ten, Diamond), (Five, Heart)])), HandCategory::Pair);
        assert_eq!(category(&hand([(Ten, Club), (Five, Diamond), (Five, Heart)])), HandCategory::Pair);
    }

    #[test]
    fn test_flush() {
        assert_eq!(category(&hand([(Two, Heart), (Six, Heart), (Nine, Heart)])), HandCategory::Flush);
    }

    #[test]
    fn test_straight() {
        assert_eq!(category(&hand([(Four, Club), (Five, Diamond), (Six, Spade)])), HandCategory::Straight);
        // 发牌顺序不影响结果
        assert_eq!(category(&hand([(King, Club), (Ace, Diamond), (Queen, Spade)])), HandCategory::Straight);
    }

    #[test]
    fn test_ace_low_is_not_straight() {
        assert_eq!(category(&hand([(Ace, Club), (Two, Diamond), (Three, Spade)])), HandCategory::HighCard);
        assert_eq!(category(&hand([(King, Club), (Ace, Diamond), (Two, Spade)])), HandCategory::HighCard);
    }

    #[test]
    fn test_three_of_a_kind() {
        assert_eq!(category(&hand([(Seven, Club), (Seven, Diamond), (Seven, Heart)])), HandCategory::ThreeOfAKind);
    }

    #[test]
    fn test_straight_flush() {
        assert_eq!(category(&hand([(Five, Spade), (Six, Spade), (Seven, Spade)])), HandCategory::StraightFlush);
    }

    #[test]
    fn test_every_hand_from_deck_has_one_category() {
        // 遍历所有 22100 种三张组合，同花顺一定同时满足顺子和同花
        let cards: Vec<Card> = {
            let mut deck = Deck::new();
            std::iter::from_fn(|| deck.deal_card().ok()).collect()
        };
        let mut counts = [0usize; 7];
        for i in 0..52 {
            for j in (i + 1)..52 {
                for k in (j + 1)..52 {
                    let h = Hand::new([cards[i], cards[j], cards[k]]).unwrap();
                    let cat = category(&h);
                    counts[cat as usize] += 1;
                    if cat == HandCategory::StraightFlush {
                        let s = h.sorted();
                        assert!(s.iter().all(|c| c.suit == s[0].suit));
                        assert_eq!(s[2].rank.value() - s[0].rank.value(), 2);
                    }
                }
            }
        }
        assert_eq!(counts.iter().sum::<usize>(), 22100);
        // 已知的组合数
        assert_eq!(counts[HandCategory::StraightFlush as usize], 44);
        assert_eq!(counts[HandCategory::ThreeOfAKind as usize], 52);
        assert_eq!(counts[HandCategory::Straight as usize], 660);
        assert_eq!(counts[HandCategory::Flush as usize], 1100);
        assert_eq!(counts[HandCategory::Pair as usize], 3744);
    }

    // --- 比较测试 ---
    #[test]
    fn test_compare_identical_is_tie() {
        let a = hand([(Queen, Diamond), (Nine, Spade), (Five, Club)]);
        assert_eq!(compare(&a, &a), Ordering::Equal);
        // 点数相同、花色不同也是平局
        let b = hand([(Queen, Heart), (Nine, Club), (Five, Spade)]);
        assert_eq!(compare(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_compare_category_first() {
        let pair = hand([(Two, Club), (Two, Diamond), (Three, Heart)]);
        let ace_high = hand([(Ace, Club), (King, Diamond), (Jack, Heart)]);
        assert_eq!(compare(&pair, &ace_high), Ordering::Greater);
        assert_eq!(compare(&ace_high, &pair), Ordering::Less);
    }

    #[test]
    fn test_compare_kickers_from_highest() {
        let a = hand([(King, Club), (Nine, Diamond), (Three, Heart)]);
        let b = hand([(King, Spade), (Eight, Diamond), (Seven, Heart)]);
        assert_eq!(compare(&a, &b), Ordering::Greater);

        let c = hand([(King, Spade), (Nine, Club), (Two, Heart)]);
        assert_eq!(compare(&a, &c), Ordering::Greater);
    }

    // --- 庄家资格 ---
    #[test]
    fn test_dealer_qualifies_boundary() {
        assert!(!dealer_qualifies(&hand([(Jack, Club), (Nine, Diamond), (Three, Heart)])));
        assert!(dealer_qualifies(&hand([(Queen, Club), (Two, Diamond), (Three, Heart)])));
        assert!(dealer_qualifies(&hand([(Ace, Club), (Two, Diamond), (Three, Heart)])));
        // 一对 J 依然不够资格，只看最大牌
        assert!(!dealer_qualifies(&hand([(Jack, Club), (Jack, Diamond), (Three, Heart)])));
    }

    // --- Pair Plus ---
    #[test]
    fn test_pair_plus_payout_table() {
        let high = hand([(Two, Club), (Five, Diamond), (Nine, Heart)]);
        for stake in [0, 5, 25] {
            assert_eq!(pair_plus_payout(&high, stake), 0);
        }
        assert_eq!(pair_plus_payout(&hand([(Ten, Club), (Ten, Diamond), (Five, Heart)]), 10), 10);
        assert_eq!(pair_plus_payout(&hand([(Two, Heart), (Six, Heart), (Nine, Heart)]), 10), 30);
        assert_eq!(pair_plus_payout(&hand([(Four, Club), (Five, Diamond), (Six, Spade)]), 10), 60);
        assert_eq!(pair_plus_payout(&hand([(Seven, Club), (Seven, Diamond), (Seven, Heart)]), 10), 300);
        assert_eq!(pair_plus_payout(&hand([(Five, Spade), (Six, Spade), (Seven, Spade)]), 10), 400);
    }

    // --- 场景测试 ---
    #[test]
    fn test_scenario_pair_beats_queen_high() {
        let dealer = hand([(Queen, Diamond), (Nine, Spade), (Five, Club)]);
        let player = hand([(Jack, Club), (Jack, Spade), (Five, Diamond)]);
        assert!(dealer_qualifies(&dealer));
        assert_eq!(category(&player), HandCategory::Pair);
        assert_eq!(category(&dealer), HandCategory::HighCard);
        assert_eq!(compare(&player, &dealer), Ordering::Greater);
    }

    #[test]
    fn test_scenario_straight_flush_beats_straight() {
        let dealer = hand([(Five, Spade), (Six, Spade), (Seven, Spade)]);
        let player = hand([(Five, Club), (Six, Diamond), (Seven, Heart)]);
        assert_eq!(category(&dealer), HandCategory::StraightFlush);
        assert_eq!(category(&player), HandCategory::Straight);
        assert_eq!(compare(&dealer, &player), Ordering::Greater);
    }
}
