use crate::{BlackjackGameError, Card};
use std::collections::BTreeSet;
use std::fmt::Display;

/// A hand of blackjack owned by a `(seat, split_index)` identity.
///
/// Only visible cards take part in scoring. A hand may additionally hold one hidden card
/// (the dealer's hole card) which stays out of every score until `reveal` is called.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    seat: u32,
    split_index: u32,
    cards: Vec<Card>,
    hidden: Option<Card>,
    bet: f32,
    payout: Option<f32>,
}

impl Hand {
    /// Associated function to create a new empty hand with `bet` staked on it.
    pub fn new(seat: u32, split_index: u32, bet: f32) -> Self {
        Hand {
            seat,
            split_index,
            cards: Vec::new(),
            hidden: None,
            bet,
            payout: None,
        }
    }

    pub fn seat(&self) -> u32 {
        self.seat
    }

    pub fn split_index(&self) -> u32 {
        self.split_index
    }

    pub fn bet(&self) -> f32 {
        self.bet
    }

    /// The visible cards, in the order they were received.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Number of visible cards.
    pub fn num_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn has_hidden(&self) -> bool {
        self.hidden.is_some()
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Deals `card` face down. A hand holds at most one hidden card.
    pub fn add_hidden(&mut self, card: Card) -> Result<(), BlackjackGameError> {
        if self.hidden.is_some() {
            return Err(BlackjackGameError::state(format!(
                "seat {}/{} already holds a hidden card",
                self.seat, self.split_index
            )));
        }
        self.hidden = Some(card);
        Ok(())
    }

    /// Turns the hidden card face up, returning it. The revealed card keeps its place as the
    /// first card dealt to the hand.
    pub fn reveal(&mut self) -> Option<Card> {
        let card = self.hidden.take()?;
        self.cards.insert(0, card);
        Some(card)
    }

    /// Sorted, duplicate free set of every total reachable by picking one value per visible
    /// card. Empty for an empty hand.
    pub fn scores(&self) -> Vec<u16> {
        score_set(&self.cards)
    }

    /// The highest total not above 21, or the lowest total when every total busts.
    /// An empty hand scores 0.
    pub fn best_score(&self) -> u16 {
        best_of(&self.scores())
    }

    pub fn is_bust(&self) -> bool {
        self.best_score() > 21
    }

    /// Best score with a bust reported as 0. This is what decides payouts and whether a hand
    /// is still live.
    pub fn standing_score(&self) -> u16 {
        match self.best_score() {
            s if s > 21 => 0,
            s => s,
        }
    }

    /// True while an ace can still be counted either way without busting.
    pub fn is_soft(&self) -> bool {
        self.scores().iter().filter(|s| **s <= 21).count() > 1
    }

    pub fn is_hard(&self) -> bool {
        !self.is_soft()
    }

    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.best_score() == 21
    }

    /// Whether this hand would be a blackjack once its hidden card is revealed. This is the
    /// dealer's peek, it does not expose the card itself.
    pub fn peek_blackjack(&self) -> bool {
        match self.hidden {
            Some(hole) => {
                let mut cards = self.cards.clone();
                cards.push(hole);
                cards.len() == 2 && best_of(&score_set(&cards)) == 21
            }
            None => self.is_blackjack(),
        }
    }

    /// Fails with `InvalidState` until the hand has been resolved.
    pub fn payout(&self) -> Result<f32, BlackjackGameError> {
        self.payout.ok_or_else(|| {
            BlackjackGameError::state(format!(
                "payout for seat {}/{} read before the hand was resolved",
                self.seat, self.split_index
            ))
        })
    }

    pub fn set_payout(&mut self, payout: f32) {
        self.payout = Some(payout);
    }

    pub fn can_split(&self) -> bool {
        self.cards.len() == 2 && self.cards[0] == self.cards[1] && self.payout.is_none()
    }

    /// Moves the second card into a new hand with the same seat and bet, identified by
    /// `split_index`.
    pub fn split(&mut self, split_index: u32) -> Result<Hand, BlackjackGameError> {
        if !self.can_split() {
            return Err(BlackjackGameError::invalid_move(format!(
                "seat {}/{} cannot split {}",
                self.seat,
                self.split_index,
                self.cards_label()
            )));
        }
        let mut new_hand = Hand::new(self.seat, split_index, self.bet);
        if let Some(card) = self.cards.pop() {
            new_hand.add_card(card);
        }
        Ok(new_hand)
    }

    fn cards_label(&self) -> String {
        let mut label = self
            .cards
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>();
        if self.hidden.is_some() {
            label.insert(0, "??".to_string());
        }
        format!("[{}]", label.join(" "))
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "seat {}/{} {} ({}) bet {:.2}",
            self.seat,
            self.split_index,
            self.cards_label(),
            self.best_score(),
            self.bet
        )?;
        if let Some(payout) = self.payout {
            write!(f, " payout {:.2}", payout)?;
        }
        Ok(())
    }
}

fn score_set(cards: &[Card]) -> Vec<u16> {
    if cards.is_empty() {
        return vec![];
    }
    let mut sums = BTreeSet::from([0u16]);
    for card in cards {
        sums = sums
            .iter()
            .flat_map(|sum| card.values().iter().map(move |v| sum + *v as u16))
            .collect();
    }
    sums.into_iter().collect()
}

fn best_of(scores: &[u16]) -> u16 {
    scores
        .iter()
        .rev()
        .find(|s| **s <= 21)
        .or_else(|| scores.first())
        .copied()
        .unwrap_or(0)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Rank, Suit};
    use proptest::prelude::*;

    fn hand_of(cards: &[&str]) -> Hand {
        let mut hand = Hand::new(1, 0, 10.0);
        for c in cards {
            hand.add_card(c.parse().unwrap());
        }
        hand
    }

    #[test]
    fn empty_hand() {
        let hand = Hand::new(1, 0, 1.0);
        assert!(hand.scores().is_empty());
        assert_eq!(hand.best_score(), 0);
        assert_eq!(hand.standing_score(), 0);
        assert!(!hand.is_bust());
        assert!(!hand.is_blackjack());
    }

    #[test]
    fn aces_are_deduplicated() {
        let hand = hand_of(&["AS", "AH", "AD"]);
        assert_eq!(hand.scores(), vec![3, 13, 23, 33]);
        assert_eq!(hand.best_score(), 13);
        assert!(hand.is_hard());

        let hand = hand_of(&["AS", "6H"]);
        assert_eq!(hand.scores(), vec![7, 17]);
        assert!(hand.is_soft());
        assert_eq!(hand.best_score(), 17);
    }

    #[test]
    fn bust_reports_minimum() {
        let hand = hand_of(&["KS", "QH", "5D"]);
        assert_eq!(hand.best_score(), 25);
        assert!(hand.is_bust());
        assert_eq!(hand.standing_score(), 0);

        let hand = hand_of(&["AS", "KH", "QD", "5C"]);
        assert_eq!(hand.scores(), vec![26, 36]);
        assert_eq!(hand.best_score(), 26);
    }

    #[test]
    fn blackjack_needs_exactly_two_cards() {
        assert!(hand_of(&["AS", "KH"]).is_blackjack());
        assert!(hand_of(&["10S", "AH"]).is_blackjack());
        assert!(!hand_of(&["7S", "7H", "7D"]).is_blackjack());
        assert!(!hand_of(&["AS", "9H"]).is_blackjack());
    }

    #[test]
    fn hidden_card_stays_out_of_scores() {
        let mut hand = Hand::new(0, 0, 0.0);
        hand.add_hidden("AS".parse().unwrap()).unwrap();
        hand.add_card("KD".parse().unwrap());
        assert_eq!(hand.num_cards(), 1);
        assert_eq!(hand.best_score(), 10);
        assert!(!hand.is_blackjack());
        assert!(hand.peek_blackjack());
        assert!(hand.add_hidden("2C".parse().unwrap()).is_err());

        let card = hand.reveal();
        assert_eq!(card, Some(Card::new(Rank::Ace, Suit::Spades)));
        assert_eq!(hand.cards()[0], Card::new(Rank::Ace, Suit::Spades));
        assert!(hand.is_blackjack());
        assert!(!hand.has_hidden());
        assert_eq!(hand.reveal(), None);
    }

    #[test]
    fn payout_unset_until_resolved() {
        let mut hand = hand_of(&["9S", "9H"]);
        assert!(matches!(
            hand.payout(),
            Err(BlackjackGameError::InvalidState(_))
        ));
        hand.set_payout(-10.0);
        assert_eq!(hand.payout(), Ok(-10.0));
    }

    #[test]
    fn split_requires_equal_cards() {
        let mut pair = hand_of(&["8C", "8C"]);
        let second = pair.split(1).unwrap();
        assert_eq!(pair.num_cards(), 1);
        assert_eq!(second.num_cards(), 1);
        assert_eq!(second.seat(), 1);
        assert_eq!(second.split_index(), 1);
        assert_eq!(second.bet(), 10.0);

        let mut mixed = hand_of(&["8C", "8H"]);
        assert!(matches!(
            mixed.split(1),
            Err(BlackjackGameError::InvalidMove(_))
        ));
    }

    #[test]
    fn display() {
        let mut hand = hand_of(&["KS", "7H"]);
        assert_eq!(
            hand.to_string(),
            "seat 1/0 [K\u{2660} 7\u{2665}] (17) bet 10.00"
        );
        hand.set_payout(10.0);
        assert!(hand.to_string().ends_with("payout 10.00"));
    }

    fn any_card() -> impl Strategy<Value = Card> {
        (0..13usize, 0..4usize).prop_map(|(r, s)| Card::new(Rank::ALL[r], Suit::ALL[s]))
    }

    proptest! {
        #[test]
        fn scores_are_sorted_and_distinct(cards in prop::collection::vec(any_card(), 0..10)) {
            let mut hand = Hand::new(1, 0, 1.0);
            for card in cards {
                hand.add_card(card);
            }
            let scores = hand.scores();
            prop_assert!(scores.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn best_score_rule(cards in prop::collection::vec(any_card(), 1..10)) {
            let mut hand = Hand::new(1, 0, 1.0);
            for card in cards {
                hand.add_card(card);
            }
            let scores = hand.scores();
            let best = hand.best_score();
            prop_assert!(best > 0);
            match scores.iter().filter(|s| **s <= 21).max() {
                Some(max) => prop_assert_eq!(best, *max),
                None => prop_assert_eq!(best, scores[0]),
            }
            prop_assert_eq!(hand.is_blackjack(), hand.num_cards() == 2 && best == 21);
        }
    }
}
