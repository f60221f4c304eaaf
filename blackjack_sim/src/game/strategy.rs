use crate::game::rules::Move;
use blackjack_lib::{BlackjackGameError, Card, Hand};
use std::collections::{HashMap, VecDeque};
use std::fmt::Display;

pub mod prelude {
    pub use super::{BasicHitStand, CardHistory, HiLoCounter, MimicDealer, Strategy, TableState};
    pub use crate::game::rules::Move;
}

/// Read only view of a round handed to a `Strategy` whenever it has to decide something.
/// The dealer's hand only exposes its face up cards.
#[derive(Clone, Copy)]
pub struct TableState<'a> {
    dealer: &'a Hand,
    hands: &'a [Hand],
    num_dealt: usize,
}

impl<'a> TableState<'a> {
    pub fn new(dealer: &'a Hand, hands: &'a [Hand], num_dealt: usize) -> TableState<'a> {
        TableState {
            dealer,
            hands,
            num_dealt,
        }
    }

    pub fn dealer(&self) -> &'a Hand {
        self.dealer
    }

    /// Every player hand of the round, in seat order.
    pub fn hands(&self) -> &'a [Hand] {
        self.hands
    }

    /// Cards dealt from the shoe since its last reshuffle.
    pub fn num_dealt(&self) -> usize {
        self.num_dealt
    }

    /// The round's hands list, dealer first.
    pub fn all_hands(&self) -> impl Iterator<Item = &'a Hand> {
        std::iter::once(self.dealer).chain(self.hands.iter())
    }

    /// Every face up card on the table.
    pub fn visible_cards(&self) -> impl Iterator<Item = &'a Card> {
        self.all_hands().flat_map(|hand| hand.cards().iter())
    }

    /// Score of the dealer's single face up card, an ace counting as 11. Fails if the dealer
    /// does not show exactly one card.
    pub fn dealer_upcard(&self) -> Result<u16, BlackjackGameError> {
        let visible = self.dealer.num_cards();
        if visible != 1 {
            return Err(BlackjackGameError::state(format!(
                "dealer hand has {} visible cards but should show exactly one at this point",
                visible
            )));
        }
        let upcard = self.dealer.best_score();
        if !(2..=11).contains(&upcard) {
            return Err(BlackjackGameError::state(format!(
                "dealer hand has a score of {} but should have a value between 2 and 11",
                upcard
            )));
        }
        Ok(upcard)
    }
}

/// Player side policy. Each player owns one.
pub trait Strategy {
    /// Short description used in summaries.
    fn label(&self) -> String;

    /// Stake for the next round, must not be negative.
    fn advise_bet(&self) -> f32;

    fn advise_play(
        &self,
        hand: &Hand,
        table: &TableState<'_>,
    ) -> Result<Move, BlackjackGameError>;

    /// Called before every bet with the shoe's dealt count, so the strategy can notice a
    /// reshuffle and drop what it remembers.
    fn check_reshuffle(&mut self, num_dealt: usize);

    /// Called once a round is resolved with the whole table.
    fn observe(&mut self, table: &TableState<'_>);
}

/// Cards a strategy has seen since the last reshuffle.
///
/// The number of cards observed is tracked separately from the retained cards, so a bounded
/// history still detects a reshuffle: once more cards have been observed than the shoe
/// reports as dealt, the shoe must have been rebuilt.
#[derive(Debug, Clone, Default)]
pub struct CardHistory {
    cards: VecDeque<Card>,
    capacity: Option<usize>,
    observed: usize,
}

impl CardHistory {
    pub fn new() -> CardHistory {
        CardHistory::default()
    }

    /// History that only keeps the `capacity` most recent cards.
    pub fn bounded(capacity: usize) -> CardHistory {
        CardHistory {
            cards: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
            observed: 0,
        }
    }

    /// Clears the history if the shoe has been reshuffled. Returns true if it did.
    pub fn check_reshuffle(&mut self, num_dealt: usize) -> bool {
        if self.observed > num_dealt {
            log::debug!(
                "history of {} cards dropped, shoe reports {} dealt",
                self.observed,
                num_dealt
            );
            self.clear();
            return true;
        }
        false
    }

    pub fn observe(&mut self, table: &TableState<'_>) {
        for card in table.visible_cards() {
            self.push(*card);
        }
    }

    pub fn push(&mut self, card: Card) {
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                self.observed += 1;
                return;
            }
            if self.cards.len() == capacity {
                self.cards.pop_front();
            }
        }
        self.cards.push_back(card);
        self.observed += 1;
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.observed = 0;
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards observed since the last reset, including those no longer retained.
    pub fn num_observed(&self) -> usize {
        self.observed
    }
}

/// Plays exactly like a dealer standing on 17 and always bets the same amount.
#[derive(Debug, Clone)]
pub struct MimicDealer {
    bet: f32,
    history: CardHistory,
}

impl MimicDealer {
    pub fn new(bet: f32) -> MimicDealer {
        MimicDealer {
            bet,
            history: CardHistory::new(),
        }
    }

    pub fn history(&self) -> &CardHistory {
        &self.history
    }
}

impl Default for MimicDealer {
    fn default() -> Self {
        MimicDealer::new(1.0)
    }
}

impl Strategy for MimicDealer {
    fn label(&self) -> String {
        "mimic the dealer".to_string()
    }

    fn advise_bet(&self) -> f32 {
        self.bet
    }

    fn advise_play(
        &self,
        hand: &Hand,
        _table: &TableState<'_>,
    ) -> Result<Move, BlackjackGameError> {
        match hand.best_score() {
            0 => Err(BlackjackGameError::invalid_move(format!(
                "player unable to choose with {}, the strategy does not cover every hand state",
                hand
            ))),
            s if s <= 16 => Ok(Move::Hit),
            _ => Ok(Move::Stay),
        }
    }

    fn check_reshuffle(&mut self, num_dealt: usize) {
        self.history.check_reshuffle(num_dealt);
    }

    fn observe(&mut self, table: &TableState<'_>) {
        self.history.observe(table);
    }
}

/// Hit/stand basic strategy against the dealer's upcard, no doubling or splitting.
///
/// - Always hit hard 11 or less.
/// - Stand on hard 12 against a dealer 4-6, otherwise hit.
/// - Stand on hard 13-16 against a dealer 2-6, otherwise hit.
/// - Always stand on hard 17 or more.
/// - Always hit soft 17 or less.
/// - Stand on soft 18 except hit against a dealer 9, 10, or A.
/// - Always stand on soft 19 or more.
#[derive(Debug, Clone)]
pub struct BasicHitStand {
    bet: f32,
    history: CardHistory,
}

impl BasicHitStand {
    pub fn new(bet: f32) -> BasicHitStand {
        BasicHitStand {
            bet,
            history: CardHistory::new(),
        }
    }

    /// The decision itself, shared with the counting strategies that play basic strategy.
    pub fn decide(hand: &Hand, table: &TableState<'_>) -> Result<Move, BlackjackGameError> {
        let upcard = table.dealer_upcard()?;
        let score = hand.best_score();
        let soft = hand.is_soft();
        let hard = !soft;

        let hit_conditions = [
            hard && score <= 11,
            hard && score == 12 && matches!(upcard, 2 | 3 | 7..=11),
            hard && (13..=16).contains(&score) && (7..=11).contains(&upcard),
            soft && score <= 17,
            soft && score == 18 && (9..=11).contains(&upcard),
        ];
        let stay_conditions = [
            hard && score == 12 && (4..=6).contains(&upcard),
            hard && (13..=16).contains(&score) && (2..=6).contains(&upcard),
            hard && score >= 17,
            soft && score == 18 && (2..=8).contains(&upcard),
            soft && score >= 19,
        ];

        let num_hit = hit_conditions.iter().filter(|c| **c).count();
        let num_stay = stay_conditions.iter().filter(|c| **c).count();
        match (num_hit, num_stay) {
            (1, 0) => Ok(Move::Hit),
            (0, 1) => Ok(Move::Stay),
            _ => Err(BlackjackGameError::invalid_move(format!(
                "exactly one condition must hold, {} hit and {} stay matched {} against {}",
                num_hit, num_stay, hand, upcard
            ))),
        }
    }
}

impl Default for BasicHitStand {
    fn default() -> Self {
        BasicHitStand::new(1.0)
    }
}

impl Strategy for BasicHitStand {
    fn label(&self) -> String {
        "basic hit/stand".to_string()
    }

    fn advise_bet(&self) -> f32 {
        self.bet
    }

    fn advise_play(
        &self,
        hand: &Hand,
        table: &TableState<'_>,
    ) -> Result<Move, BlackjackGameError> {
        BasicHitStand::decide(hand, table)
    }

    fn check_reshuffle(&mut self, num_dealt: usize) {
        self.history.check_reshuffle(num_dealt);
    }

    fn observe(&mut self, table: &TableState<'_>) {
        self.history.observe(table);
    }
}

/// Hi-Lo card counting with margin betting, playing basic strategy.
///
/// When the true count is positive the bet is `min_bet * margin * ceil(true count)`,
/// otherwise `min_bet`.
#[derive(Debug, Clone)]
pub struct HiLoCounter {
    running_count: i32,
    num_decks: usize,
    min_bet: f32,
    margin: f32,
    history: CardHistory,
    lookup_table: HashMap<u8, i32>,
}

impl HiLoCounter {
    pub fn new(num_decks: usize, min_bet: f32, margin: f32) -> HiLoCounter {
        // Initialize lookup table, aces are looked up by their low value
        let mut lookup_table = HashMap::new();
        for i in 2..7 {
            lookup_table.insert(i, 1);
        }
        for i in 7..10 {
            lookup_table.insert(i, 0);
        }
        lookup_table.insert(1, -1);
        lookup_table.insert(10, -1);

        HiLoCounter {
            running_count: 0,
            num_decks,
            min_bet,
            margin,
            // only the number of cards seen feeds the true count
            history: CardHistory::bounded(0),
            lookup_table,
        }
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    /// Running count per estimated deck left in the shoe.
    pub fn true_count(&self) -> f32 {
        let decks_remaining =
            (self.num_decks as f32) - (self.history.num_observed() as f32) / 52.0;
        (self.running_count as f32) / f32::max(decks_remaining, 0.5)
    }

    pub fn history(&self) -> &CardHistory {
        &self.history
    }
}

impl Strategy for HiLoCounter {
    fn label(&self) -> String {
        format!("Hi-Lo, margin {:.1}", self.margin)
    }

    fn advise_bet(&self) -> f32 {
        let true_count = self.true_count();
        if true_count > 0.0 {
            self.min_bet * f32::ceil(true_count) * self.margin
        } else {
            self.min_bet
        }
    }

    fn advise_play(
        &self,
        hand: &Hand,
        table: &TableState<'_>,
    ) -> Result<Move, BlackjackGameError> {
        BasicHitStand::decide(hand, table)
    }

    fn check_reshuffle(&mut self, num_dealt: usize) {
        if self.history.check_reshuffle(num_dealt) {
            self.running_count = 0;
        }
    }

    fn observe(&mut self, table: &TableState<'_>) {
        for card in table.visible_cards() {
            self.running_count += self.lookup_table[&card.low_value()];
        }
        self.history.observe(table);
    }
}

impl Display for HiLoCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = "total cards counted:".len() + 1;
        write!(
            f,
            "{:<width$}{}\n{:<width$}{}\n{:<width$}{:.2}",
            "running count:",
            self.running_count,
            "total cards counted:",
            self.history.num_observed(),
            "true count:",
            self.true_count(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn hand_of(seat: u32, cards: &[&str]) -> Hand {
        let mut hand = Hand::new(seat, 0, 1.0);
        for c in cards {
            hand.add_card(c.parse().unwrap());
        }
        hand
    }

    fn dealer_showing(upcard: &str) -> Hand {
        let mut dealer = Hand::new(0, 0, 0.0);
        dealer.add_hidden("2C".parse().unwrap()).unwrap();
        dealer.add_card(upcard.parse().unwrap());
        dealer
    }

    #[test]
    fn dynamic_strategies() {
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(MimicDealer::default()),
            Box::new(BasicHitStand::default()),
            Box::new(HiLoCounter::new(6, 5.0, 3.0)),
        ];
        assert!(strategies.iter().all(|s| s.advise_bet() > 0.0));
    }

    #[test]
    fn table_state_hides_the_hole_card() {
        let dealer = dealer_showing("9H");
        let hands = vec![hand_of(1, &["KS", "5D"])];
        let table = TableState::new(&dealer, &hands, 5);
        assert_eq!(table.visible_cards().count(), 3);
        assert_eq!(table.all_hands().count(), 2);
        assert_eq!(table.dealer_upcard(), Ok(9));
    }

    #[test]
    fn mimic_hits_to_seventeen() {
        let dealer = dealer_showing("9H");
        let hands: Vec<Hand> = vec![];
        let table = TableState::new(&dealer, &hands, 0);
        let strategy = MimicDealer::default();
        assert_eq!(
            strategy.advise_play(&hand_of(1, &["10S", "6H"]), &table),
            Ok(Move::Hit)
        );
        assert_eq!(
            strategy.advise_play(&hand_of(1, &["10S", "7H"]), &table),
            Ok(Move::Stay)
        );
        assert_eq!(
            strategy.advise_play(&hand_of(1, &["AS", "6H"]), &table),
            Ok(Move::Stay)
        );
        assert_eq!(
            strategy.advise_play(&hand_of(1, &["10S", "6H", "8D"]), &table),
            Ok(Move::Stay)
        );
        assert!(matches!(
            strategy.advise_play(&Hand::new(1, 0, 1.0), &table),
            Err(BlackjackGameError::InvalidMove(_))
        ));
    }

    #[test]
    fn basic_strategy_table() {
        let cases = [
            (&["5S", "6H"][..], "10D", Move::Hit),
            (&["10S", "2H"][..], "5D", Move::Stay),
            (&["10S", "2H"][..], "3D", Move::Hit),
            (&["10S", "3H"][..], "6D", Move::Stay),
            (&["10S", "6H"][..], "7D", Move::Hit),
            (&["10S", "6H"][..], "AD", Move::Hit),
            (&["10S", "7H"][..], "AD", Move::Stay),
            (&["AS", "6H"][..], "2D", Move::Hit),
            (&["AS", "7H"][..], "8D", Move::Stay),
            (&["AS", "7H"][..], "9D", Move::Hit),
            (&["AS", "7H"][..], "AD", Move::Hit),
            (&["AS", "8H"][..], "10D", Move::Stay),
            (&["10S", "5H", "9D"][..], "10D", Move::Stay),
        ];
        let hands: Vec<Hand> = vec![];
        for (cards, upcard, expected) in cases {
            let dealer = dealer_showing(upcard);
            let table = TableState::new(&dealer, &hands, 0);
            let hand = hand_of(1, cards);
            assert_eq!(
                BasicHitStand::decide(&hand, &table),
                Ok(expected),
                "{} against {}",
                hand,
                upcard
            );
        }
    }

    #[test]
    fn basic_strategy_needs_one_upcard() {
        let mut dealer = dealer_showing("9H");
        dealer.reveal();
        let hands: Vec<Hand> = vec![];
        let table = TableState::new(&dealer, &hands, 0);
        assert!(matches!(
            BasicHitStand::default().advise_play(&hand_of(1, &["10S", "6H"]), &table),
            Err(BlackjackGameError::InvalidState(_))
        ));
    }

    #[test]
    fn history_resets_after_reshuffle() {
        let dealer = dealer_showing("9H");
        let hands = vec![hand_of(1, &["KS", "5D"])];
        let table = TableState::new(&dealer, &hands, 4);

        let mut strategy = MimicDealer::default();
        strategy.check_reshuffle(0);
        strategy.observe(&table);
        assert_eq!(strategy.history().num_observed(), 3);

        strategy.check_reshuffle(40);
        assert_eq!(strategy.history().len(), 3);

        // shoe dealt count went back down, the shoe was rebuilt
        strategy.check_reshuffle(2);
        assert!(strategy.history().is_empty());
        assert_eq!(strategy.history().num_observed(), 0);
    }

    #[test]
    fn bounded_history_keeps_counting() {
        let mut history = CardHistory::bounded(2);
        for c in ["2S", "3S", "4S"] {
            history.push(c.parse().unwrap());
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.num_observed(), 3);
        assert_eq!(
            history.cards().map(|c| c.to_string()).collect::<Vec<String>>(),
            vec!["3\u{2660}", "4\u{2660}"]
        );
        assert!(history.check_reshuffle(1));
        assert!(history.is_empty());
    }

    #[test]
    fn hilo_counts_and_bets() {
        let mut dealer = dealer_showing("5H");
        dealer.reveal();
        let hands = vec![hand_of(1, &["3S", "4D"]), hand_of(2, &["6S", "2D"])];
        let table = TableState::new(&dealer, &hands, 6);

        let mut strategy = HiLoCounter::new(1, 5.0, 2.0);
        assert_eq!(strategy.advise_bet(), 5.0);
        strategy.observe(&table);
        assert_eq!(strategy.running_count(), 6);
        assert!(strategy.history().is_empty());
        assert_eq!(strategy.history().num_observed(), 6);
        // 6 / (1 - 6/52)
        assert!(strategy.true_count() > 6.0 && strategy.true_count() < 7.0);
        assert_eq!(strategy.advise_bet(), 5.0 * 7.0 * 2.0);
        assert!(strategy.to_string().starts_with("running count:        6"));

        strategy.check_reshuffle(0);
        assert_eq!(strategy.running_count(), 0);
        assert_eq!(strategy.advise_bet(), 5.0);
    }

    #[test]
    fn hilo_negative_count_bets_minimum() {
        let dealer = dealer_showing("KH");
        let hands = vec![hand_of(1, &["AS", "QD"])];
        let table = TableState::new(&dealer, &hands, 4);
        let mut strategy = HiLoCounter::new(6, 5.0, 3.0);
        strategy.observe(&table);
        assert_eq!(strategy.running_count(), -3);
        assert_eq!(strategy.advise_bet(), 5.0);
    }
}
