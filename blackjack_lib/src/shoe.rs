use crate::{BlackjackGameError, Card, Rank, Suit};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt::Display;

/// Any number of decks shuffled together. Cards are dealt off the top, and once
/// `depth_threshold` of the shoe has been dealt the next check rebuilds and reshuffles it.
pub struct Shoe {
    cards: Vec<Card>,
    num_decks: usize,
    depth_threshold: f64,
    num_reshuffles: usize,
    rng: ChaCha8Rng,
}

impl Shoe {
    /// Associated function to create a shuffled shoe seeded from entropy.
    pub fn new(num_decks: usize, depth_threshold: f64) -> Result<Self, BlackjackGameError> {
        Shoe::build(num_decks, depth_threshold, ChaCha8Rng::from_entropy())
    }

    /// Same as `Shoe::new` but every shuffle is reproducible from `seed`.
    pub fn with_seed(
        num_decks: usize,
        depth_threshold: f64,
        seed: u64,
    ) -> Result<Self, BlackjackGameError> {
        Shoe::build(num_decks, depth_threshold, ChaCha8Rng::seed_from_u64(seed))
    }

    fn build(
        num_decks: usize,
        depth_threshold: f64,
        rng: ChaCha8Rng,
    ) -> Result<Self, BlackjackGameError> {
        if num_decks == 0 {
            return Err(BlackjackGameError::config(
                "a shoe needs at least one deck",
            ));
        }
        if !(0.0..=1.0).contains(&depth_threshold) {
            return Err(BlackjackGameError::config(format!(
                "depth threshold must be within [0, 1], got {}",
                depth_threshold
            )));
        }
        let mut shoe = Shoe {
            cards: Vec::with_capacity(num_decks * 52),
            num_decks,
            depth_threshold,
            num_reshuffles: 0,
            rng,
        };
        shoe.shuffle();
        Ok(shoe)
    }

    pub fn max_cards(&self) -> usize {
        self.num_decks * 52
    }

    /// Number of cards left in the shoe.
    pub fn num_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn num_dealt(&self) -> usize {
        self.max_cards() - self.cards.len()
    }

    pub fn num_decks(&self) -> usize {
        self.num_decks
    }

    pub fn depth_threshold(&self) -> f64 {
        self.depth_threshold
    }

    /// Reshuffles performed since construction, the initial shuffle excluded.
    pub fn num_reshuffles(&self) -> usize {
        self.num_reshuffles
    }

    pub fn fraction_dealt(&self) -> f64 {
        self.num_dealt() as f64 / self.max_cards() as f64
    }

    /// Rebuilds and reshuffles the whole shoe if the dealt fraction has reached the depth
    /// threshold. Meant to be called between rounds. Returns true if it reshuffled.
    pub fn check_reshuffle(&mut self) -> bool {
        if self.fraction_dealt() >= self.depth_threshold {
            log::debug!(
                "reshuffling after {} of {} cards dealt",
                self.num_dealt(),
                self.max_cards()
            );
            self.shuffle();
            self.num_reshuffles += 1;
            return true;
        }
        false
    }

    /// Deals the top card. An empty shoe has dealt its whole fraction, which no threshold
    /// exceeds, so it gets reshuffled before the card is taken.
    pub fn deal_one(&mut self) -> Card {
        if self.cards.is_empty() {
            self.check_reshuffle();
        }
        match self.cards.pop() {
            Some(card) => card,
            // thresholds are at most 1 and `shuffle` leaves num_decks * 52 > 0 cards behind
            None => unreachable!("shoe is empty right after a reshuffle"),
        }
    }

    /// Creates `num_decks` fresh decks and shuffles them together.
    fn shuffle(&mut self) {
        self.cards.clear();
        for _ in 0..self.num_decks {
            for rank in Rank::ALL {
                for suit in Suit::ALL {
                    self.cards.push(Card::new(rank, suit));
                }
            }
        }
        self.cards.shuffle(&mut self.rng);
    }
}

impl Display for Shoe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "decks={}, reshuffle at {:.2}. {}/{}",
            self.num_decks,
            self.depth_threshold,
            self.num_cards(),
            self.max_cards()
        )
    }
}
