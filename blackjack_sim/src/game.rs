//! Module that focuses on simulating rounds of blackjack. A `Game` owns the shoe, the house
//! rules and the players, and runs every round through the same five phases.

pub mod dealer;
pub mod player;
pub mod rules;
pub mod strategy;
pub mod prelude {
    pub use super::{Game, Phase};
    pub use crate::game::dealer::{Dealer, DEALER_SEAT};
    pub use crate::game::player::Player;
    pub use crate::game::rules::{Move, RuleSet, StandardRules};
    pub use crate::game::strategy;
    pub use blackjack_lib::{BlackjackGameError, Card, Hand, Shoe};
}

pub use prelude::*;
use crate::write::{RecordWriter, RoundRecord};
use crate::{GameConfig, PlayerSummary, SimulationError};
use std::fmt::Display;
use strategy::Strategy;

/// The phases of a round, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Deal,
    Play,
    Resolve,
    Observe,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::Deal => "deal",
            Phase::Play => "play",
            Phase::Resolve => "resolve",
            Phase::Observe => "observe",
        };
        write!(f, "{}", name)
    }
}

/// Struct that runs rounds of blackjack for a set of players against one house rule set.
///
/// Each round is atomic: setup, deal, play, resolve and observe run to completion in that
/// order, and no player sees a payout before every hand of the round has one.
pub struct Game {
    shoe: Shoe,
    rules: Box<dyn RuleSet>,
    players: Vec<Player>,
    dealer: Dealer,
    hands: Vec<Hand>,
    round: usize,
}

impl Game {
    /// Associated method for building a new game, the shoe is built from `config`.
    pub fn new(rules: Box<dyn RuleSet>, config: GameConfig) -> Result<Game, SimulationError> {
        let shoe = match config.seed {
            Some(seed) => Shoe::with_seed(config.num_decks, config.depth_threshold, seed)?,
            None => Shoe::new(config.num_decks, config.depth_threshold)?,
        };
        Ok(Game {
            shoe,
            rules,
            players: vec![],
            dealer: Dealer::new(),
            hands: vec![],
            round: 0,
        })
    }

    /// Seats a new player. Players are kept in seat order, seat 0 belongs to the dealer.
    pub fn add_player(
        &mut self,
        seat: u32,
        strategy: Box<dyn Strategy>,
    ) -> Result<(), SimulationError> {
        if seat == DEALER_SEAT {
            return Err(BlackjackGameError::config("seat 0 is reserved for the dealer").into());
        }
        match self.players.binary_search_by_key(&seat, |p| p.seat()) {
            Ok(_) => {
                Err(BlackjackGameError::config(format!("seat {} is already taken", seat)).into())
            }
            Err(pos) => {
                self.players.insert(pos, Player::new(seat, strategy));
                Ok(())
            }
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn dealer(&self) -> &Dealer {
        &self.dealer
    }

    /// Player hands of the current (or last) round, in seat order.
    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    /// Number of rounds played so far.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Net payout of every player in the last round, in seat order.
    pub fn last_payouts(&self) -> Vec<f32> {
        self.players.iter().map(|p| p.last_round()).collect()
    }

    /// Static description of the table: rules, number of decks and depth threshold.
    pub fn descriptor(&self) -> String {
        format!(
            "{}, {} decks, reshuffle at {:.2}",
            self.rules.name(),
            self.shoe.num_decks(),
            self.shoe.depth_threshold()
        )
    }

    pub fn summaries(&self) -> Vec<PlayerSummary> {
        self.players.iter().map(|p| p.summary()).collect()
    }

    /// Runs `num_rounds` rounds, writing one record per round to `out` if given, and returns
    /// every player's final profit per dollar in seat order.
    pub fn play(
        &mut self,
        num_rounds: usize,
        mut out: Option<&mut RecordWriter<'_>>,
    ) -> Result<Vec<f32>, SimulationError> {
        log::info!("playing {} rounds, {}", num_rounds, self.descriptor());
        for _ in 0..num_rounds {
            let record = self.play_round()?;
            if let Some(writer) = out.as_mut() {
                writer.write(&record)?;
            }
        }
        log::info!(
            "finished after {} rounds and {} reshuffles",
            self.round,
            self.shoe.num_reshuffles()
        );
        self.players
            .iter()
            .map(|p| {
                p.profit_per_dollar().map_err(|e| {
                    SimulationError::round(self.round, Phase::Observe, Some(p.seat()), e)
                })
            })
            .collect()
    }

    /// Plays one full round and returns its record.
    pub fn play_round(&mut self) -> Result<RoundRecord, SimulationError> {
        let round = self.round;
        self.setup(round)?;
        self.deal(round)?;
        self.play_hands(round)?;
        self.resolve(round);
        self.observe(round)?;
        self.round += 1;
        Ok(self.record(round))
    }

    fn setup(&mut self, round: usize) -> Result<(), SimulationError> {
        log::debug!("round {}: {}", round, Phase::Setup);
        self.shoe.check_reshuffle();
        self.hands.clear();
        self.dealer = Dealer::new();
        for player in self.players.iter_mut() {
            player.clear_hands();
            let bet = player
                .make_bet(self.shoe.num_dealt())
                .map_err(|e| SimulationError::round(round, Phase::Setup, Some(player.seat()), e))?;
            self.hands.push(Hand::new(player.seat(), 0, bet));
            player.add_hand(self.hands.len() - 1);
        }
        Ok(())
    }

    fn deal(&mut self, round: usize) -> Result<(), SimulationError> {
        log::debug!("round {}: {}", round, Phase::Deal);
        for pass in 0..2 {
            for hand in self.hands.iter_mut() {
                hand.add_card(self.shoe.deal_one());
            }
            self.dealer
                .add_card(self.shoe.deal_one(), pass == 0)
                .map_err(|e| SimulationError::round(round, Phase::Deal, None, e))?;
        }
        Ok(())
    }

    fn play_hands(&mut self, round: usize) -> Result<(), SimulationError> {
        if self.dealer.has_blackjack() {
            self.dealer.reveal();
            log::debug!("round {}: dealer blackjack, no play", round);
            return Ok(());
        }
        log::debug!("round {}: {}", round, Phase::Play);
        for player in self.players.iter_mut() {
            player
                .play_through(
                    &mut self.hands,
                    self.dealer.hand(),
                    &mut self.shoe,
                    self.rules.as_ref(),
                )
                .map_err(|e| SimulationError::round(round, Phase::Play, Some(player.seat()), e))?;
        }
        if self.hands.iter().any(|hand| hand.standing_score() > 0) {
            self.dealer
                .play_through(self.rules.as_ref(), &mut self.shoe)
                .map_err(|e| SimulationError::round(round, Phase::Play, None, e))?;
        }
        Ok(())
    }

    fn resolve(&mut self, round: usize) {
        log::debug!("round {}: {}", round, Phase::Resolve);
        let dealer = self.dealer.hand();
        for hand in self.hands.iter_mut() {
            let payout = self.rules.calculate_payout(hand, dealer);
            hand.set_payout(payout);
            log::trace!("{} against {}", hand, dealer);
        }
    }

    fn observe(&mut self, round: usize) -> Result<(), SimulationError> {
        log::debug!("round {}: {}", round, Phase::Observe);
        let num_dealt = self.shoe.num_dealt();
        for player in self.players.iter_mut() {
            let payout = player
                .observe(&self.hands, self.dealer.hand(), num_dealt)
                .map_err(|e| {
                    SimulationError::round(round, Phase::Observe, Some(player.seat()), e)
                })?;
            log::trace!("seat {} net {} this round", player.seat(), payout);
        }
        Ok(())
    }

    fn record(&self, round: usize) -> RoundRecord {
        RoundRecord {
            round,
            ruleset: self.rules.name(),
            num_decks: self.shoe.num_decks(),
            depth_threshold: self.shoe.depth_threshold(),
            fraction_dealt: self.shoe.fraction_dealt(),
            seats: self.players.iter().map(|p| p.seat()).collect(),
            payouts: self.last_payouts(),
            balances: self.players.iter().map(|p| p.balance()).collect(),
            profit_per_dollar: self
                .players
                .iter()
                .map(|p| p.profit_per_dollar().ok())
                .collect(),
        }
    }
}
