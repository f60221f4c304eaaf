pub mod config;
pub mod game;
pub mod write;

pub use game::prelude::*;
use std::fmt::Display;
use thiserror::Error;

pub mod prelude {
    pub use super::{
        game::strategy::prelude::*, Game, GameConfig, GameConfigBuilder, Phase, PlayerSummary,
        SimulationError,
    };
    pub use crate::write::{RecordFormat, RecordWriter, RoundRecord};
}

/// Errors raised while running a game, with enough context to tell which round, phase and
/// seat failed.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("round {round}, {phase} phase{}: {source}", seat_label(.seat))]
    Round {
        round: usize,
        phase: Phase,
        seat: Option<u32>,
        #[source]
        source: BlackjackGameError,
    },
    #[error("invalid configuration: {0}")]
    Config(#[from] BlackjackGameError),
    #[error("unable to write round record: {0}")]
    Write(#[from] std::io::Error),
}

impl SimulationError {
    pub fn round(
        round: usize,
        phase: Phase,
        seat: Option<u32>,
        source: BlackjackGameError,
    ) -> SimulationError {
        SimulationError::Round {
            round,
            phase,
            seat,
            source,
        }
    }
}

fn seat_label(seat: &Option<u32>) -> String {
    match seat {
        Some(seat) => format!(", seat {}", seat),
        None => String::new(),
    }
}

/// Simple struct for recording the interesting data points a player accumulated over a game
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub seat: u32,
    pub label: String,
    pub wins: u32,
    pub pushes: u32,
    pub losses: u32,
    pub player_blackjacks: u32,
    pub outlay: f32,
    pub winnings: f32,
    pub profit_per_dollar: Option<f32>,
}

impl PlayerSummary {
    pub fn total_hands(&self) -> u32 {
        self.wins + self.pushes + self.losses
    }
}

impl Display for PlayerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of player blackjacks".len() + 20;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        let total_hands = self.total_hands();
        let ratio = |n: u32| {
            if total_hands == 0 {
                f32::NAN
            } else {
                (n as f32) / (total_hands as f32)
            }
        };
        let ppd = match self.profit_per_dollar {
            Some(ppd) => format!("{:.4}", ppd),
            None => "nan".to_string(),
        };
        write!(
            f,
            "{}{} (seat {})\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n",
            "strategy: ",
            self.label,
            self.seat,
            "hands won",
            self.wins,
            "hands pushed",
            self.pushes,
            "hands lost",
            self.losses,
            "number of player blackjacks",
            self.player_blackjacks,
            "total hands played",
            total_hands,
            "win percentage",
            ratio(self.wins),
            "push percentage",
            ratio(self.pushes),
            "loss percentage",
            ratio(self.losses),
            "total outlay",
            self.outlay,
            "winnings",
            self.winnings,
            "profit per dollar",
            ppd
        )
    }
}

/// Struct for configuring the shoe of a single `Game`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub num_decks: usize,
    pub depth_threshold: f64,
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Associated method for returning a new `GameConfigBuilder` object. Unset values fall back
    /// to a six deck shoe reshuffled once three quarters have been dealt, shuffled from entropy.
    pub fn new() -> GameConfigBuilder {
        GameConfigBuilder {
            num_decks: None,
            depth_threshold: None,
            seed: None,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::new().build()
    }
}

/// Struct to implement builder pattern for `GameConfig`
#[derive(Debug, Clone, Copy)]
pub struct GameConfigBuilder {
    num_decks: Option<usize>,
    depth_threshold: Option<f64>,
    seed: Option<u64>,
}

impl GameConfigBuilder {
    /// Method for choosing the number of decks used in the game
    pub fn num_decks(&mut self, decks: usize) -> &mut Self {
        self.num_decks = Some(decks);
        self
    }

    /// Method for setting the fraction of the shoe dealt before it is reshuffled
    pub fn depth_threshold(&mut self, depth: f64) -> &mut Self {
        self.depth_threshold = Some(depth);
        self
    }

    /// Method for fixing the shuffle, two games with the same seed and players play out the same
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(&mut self) -> GameConfig {
        GameConfig {
            num_decks: self.num_decks.unwrap_or(6),
            depth_threshold: self.depth_threshold.unwrap_or(0.75),
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.num_decks, 6);
        assert_eq!(config.depth_threshold, 0.75);
        assert_eq!(config.seed, None);

        let config = GameConfig::new().num_decks(2).seed(4).build();
        assert_eq!(config.num_decks, 2);
        assert_eq!(config.depth_threshold, 0.75);
        assert_eq!(config.seed, Some(4));
    }

    #[test]
    fn errors_name_their_round() {
        let err = SimulationError::round(
            12,
            Phase::Play,
            Some(3),
            BlackjackGameError::invalid_move("no move"),
        );
        let message = err.to_string();
        assert!(message.starts_with("round 12, play phase, seat 3: "), "{}", message);

        let err = SimulationError::round(
            0,
            Phase::Deal,
            None,
            BlackjackGameError::state("hole card"),
        );
        assert!(err.to_string().starts_with("round 0, deal phase: "));

        let err: SimulationError = BlackjackGameError::config("no decks").into();
        assert!(matches!(err, SimulationError::Config(_)));
    }

    #[test]
    fn summary_layout() {
        let summary = PlayerSummary {
            seat: 2,
            label: "mimic the dealer".to_string(),
            wins: 3,
            pushes: 1,
            losses: 4,
            player_blackjacks: 1,
            outlay: 8.0,
            winnings: -0.5,
            profit_per_dollar: Some(-0.0625),
        };
        let text = summary.to_string();
        assert!(text.starts_with("strategy: mimic the dealer (seat 2)\n"));
        assert_eq!(text.lines().count(), 12);
        assert!(text.lines().all(|l| l.len() <= 80));
        assert!(text.contains("-0.0625"));

        let empty = PlayerSummary {
            wins: 0,
            pushes: 0,
            losses: 0,
            profit_per_dollar: None,
            ..summary
        };
        assert!(empty.to_string().trim_end().ends_with("nan"));
    }
}
