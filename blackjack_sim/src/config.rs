//! Configuration of a simulation run, loaded from JSON and overridden from the command line.

use crate::game::rules::{RuleSet, StandardRules};
use crate::game::strategy::{BasicHitStand, HiLoCounter, MimicDealer, Strategy};
use crate::write::RecordFormat;
use crate::GameConfig;
use blackjack_lib::BlackjackGameError;
use clap::ValueEnum;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulesVariant {
    /// Dealer stands on every 17
    #[default]
    S17,
    /// Dealer hits soft 17
    H17,
}

impl RulesVariant {
    pub fn build(&self) -> Box<dyn RuleSet> {
        match self {
            RulesVariant::S17 => Box::new(StandardRules::new()),
            RulesVariant::H17 => Box::new(StandardRules::hit_soft_seventeen()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Mimic,
    Basic,
    Hilo,
}

impl FromStr for StrategyKind {
    type Err = BlackjackGameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mimic" => Ok(StrategyKind::Mimic),
            "basic" => Ok(StrategyKind::Basic),
            "hilo" => Ok(StrategyKind::Hilo),
            other => Err(BlackjackGameError::config(format!(
                "unknown strategy {:?}, expected mimic, basic or hilo",
                other
            ))),
        }
    }
}

fn default_bet() -> f32 {
    1.0
}

fn default_margin() -> f32 {
    3.0
}

/// One seat at the table and the strategy playing it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeatConfig {
    pub seat: u32,
    pub strategy: StrategyKind,
    /// Flat bet, or the minimum bet of a counting strategy.
    #[serde(default = "default_bet")]
    pub bet: f32,
    /// Bet multiplier per point of true count, counting strategies only.
    #[serde(default = "default_margin")]
    pub margin: f32,
}

impl SeatConfig {
    pub fn build(&self, num_decks: usize) -> Box<dyn Strategy> {
        match self.strategy {
            StrategyKind::Mimic => Box::new(MimicDealer::new(self.bet)),
            StrategyKind::Basic => Box::new(BasicHitStand::new(self.bet)),
            StrategyKind::Hilo => Box::new(HiLoCounter::new(num_decks, self.bet, self.margin)),
        }
    }
}

impl FromStr for SeatConfig {
    type Err = BlackjackGameError;

    /// Parses `SEAT:STRATEGY[:BET]`, e.g. `1:mimic` or `2:hilo:5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(':').collect::<Vec<&str>>();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(BlackjackGameError::config(format!(
                "player {:?} should look like SEAT:STRATEGY[:BET]",
                s
            )));
        }
        let seat = parts[0]
            .trim()
            .parse::<u32>()
            .map_err(|e| BlackjackGameError::config(format!("seat {:?}: {}", parts[0], e)))?;
        let strategy = parts[1].trim().parse::<StrategyKind>()?;
        let bet = match parts.get(2) {
            Some(bet) => bet
                .trim()
                .parse::<f32>()
                .map_err(|e| BlackjackGameError::config(format!("bet {:?}: {}", bet, e)))?,
            None => default_bet(),
        };
        Ok(SeatConfig {
            seat,
            strategy,
            bet,
            margin: default_margin(),
        })
    }
}

/// Struct for configuring a whole run: the table, the seats and how records are written.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub rounds: usize,
    pub games: usize,
    pub num_decks: usize,
    pub depth_threshold: f64,
    pub seed: Option<u64>,
    pub rules: RulesVariant,
    pub players: Vec<SeatConfig>,
    pub format: RecordFormat,
    pub header: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let game = GameConfig::default();
        SimulationConfig {
            rounds: 1000,
            games: 1,
            num_decks: game.num_decks,
            depth_threshold: game.depth_threshold,
            seed: None,
            rules: RulesVariant::default(),
            players: vec![SeatConfig {
                seat: 1,
                strategy: StrategyKind::Mimic,
                bet: default_bet(),
                margin: default_margin(),
            }],
            format: RecordFormat::default(),
            header: false,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<SimulationConfig, BlackjackGameError> {
        serde_json::from_str(json)
            .map_err(|e| BlackjackGameError::config(format!("bad configuration: {}", e)))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, BlackjackGameError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            BlackjackGameError::config(format!("unable to read {}: {}", path.display(), e))
        })?;
        SimulationConfig::from_json_str(&json)
    }

    /// The shoe configuration for game number `game`. Every game of a seeded batch gets its
    /// own seed, derived from the configured one.
    pub fn game_config(&self, game: usize) -> GameConfig {
        let mut builder = GameConfig::new();
        builder
            .num_decks(self.num_decks)
            .depth_threshold(self.depth_threshold);
        if let Some(seed) = self.seed {
            builder.seed(seed.wrapping_add(game as u64));
        }
        builder.build()
    }

    /// Checks what the game itself cannot, the game validates the shoe and seats.
    pub fn validate(&self) -> Result<(), BlackjackGameError> {
        if self.games == 0 {
            return Err(BlackjackGameError::config("games must be at least 1"));
        }
        if self.players.is_empty() {
            return Err(BlackjackGameError::config("at least one player is required"));
        }
        Ok(())
    }
}
