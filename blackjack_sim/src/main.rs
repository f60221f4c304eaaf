use blackjack_sim::config::{RulesVariant, SeatConfig, SimulationConfig};
use blackjack_sim::write::{RecordFormat, RecordWriter};
use blackjack_sim::{Game, SimulationError};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plays rounds of blackjack between strategies and the house",
    long_about = None
)]
struct Cli {
    /// JSON configuration file, flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Rounds played per game
    #[arg(long)]
    rounds: Option<usize>,
    /// Independent games played, each with a fresh shoe and fresh players
    #[arg(long)]
    games: Option<usize>,
    #[arg(long)]
    decks: Option<usize>,
    /// Fraction of the shoe dealt before reshuffling
    #[arg(long)]
    depth: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    rules: Option<RulesVariant>,
    /// SEAT:STRATEGY[:BET] with STRATEGY one of mimic, basic, hilo. Repeat for more seats
    #[arg(long = "player", value_name = "SEAT:STRATEGY")]
    players: Vec<SeatConfig>,
    #[arg(long, value_enum)]
    format: Option<RecordFormat>,
    /// Print a header line before the first CSV record
    #[arg(long)]
    header: bool,
    /// Write records here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
    /// Skip the per player summaries
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> Result<(SimulationConfig, Option<PathBuf>, bool), SimulationError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(rounds) = self.rounds {
            config.rounds = rounds;
        }
        if let Some(games) = self.games {
            config.games = games;
        }
        if let Some(decks) = self.decks {
            config.num_decks = decks;
        }
        if let Some(depth) = self.depth {
            config.depth_threshold = depth;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(rules) = self.rules {
            config.rules = rules;
        }
        if !self.players.is_empty() {
            config.players = self.players;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        config.header |= self.header;
        config.validate()?;
        Ok((config, self.out, self.quiet))
    }
}

fn build_game(config: &SimulationConfig, game: usize) -> Result<Game, SimulationError> {
    let mut table = Game::new(config.rules.build(), config.game_config(game))?;
    for seat in &config.players {
        table.add_player(seat.seat, seat.build(config.num_decks))?;
    }
    Ok(table)
}

fn run(cli: Cli) -> Result<(), SimulationError> {
    let (config, out, quiet) = cli.into_config()?;
    let mut sink: Box<dyn Write> = match &out {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    if config.games == 1 {
        let mut game = build_game(&config, 0)?;
        let mut writer = RecordWriter::new(sink.as_mut(), config.format);
        if config.header {
            writer = writer.with_header();
        }
        game.play(config.rounds, Some(&mut writer))?;
        writer.flush()?;
        if !quiet {
            eprintln!("{:-^80}", game.descriptor());
            for summary in game.summaries() {
                eprintln!("{}{}", summary, "-".repeat(80));
            }
        }
        return Ok(());
    }

    // batch mode, one line of final profit per dollar per game
    for index in 0..config.games {
        let mut game = build_game(&config, index)?;
        let results = game.play(config.rounds, None)?;
        let line = results
            .iter()
            .map(|ppd| format!("{:.4}", ppd))
            .collect::<Vec<String>>()
            .join(",");
        writeln!(sink, "{},{}", index, line)?;
        if !quiet {
            eprintln!("{:-^80}", format!("game #{}", index + 1));
            for summary in game.summaries() {
                eprintln!("{}", summary);
            }
        }
    }
    sink.flush()?;
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "blackjack_sim",
            "--rounds",
            "20",
            "--rules",
            "h17",
            "--player",
            "3:basic",
            "--player",
            "1:hilo:5",
            "--format",
            "json",
            "--seed",
            "4",
        ]);
        let (config, out, quiet) = cli.into_config().unwrap();
        assert_eq!(config.rounds, 20);
        assert_eq!(config.rules, RulesVariant::H17);
        assert_eq!(config.players.len(), 2);
        assert_eq!(config.players[1].bet, 5.0);
        assert_eq!(config.format, RecordFormat::Json);
        assert_eq!(config.seed, Some(4));
        assert_eq!(out, None);
        assert!(!quiet);

        let game = build_game(&config, 0).unwrap();
        let seats = game.players().iter().map(|p| p.seat()).collect::<Vec<u32>>();
        assert_eq!(seats, vec![1, 3]);
    }

    #[test]
    fn bad_player_flag_is_rejected() {
        assert!(Cli::try_parse_from(["blackjack_sim", "--player", "1:cheat"]).is_err());
    }

    #[test]
    fn duplicate_seats_fail_to_build() {
        let cli = Cli::parse_from(["blackjack_sim", "--player", "1:basic", "--player", "1:mimic"]);
        let (config, _, _) = cli.into_config().unwrap();
        assert!(matches!(
            build_game(&config, 0),
            Err(SimulationError::Config(_))
        ));
    }
}
