use blackjack_lib::{BlackjackGameError, Hand};
use std::collections::HashSet;
use std::fmt::Display;

/// The two plays the round engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Hit,
    Stay,
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Hit => write!(f, "hit"),
            Move::Stay => write!(f, "stay"),
        }
    }
}

/// House side policy. One `RuleSet` is shared by every dealer of a game.
pub trait RuleSet {
    /// Short name written into every round record.
    fn name(&self) -> String;

    /// The plays a player may choose from with `player_hand` against `dealer_hand`.
    fn get_player_options(&self, player_hand: &Hand, dealer_hand: &Hand) -> HashSet<Move>;

    /// Decides whether the dealer draws another card.
    fn get_dealer_play(&self, dealer_hand: &Hand) -> Result<Move, BlackjackGameError>;

    /// Multiple of the bet paid on a winning two card 21.
    fn blackjack_multiplier(&self) -> f32 {
        1.5
    }

    /// Signed amount won by `player_hand` against the dealer's final hand. A busted player
    /// loses the bet even if the dealer busts too.
    fn calculate_payout(&self, player_hand: &Hand, dealer_hand: &Hand) -> f32 {
        let bet = player_hand.bet();
        let player_score = player_hand.standing_score();
        if player_score == 0 {
            return -bet;
        }
        let dealer_score = dealer_hand.standing_score();
        if player_score == dealer_score {
            0.0
        } else if player_score > dealer_score {
            if player_hand.is_blackjack() {
                self.blackjack_multiplier() * bet
            } else {
                bet
            }
        } else {
            -bet
        }
    }
}

/// Dealer stands on 17. With `hit_soft_seventeen` the dealer draws to a soft 17 as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules {
    hit_soft_seventeen: bool,
}

impl StandardRules {
    pub fn new() -> StandardRules {
        StandardRules {
            hit_soft_seventeen: false,
        }
    }

    pub fn hit_soft_seventeen() -> StandardRules {
        StandardRules {
            hit_soft_seventeen: true,
        }
    }
}

impl RuleSet for StandardRules {
    fn name(&self) -> String {
        if self.hit_soft_seventeen {
            "H17".to_string()
        } else {
            "S17".to_string()
        }
    }

    fn get_player_options(&self, player_hand: &Hand, _dealer_hand: &Hand) -> HashSet<Move> {
        let mut options = HashSet::new();
        options.insert(Move::Stay);
        if player_hand.scores().first().map_or(false, |min| *min < 21) {
            options.insert(Move::Hit);
        }
        options
    }

    fn get_dealer_play(&self, dealer_hand: &Hand) -> Result<Move, BlackjackGameError> {
        let scores = dealer_hand
            .scores()
            .into_iter()
            .filter(|s| *s <= 21)
            .collect::<Vec<u16>>();
        if scores.is_empty() {
            return Ok(Move::Stay);
        }
        let soft = scores.len() > 1;
        scores
            .iter()
            .rev()
            .find_map(|score| match *score {
                17 if soft && self.hit_soft_seventeen => Some(Move::Hit),
                s if s > 16 => Some(Move::Stay),
                s if s <= 16 => Some(Move::Hit),
                _ => None,
            })
            .ok_or_else(|| {
                BlackjackGameError::invalid_move(format!(
                    "dealer unable to choose with {}, the rule set does not cover every hand state",
                    dealer_hand
                ))
            })
    }
}
