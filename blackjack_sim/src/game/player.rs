use crate::game::rules::{Move, RuleSet};
use crate::game::strategy::{Strategy, TableState};
use crate::PlayerSummary;
use blackjack_lib::{BlackjackGameError, Hand, Shoe};
use std::fmt::Display;

/// A seat at the table, playing its hands with a `Strategy` and keeping running totals
/// across rounds.
pub struct Player {
    seat: u32,
    strategy: Box<dyn Strategy>,
    hand_ids: Vec<usize>,
    outlay: f32,
    net_winnings: f32,
    last_round: f32,
    hands_won: u32,
    hands_pushed: u32,
    hands_lost: u32,
    blackjacks: u32,
}

impl Player {
    /// Associated function to create a new `Player` seated at `seat`.
    pub fn new(seat: u32, strategy: Box<dyn Strategy>) -> Player {
        Player {
            seat,
            strategy,
            hand_ids: vec![],
            outlay: 0.0,
            net_winnings: 0.0,
            last_round: 0.0,
            hands_won: 0,
            hands_pushed: 0,
            hands_lost: 0,
            blackjacks: 0,
        }
    }

    pub fn seat(&self) -> u32 {
        self.seat
    }

    pub fn label(&self) -> String {
        self.strategy.label()
    }

    pub fn add_hand(&mut self, id: usize) {
        self.hand_ids.push(id);
    }

    pub fn clear_hands(&mut self) {
        self.hand_ids.clear();
    }

    /// Sum of every bet ever placed.
    pub fn outlay(&self) -> f32 {
        self.outlay
    }

    /// Cumulative net winnings.
    pub fn balance(&self) -> f32 {
        self.net_winnings
    }

    /// Net payout of the most recently observed round.
    pub fn last_round(&self) -> f32 {
        self.last_round
    }

    /// Lets the strategy notice a reshuffle, then asks it for a bet.
    pub fn make_bet(&mut self, num_dealt: usize) -> Result<f32, BlackjackGameError> {
        self.strategy.check_reshuffle(num_dealt);
        let bet = self.strategy.advise_bet();
        if !bet.is_finite() || bet < 0.0 {
            return Err(BlackjackGameError::invalid_move(format!(
                "strategy {:?} advised a bet of {}",
                self.strategy.label(),
                bet
            )));
        }
        Ok(bet)
    }

    /// Plays each of this player's hands in order, drawing from `shoe` until the strategy
    /// stays. A play the rules do not offer fails with `InvalidMove`.
    pub fn play_through(
        &mut self,
        hands: &mut [Hand],
        dealer: &Hand,
        shoe: &mut Shoe,
        rules: &dyn RuleSet,
    ) -> Result<(), BlackjackGameError> {
        for &id in &self.hand_ids {
            loop {
                let decision = {
                    let hand = hands.get(id).ok_or_else(|| {
                        BlackjackGameError::state(format!(
                            "seat {} refers to hand {} of {}",
                            self.seat,
                            id,
                            hands.len()
                        ))
                    })?;
                    let table = TableState::new(dealer, hands, shoe.num_dealt());
                    let decision = self.strategy.advise_play(hand, &table)?;
                    if !rules.get_player_options(hand, dealer).contains(&decision) {
                        return Err(BlackjackGameError::invalid_move(format!(
                            "strategy {:?} chose to {} on {}, which the rules do not allow",
                            self.strategy.label(),
                            decision,
                            hand
                        )));
                    }
                    log::trace!("seat {} chose to {} on {}", self.seat, decision, hand);
                    decision
                };
                match decision {
                    Move::Hit => hands[id].add_card(shoe.deal_one()),
                    Move::Stay => break,
                }
            }
        }
        Ok(())
    }

    /// Books the resolved round: stakes go to outlay, payouts to net winnings, and the
    /// strategy gets to see the table. Every hand must have been resolved. Returns the
    /// round's net payout.
    pub fn observe(
        &mut self,
        hands: &[Hand],
        dealer: &Hand,
        num_dealt: usize,
    ) -> Result<f32, BlackjackGameError> {
        let mut resolved = Vec::with_capacity(self.hand_ids.len());
        for &id in &self.hand_ids {
            let hand = hands.get(id).ok_or_else(|| {
                BlackjackGameError::state(format!(
                    "seat {} refers to hand {} of {}",
                    self.seat,
                    id,
                    hands.len()
                ))
            })?;
            resolved.push((hand.bet(), hand.payout()?, hand.is_blackjack()));
        }

        let mut stakes = 0.0;
        let mut round = 0.0;
        for (bet, payout, blackjack) in resolved {
            stakes += bet;
            round += payout;
            if payout > 0.0 {
                self.hands_won += 1;
            } else if payout < 0.0 {
                self.hands_lost += 1;
            } else {
                self.hands_pushed += 1;
            }
            if blackjack {
                self.blackjacks += 1;
            }
        }
        self.outlay += stakes;
        self.net_winnings += round;
        self.last_round = round;

        self.strategy
            .observe(&TableState::new(dealer, hands, num_dealt));
        Ok(round)
    }

    /// Net winnings per unit staked.
    pub fn profit_per_dollar(&self) -> Result<f32, BlackjackGameError> {
        if self.outlay == 0.0 {
            return Err(BlackjackGameError::DivisionUndefined { seat: self.seat });
        }
        Ok(self.net_winnings / self.outlay)
    }

    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            seat: self.seat,
            label: self.label(),
            wins: self.hands_won,
            pushes: self.hands_pushed,
            losses: self.hands_lost,
            player_blackjacks: self.blackjacks,
            outlay: self.outlay,
            winnings: self.net_winnings,
            profit_per_dollar: self.profit_per_dollar().ok(),
        }
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<21}{}\n\
                   {:<21}{}\n\
                   {:<21}{:?}\n\
                   {:<21}${:.2}\n\
                   {:<21}${:.2}",
            "seat:",
            self.seat,
            "strategy:",
            self.label(),
            "hands:",
            self.hand_ids,
            "outlay:",
            self.outlay,
            "balance:",
            self.net_winnings,
        )
    }
}
