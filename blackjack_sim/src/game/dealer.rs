use crate::game::rules::{Move, RuleSet};
use blackjack_lib::{BlackjackGameError, Card, Hand, Shoe};

/// Seat reserved for the house.
pub const DEALER_SEAT: u32 = 0;

/// The dealer's hand for one round. The first card is dealt face down and stays out of every
/// score until the dealer plays or peeks a blackjack.
#[derive(Debug, Clone)]
pub struct Dealer {
    hand: Hand,
}

impl Dealer {
    /// Associated function to create a new `Dealer` with an empty hand.
    pub fn new() -> Self {
        Dealer {
            hand: Hand::new(DEALER_SEAT, 0, 0.0),
        }
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    /// Method for receiving a card, face down if `hidden`.
    pub fn add_card(&mut self, card: Card, hidden: bool) -> Result<(), BlackjackGameError> {
        if hidden {
            self.hand.add_hidden(card)
        } else {
            self.hand.add_card(card);
            Ok(())
        }
    }

    /// Peeks under the hole card for a blackjack.
    pub fn has_blackjack(&self) -> bool {
        self.hand.peek_blackjack()
    }

    pub fn reveal(&mut self) -> Option<Card> {
        self.hand.reveal()
    }

    /// Reveals the hole card then draws from `shoe` until `rules` says stay.
    pub fn play_through(
        &mut self,
        rules: &dyn RuleSet,
        shoe: &mut Shoe,
    ) -> Result<(), BlackjackGameError> {
        self.reveal();
        while rules.get_dealer_play(&self.hand)? == Move::Hit {
            self.hand.add_card(shoe.deal_one());
        }
        log::trace!("dealer finished with {}", self.hand);
        Ok(())
    }
}

impl Default for Dealer {
    fn default() -> Self {
        Dealer::new()
    }
}
