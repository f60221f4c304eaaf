//! Card model for the blackjack simulator: cards, the shoe they are dealt from, and the hands
//! that score them.

mod card;
mod error;
mod hand;
mod shoe;

pub use card::{Card, Rank, Suit};
pub use error::BlackjackGameError;
pub use hand::Hand;
pub use shoe::Shoe;
