use thiserror::Error;

/// Errors raised by the card model and by the policies that drive a round.
///
/// None of these are transient. An `InvalidMove` or `InvalidState` coming out of a
/// round means a `RuleSet` or `Strategy` implementation is incomplete, so callers are
/// expected to propagate them rather than retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlackjackGameError {
    /// Bad construction parameters, e.g. a shoe with zero decks.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A policy could not resolve a choice for a well formed hand, or chose an option
    /// that was not available.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// State was read out of order, e.g. a payout read before it was assigned.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Profit per dollar requested for a player that has never placed a bet.
    #[error("invalid state: seat {seat} has no outlay, profit per dollar is undefined")]
    DivisionUndefined { seat: u32 },
}

impl BlackjackGameError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        BlackjackGameError::InvalidConfig(message.into())
    }

    pub fn invalid_move<S: Into<String>>(message: S) -> Self {
        BlackjackGameError::InvalidMove(message.into())
    }

    pub fn state<S: Into<String>>(message: S) -> Self {
        BlackjackGameError::InvalidState(message.into())
    }
}
