use crate::BlackjackGameError;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

lazy_static! {
    /// Every value a rank can take. Built once, only reachable through `Rank::values`.
    static ref RANK_VALUES: HashMap<Rank, Vec<u8>> = {
        let mut table = HashMap::new();
        table.insert(Rank::Ace, vec![1, 11]);
        for (i, rank) in Rank::ALL[1..10].iter().enumerate() {
            table.insert(*rank, vec![(i as u8) + 2]);
        }
        for rank in [Rank::Jack, Rank::Queen, Rank::King] {
            table.insert(rank, vec![10]);
        }
        table
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// The values this rank may count as. Only the ace has more than one.
    pub fn values(&self) -> &'static [u8] {
        &RANK_VALUES[self]
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

impl FromStr for Rank {
    type Err = BlackjackGameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rank::ALL
            .iter()
            .find(|rank| rank.symbol().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| BlackjackGameError::config(format!("unknown rank {:?}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn symbol(&self) -> char {
        match self {
            Suit::Spades => '\u{2660}',
            Suit::Hearts => '\u{2665}',
            Suit::Diamonds => '\u{2666}',
            Suit::Clubs => '\u{2663}',
        }
    }

    pub fn is_red(&self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    fn from_char(c: char) -> Option<Suit> {
        match c {
            '\u{2660}' | 'S' | 's' => Some(Suit::Spades),
            '\u{2665}' | 'H' | 'h' => Some(Suit::Hearts),
            '\u{2666}' | 'D' | 'd' => Some(Suit::Diamonds),
            '\u{2663}' | 'C' | 'c' => Some(Suit::Clubs),
            _ => None,
        }
    }
}

/// A single playing card. Two cards are equal when both rank and suit match, which is also
/// what decides whether a two card hand may be split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn values(&self) -> &'static [u8] {
        self.rank.values()
    }

    /// Value used by single valued lookups such as counting tables, the ace counts as 1.
    pub fn low_value(&self) -> u8 {
        self.values()[0]
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

impl FromStr for Card {
    type Err = BlackjackGameError;

    /// Parses short card text such as `"AS"`, `"10♥"` or `"qd"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let suit_char = s
            .chars()
            .last()
            .ok_or_else(|| BlackjackGameError::config("empty card text"))?;
        let suit = Suit::from_char(suit_char)
            .ok_or_else(|| BlackjackGameError::config(format!("unknown suit in {:?}", s)))?;
        let rank = s[..s.len() - suit_char.len_utf8()].parse::<Rank>()?;
        Ok(Card::new(rank, suit))
    }
}
