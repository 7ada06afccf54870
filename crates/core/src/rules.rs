//! Round winner computation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::moves::Move;

/// One of the two participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Host,
    Guest,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Host => write!(f, "Host"),
            Side::Guest => write!(f, "Guest"),
        }
    }
}

/// Outcome of a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    Host,
    Guest,
    Draw,
}

impl Winner {
    /// Token used in the `winner` field of a RESULT line.
    /// A guest win is spelled `CLIENT` for compatibility with existing peers.
    pub fn wire_token(self) -> &'static str {
        match self {
            Winner::Host => "HOST",
            Winner::Guest => "CLIENT",
            Winner::Draw => "DRAW",
        }
    }

    pub fn side(self) -> Option<Side> {
        match self {
            Winner::Host => Some(Side::Host),
            Winner::Guest => Some(Side::Guest),
            Winner::Draw => None,
        }
    }
}

impl FromStr for Winner {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "HOST" => Ok(Winner::Host),
            "CLIENT" | "GUEST" => Ok(Winner::Guest),
            "DRAW" => Ok(Winner::Draw),
            other => Err(Error::MalformedResult(format!("unknown winner {other:?}"))),
        }
    }
}

/// Decide a round from both normalized moves
pub fn winner(host: Move, guest: Move) -> Winner {
    if host == guest {
        Winner::Draw
    } else if host.beats(guest) {
        Winner::Host
    } else {
        Winner::Guest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_move() -> impl Strategy<Value = Move> {
        prop::sample::select(Move::ALL.to_vec())
    }

    #[test]
    fn test_winner_table() {
        assert_eq!(winner(Move::Rock, Move::Scissors), Winner::Host);
        assert_eq!(winner(Move::Scissors, Move::Paper), Winner::Host);
        assert_eq!(winner(Move::Paper, Move::Rock), Winner::Host);
        assert_eq!(winner(Move::Scissors, Move::Rock), Winner::Guest);
        assert_eq!(winner(Move::Paper, Move::Scissors), Winner::Guest);
        assert_eq!(winner(Move::Rock, Move::Paper), Winner::Guest);
    }

    #[test]
    fn test_winner_tokens() {
        assert_eq!("HOST".parse::<Winner>().unwrap(), Winner::Host);
        assert_eq!("CLIENT".parse::<Winner>().unwrap(), Winner::Guest);
        assert_eq!("GUEST".parse::<Winner>().unwrap(), Winner::Guest);
        assert_eq!("DRAW".parse::<Winner>().unwrap(), Winner::Draw);
        assert!("host".parse::<Winner>().is_err());
        assert_eq!(Winner::Guest.wire_token(), "CLIENT");
    }

    proptest! {
        #[test]
        fn same_move_is_draw(m in any_move()) {
            prop_assert_eq!(winner(m, m), Winner::Draw);
        }

        #[test]
        fn winner_is_antisymmetric(a in any_move(), b in any_move()) {
            prop_assume!(a != b);
            prop_assert_eq!(winner(a, b) == Winner::Host, winner(b, a) == Winner::Guest);
            prop_assert_ne!(winner(a, b), Winner::Draw);
        }

        #[test]
        fn exactly_one_side_beats_the_other(a in any_move(), b in any_move()) {
            prop_assume!(a != b);
            prop_assert!(a.beats(b) ^ b.beats(a));
        }
    }
}
