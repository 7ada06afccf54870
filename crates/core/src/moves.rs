//! Moves and their textual aliases
//!
//! Canonical wire spelling is `Rock`, `Paper`, `Scissors`. Parsing is
//! case-insensitive, trims surrounding whitespace, and also accepts the
//! Portuguese names older peers send (`Pedra`, `Papel`, `Tesoura`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A move in one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// The move this one defeats
    pub fn beats_target(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Scissors => Move::Paper,
            Move::Paper => Move::Rock,
        }
    }

    pub fn beats(self, other: Move) -> bool {
        self.beats_target() == other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Move {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        const ALIASES: [(&str, Move); 6] = [
            ("rock", Move::Rock),
            ("paper", Move::Paper),
            ("scissors", Move::Scissors),
            ("pedra", Move::Rock),
            ("papel", Move::Paper),
            ("tesoura", Move::Scissors),
        ];

        ALIASES
            .iter()
            .find(|(alias, _)| trimmed.eq_ignore_ascii_case(alias))
            .map(|(_, m)| *m)
            .ok_or_else(|| Error::UnknownMove(trimmed.to_string()))
    }
}
