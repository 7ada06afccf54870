//! Resolved round results and the RESULT line format
//!
//! Wire format (one line, pipe separated):
//! `RESULT|round|total|hostName|guestName|hostMove|guestMove|winner|hostScore|guestScore|gameOver`
//! where `gameOver` is `0` or `1`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::moves::Move;
use crate::rules::Winner;

/// Tag opening a RESULT line
pub const RESULT_TAG: &str = "RESULT";

/// Number of pipe-separated fields in a RESULT line, tag included
const RESULT_FIELDS: usize = 11;

/// Outcome of one resolved round. Produced once per round by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub total_rounds: u32,
    pub host_name: String,
    pub guest_name: String,
    pub host_move: Move,
    pub guest_move: Move,
    pub winner: Winner,
    pub host_score: u32,
    pub guest_score: u32,
    pub game_over: bool,
}

impl RoundResult {
    /// Overall match winner, only known once the last round is in
    pub fn final_winner(&self) -> Option<Winner> {
        if !self.game_over {
            return None;
        }
        Some(match self.host_score.cmp(&self.guest_score) {
            std::cmp::Ordering::Greater => Winner::Host,
            std::cmp::Ordering::Less => Winner::Guest,
            std::cmp::Ordering::Equal => Winner::Draw,
        })
    }

    /// Display name of the round winner, `None` on a draw
    pub fn winner_name(&self) -> Option<&str> {
        match self.winner {
            Winner::Host => Some(&self.host_name),
            Winner::Guest => Some(&self.guest_name),
            Winner::Draw => None,
        }
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            RESULT_TAG,
            self.round,
            self.total_rounds,
            self.host_name,
            self.guest_name,
            self.host_move,
            self.guest_move,
            self.winner.wire_token(),
            self.host_score,
            self.guest_score,
            u8::from(self.game_over)
        )
    }
}

fn number(field: &str, what: &str) -> Result<u32, Error> {
    field
        .trim()
        .parse()
        .map_err(|_| Error::MalformedResult(format!("bad {what} {field:?}")))
}

impl FromStr for RoundResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('|').collect();
        if parts[0] != RESULT_TAG {
            return Err(Error::MalformedResult("missing RESULT tag".into()));
        }
        if parts.len() < RESULT_FIELDS {
            return Err(Error::MalformedResult(format!(
                "expected {} fields, got {}",
                RESULT_FIELDS,
                parts.len()
            )));
        }

        let parse_move = |field: &str| {
            field
                .parse::<Move>()
                .map_err(|_| Error::MalformedResult(format!("bad move {field:?}")))
        };

        let game_over = match parts[10].trim() {
            "0" => false,
            "1" => true,
            other => {
                return Err(Error::MalformedResult(format!(
                    "bad gameOver flag {other:?}"
                )))
            }
        };

        Ok(Self {
            round: number(parts[1], "round")?,
            total_rounds: number(parts[2], "total")?,
            host_name: parts[3].to_string(),
            guest_name: parts[4].to_string(),
            host_move: parse_move(parts[5])?,
            guest_move: parse_move(parts[6])?,
            winner: parts[7].parse()?,
            host_score: number(parts[8], "host score")?,
            guest_score: number(parts[9], "guest score")?,
            game_over,
        })
    }
}
