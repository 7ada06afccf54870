//! Authoritative match state
//!
//! Owned by the host session and mutated only through [`MatchState::submit`]
//! and [`MatchState::try_resolve`]. The owner is expected to hold its lock
//! across a whole `submit` call so two moves arriving together resolve the
//! round exactly once.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::moves::Move;
use crate::round::RoundResult;
use crate::rules::{winner, Side, Winner};

/// Rounds per match unless configured otherwise
pub const DEFAULT_TOTAL_ROUNDS: u32 = 5;

/// Placeholder shown for a name that has not been reported yet
pub const NO_NAME: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    current_round: u32,
    total_rounds: u32,
    host_score: u32,
    guest_score: u32,
    host_move: Option<Move>,
    guest_move: Option<Move>,
    host_name: Option<String>,
    guest_name: Option<String>,
    complete: bool,
}

impl MatchState {
    /// A fresh match. `total_rounds` is raised to 1 if given as 0.
    pub fn new(total_rounds: u32) -> Self {
        Self {
            current_round: 1,
            total_rounds: total_rounds.max(1),
            host_score: 0,
            guest_score: 0,
            host_move: None,
            guest_move: None,
            host_name: None,
            guest_name: None,
            complete: false,
        }
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn host_score(&self) -> u32 {
        self.host_score
    }

    pub fn guest_score(&self) -> u32 {
        self.guest_score
    }

    pub fn host_move(&self) -> Option<Move> {
        self.host_move
    }

    pub fn guest_move(&self) -> Option<Move> {
        self.guest_move
    }

    pub fn host_name(&self) -> Option<&str> {
        self.host_name.as_deref()
    }

    pub fn guest_name(&self) -> Option<&str> {
        self.guest_name.as_deref()
    }

    /// True once the final round has been resolved
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn has_moved(&self, side: Side) -> bool {
        match side {
            Side::Host => self.host_move.is_some(),
            Side::Guest => self.guest_move.is_some(),
        }
    }

    pub fn set_host_name(&mut self, name: Option<String>) {
        self.host_name = name;
    }

    pub fn set_guest_name(&mut self, name: Option<String>) {
        self.guest_name = name;
    }

    /// Back to round one with no scores or pending moves. Names are kept.
    pub fn reset(&mut self) {
        *self = Self {
            host_name: self.host_name.take(),
            guest_name: self.guest_name.take(),
            ..Self::new(self.total_rounds)
        };
    }

    /// Forget the departed guest: its name and any move it had pending
    pub fn clear_guest(&mut self) {
        self.guest_name = None;
        self.guest_move = None;
    }

    /// Store one side's move for the current round and resolve the round
    /// if the other side has already moved.
    ///
    /// A side may move once per round; a second move is rejected without
    /// touching the stored one.
    pub fn submit(&mut self, side: Side, mv: Move) -> Result<Option<RoundResult>> {
        if self.complete {
            return Err(Error::MatchComplete);
        }

        let slot = match side {
            Side::Host => &mut self.host_move,
            Side::Guest => &mut self.guest_move,
        };
        if slot.is_some() {
            return Err(Error::AlreadyMoved(side));
        }
        *slot = Some(mv);
        debug!(round = self.current_round, side = %side, mv = %mv, "Move stored");

        Ok(self.try_resolve())
    }

    /// Resolve the current round if both moves are in. Returns `None` when a
    /// move is still missing or the match is over, so calling it again on an
    /// already resolved round changes nothing.
    pub fn try_resolve(&mut self) -> Option<RoundResult> {
        if self.complete {
            return None;
        }
        let (host_move, guest_move) = match (self.host_move, self.guest_move) {
            (Some(h), Some(g)) => (h, g),
            _ => return None,
        };

        let outcome = winner(host_move, guest_move);
        match outcome {
            Winner::Host => self.host_score += 1,
            Winner::Guest => self.guest_score += 1,
            Winner::Draw => {}
        }
        let game_over = self.current_round >= self.total_rounds;

        let result = RoundResult {
            round: self.current_round,
            total_rounds: self.total_rounds,
            host_name: self.host_name.clone().unwrap_or_else(|| NO_NAME.into()),
            guest_name: self.guest_name.clone().unwrap_or_else(|| NO_NAME.into()),
            host_move,
            guest_move,
            winner: outcome,
            host_score: self.host_score,
            guest_score: self.guest_score,
            game_over,
        };

        if game_over {
            self.complete = true;
            info!(
                host_score = self.host_score,
                guest_score = self.guest_score,
                "Match complete"
            );
        } else {
            self.current_round += 1;
            self.host_move = None;
            self.guest_move = None;
        }

        Some(result)
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_ROUNDS)
    }
}
