//! RPS Core Library
//!
//! Game rules and authoritative match state for two-player
//! rock-paper-scissors. No networking lives here.

pub mod error;
pub mod moves;
pub mod round;
pub mod rules;
pub mod state;

pub use error::{Error, Result};
pub use moves::Move;
pub use round::{RoundResult, RESULT_TAG};
pub use rules::{winner, Side, Winner};
pub use state::{MatchState, DEFAULT_TOTAL_ROUNDS, NO_NAME};
