//! Error types for RPS Core

use thiserror::Error;

use crate::rules::Side;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown move: {0:?}")]
    UnknownMove(String),

    #[error("Match is already complete")]
    MatchComplete,

    #[error("{0} has already moved this round")]
    AlreadyMoved(Side),

    #[error("Malformed result line: {0}")]
    MalformedResult(String),
}

pub type Result<T> = std::result::Result<T, Error>;
