//! Network error types

use std::io;

use crate::protocol::DecodeError;

/// Network result type
pub type Result<T> = std::result::Result<T, Error>;

/// Network errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Not hosting")]
    NotHosting,

    #[error("Not connected")]
    NotConnected,

    #[error("No guest connected")]
    NoGuest,

    #[error(transparent)]
    Match(#[from] rps_core::Error),
}
