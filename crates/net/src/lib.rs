//! RPS Network Library
//!
//! LAN play for two-player rock-paper-scissors over TCP.
//!
//! # Architecture
//!
//! - **Host**: listens, accepts one guest, owns the match and resolves rounds
//! - **Guest**: connects to a host, sends its name and moves
//! - **Protocol**: newline-terminated text lines with a keyword tag
//! - **Events**: both sessions report to their consumer through an
//!   [`EventSink`]; [`events::channel`] gives a queue the consumer drains
//!   from its own loop
//!
//! # Usage
//!
//! ```ignore
//! // Host
//! let (tx, mut host_events) = events::channel();
//! let host = Host::new(HostConfig::default(), tx);
//! host.start_host("Ana").await?;
//!
//! // Guest, on another machine
//! let (tx, mut guest_events) = events::channel();
//! let guest = Guest::new(GuestConfig::default(), tx);
//! guest.connect("192.168.1.20", "Bob").await?;
//!
//! // Consumer loop (e.g. once per frame)
//! guest_events.drain(|event| match event {
//!     SessionEvent::RoundResult(line) => { /* line.parse() */ }
//!     _ => {}
//! });
//! ```

pub mod discovery;
pub mod error;
pub mod events;
mod frame;
pub mod guest;
pub mod host;
pub mod protocol;

pub use error::{Error, Result};
pub use events::{EventQueue, EventSender, EventSink, SessionEvent};
pub use guest::{Guest, GuestConfig};
pub use host::{Host, HostConfig};
pub use protocol::{DecodeError, Message, ResultLine};

/// Default port for RPS hosts
pub const DEFAULT_PORT: u16 = 7777;
