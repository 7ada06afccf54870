//! Network protocol message types
//!
//! Every message is one line: a keyword tag optionally followed by
//! pipe-separated fields.
//!
//! | Message      | Direction     | Shape                                    |
//! |--------------|---------------|------------------------------------------|
//! | `HELLO`      | guest → host  | `HELLO\|name`                            |
//! | `LOBBY`      | host → guest  | `LOBBY\|hostName\|guestName` (`-` = none) |
//! | `START_GAME` | host → guest  | `START_GAME`                             |
//! | `MOVE`       | guest → host  | `MOVE\|move`                             |
//! | `RESULT`     | host → guest  | see [`rps_core::round`]                  |

use std::fmt;
use std::str::FromStr;

use rps_core::{Move, RoundResult, NO_NAME, RESULT_TAG};

const HELLO_TAG: &str = "HELLO";
const LOBBY_TAG: &str = "LOBBY";
const START_GAME_TAG: &str = "START_GAME";
const MOVE_TAG: &str = "MOVE";

/// Fields after the tag that a RESULT line must carry
const RESULT_PAYLOAD_FIELDS: usize = 10;

/// Why a received line was not turned into a [`Message`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Empty line")]
    Empty,

    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    #[error("{tag} needs {expected} field(s), got {got}")]
    MissingFields {
        tag: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Unknown move: {0:?}")]
    UnknownMove(String),
}

/// A RESULT line as received, kept verbatim.
///
/// The host is the only source of truth for the outcome fields, so the guest
/// forwards the line untouched and the consumer parses it when it needs the
/// values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLine(String);

impl ResultLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the outcome fields. A malformed winner or score is reported as
    /// an error the caller should log and skip.
    pub fn parse(&self) -> rps_core::Result<RoundResult> {
        self.0.parse()
    }
}

impl From<&RoundResult> for ResultLine {
    fn from(result: &RoundResult) -> Self {
        Self(result.to_string())
    }
}

impl fmt::Display for ResultLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Network protocol messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Guest introduces itself, sent once right after connecting
    Hello { name: String },

    /// Current lobby composition
    Lobby { host: String, guest: Option<String> },

    /// Match begins
    StartGame,

    /// Guest's move for the current round
    Move(Move),

    /// One resolved round
    Result(ResultLine),
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Hello { name } => write!(f, "{HELLO_TAG}|{name}"),
            Message::Lobby { host, guest } => write!(
                f,
                "{LOBBY_TAG}|{host}|{}",
                guest.as_deref().unwrap_or(NO_NAME)
            ),
            Message::StartGame => f.write_str(START_GAME_TAG),
            Message::Move(mv) => write!(f, "{MOVE_TAG}|{mv}"),
            Message::Result(line) => f.write_str(line.as_str()),
        }
    }
}

/// The first `expected` fields must be present and non-blank
fn require(tag: &'static str, fields: &[&str], expected: usize) -> Result<(), DecodeError> {
    let got = fields
        .iter()
        .take(expected)
        .filter(|f| !f.trim().is_empty())
        .count();
    if got < expected {
        return Err(DecodeError::MissingFields { tag, expected, got });
    }
    Ok(())
}

impl FromStr for Message {
    type Err = DecodeError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(DecodeError::Empty);
        }

        let (tag, payload) = match line.split_once('|') {
            Some((tag, payload)) => (tag, Some(payload)),
            None => (line, None),
        };
        let fields: Vec<&str> = payload.map(|p| p.split('|').collect()).unwrap_or_default();

        match tag {
            HELLO_TAG => {
                let name = payload.map(str::trim).unwrap_or_default();
                if name.is_empty() {
                    return Err(DecodeError::MissingFields {
                        tag: HELLO_TAG,
                        expected: 1,
                        got: 0,
                    });
                }
                Ok(Message::Hello {
                    name: name.to_string(),
                })
            }
            LOBBY_TAG => {
                require(LOBBY_TAG, &fields, 1)?;
                let guest = fields
                    .get(1)
                    .map(|g| g.trim())
                    .filter(|g| !g.is_empty() && *g != NO_NAME)
                    .map(str::to_string);
                Ok(Message::Lobby {
                    host: fields[0].trim().to_string(),
                    guest,
                })
            }
            START_GAME_TAG => Ok(Message::StartGame),
            MOVE_TAG => {
                require(MOVE_TAG, &fields, 1)?;
                let text = fields[0].trim();
                text.parse::<Move>()
                    .map(Message::Move)
                    .map_err(|_| DecodeError::UnknownMove(text.to_string()))
            }
            RESULT_TAG => {
                if fields.len() < RESULT_PAYLOAD_FIELDS {
                    return Err(DecodeError::MissingFields {
                        tag: RESULT_TAG,
                        expected: RESULT_PAYLOAD_FIELDS,
                        got: fields.len(),
                    });
                }
                Ok(Message::Result(ResultLine(line.to_string())))
            }
            other => Err(DecodeError::UnknownTag(other.to_string())),
        }
    }
}

/// Make a display name safe to embed in a line: separators and line breaks
/// become spaces and the result is trimmed.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '|' | '\r' | '\n') { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rps_core::Winner;

    fn decode(line: &str) -> Result<Message, DecodeError> {
        line.parse()
    }

    #[test]
    fn test_encode_messages() {
        assert_eq!(
            Message::Hello { name: "Bob".into() }.to_string(),
            "HELLO|Bob"
        );
        assert_eq!(
            Message::Lobby {
                host: "Ana".into(),
                guest: None
            }
            .to_string(),
            "LOBBY|Ana|-"
        );
        assert_eq!(
            Message::Lobby {
                host: "Ana".into(),
                guest: Some("Bob".into())
            }
            .to_string(),
            "LOBBY|Ana|Bob"
        );
        assert_eq!(Message::StartGame.to_string(), "START_GAME");
        assert_eq!(Message::Move(Move::Paper).to_string(), "MOVE|Paper");
    }

    #[test]
    fn test_decode_hello_and_move() {
        assert_eq!(
            decode("HELLO| Bob \r").unwrap(),
            Message::Hello { name: "Bob".into() }
        );
        assert_eq!(decode("MOVE|scissors").unwrap(), Message::Move(Move::Scissors));
        assert_eq!(decode("MOVE|Pedra").unwrap(), Message::Move(Move::Rock));
        assert_eq!(decode("START_GAME").unwrap(), Message::StartGame);
    }

    #[test]
    fn test_decode_lobby_placeholder() {
        assert_eq!(
            decode("LOBBY|Ana|-").unwrap(),
            Message::Lobby {
                host: "Ana".into(),
                guest: None
            }
        );
        assert_eq!(
            decode("LOBBY|Ana").unwrap(),
            Message::Lobby {
                host: "Ana".into(),
                guest: None
            }
        );
        assert_eq!(
            decode("LOBBY|Ana|Bob").unwrap(),
            Message::Lobby {
                host: "Ana".into(),
                guest: Some("Bob".into())
            }
        );
        assert!(decode("LOBBY").is_err());
    }

    #[test]
    fn test_decode_short_lines_are_rejected() {
        assert!(matches!(
            decode("MOVE"),
            Err(DecodeError::MissingFields { tag: "MOVE", .. })
        ));
        assert!(matches!(decode("MOVE|"), Err(DecodeError::MissingFields { .. })));
        assert!(matches!(decode("HELLO|"), Err(DecodeError::MissingFields { .. })));
        assert!(matches!(
            decode("RESULT|x"),
            Err(DecodeError::MissingFields { tag: "RESULT", .. })
        ));
    }

    #[test]
    fn test_decode_unknown_input() {
        assert_eq!(decode(""), Err(DecodeError::Empty));
        assert_eq!(
            decode("PING"),
            Err(DecodeError::UnknownTag("PING".into()))
        );
        assert_eq!(
            decode("MOVE|lizard"),
            Err(DecodeError::UnknownMove("lizard".into()))
        );
    }

    #[test]
    fn test_result_line_is_forwarded_verbatim() {
        let raw = "RESULT|1|3|Ana|Bob|Rock|Scissors|HOST|1|0|0";
        let Message::Result(line) = decode(raw).unwrap() else {
            panic!("expected RESULT");
        };
        assert_eq!(line.as_str(), raw);
        let parsed = line.parse().unwrap();
        assert_eq!(parsed.winner, Winner::Host);
        assert_eq!(Message::Result(line).to_string(), raw);
    }

    #[test]
    fn test_result_with_bad_score_decodes_but_fails_to_parse() {
        let raw = "RESULT|1|3|Ana|Bob|Rock|Scissors|HOST|lots|0|0";
        let Message::Result(line) = decode(raw).unwrap() else {
            panic!("expected RESULT");
        };
        assert!(line.parse().is_err());
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name(" Ana|Maria\n"), "Ana Maria");
        assert_eq!(sanitize_name("Bob"), "Bob");
        assert_eq!(sanitize_name("|"), "");
    }
}
