//! Newline-delimited frame encoding/decoding
//!
//! Wire format: one UTF-8 line per message, terminated by `\n`.
//! A trailing `\r` is tolerated. Maximum frame size: 4KB (sanity limit)

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::protocol::Message;

/// Maximum allowed frame size (4KB), terminator included
const MAX_FRAME_SIZE: usize = 4 * 1024;

/// Read one line from a stream, without its terminator.
///
/// Returns [`Error::ConnectionClosed`] at end of stream. Bytes that are not
/// valid UTF-8 become U+FFFD, so the line fails to decode and is discarded
/// like any other malformed frame. A line longer than the limit is an
/// error, raised before more than the limit has been buffered.
pub async fn read_frame<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String> {
    let mut buf = Vec::new();

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            if buf.is_empty() {
                return Err(Error::ConnectionClosed);
            }
            // Unterminated tail before EOF
            break;
        }

        let (chunk, done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (&available[..=i], true),
            None => (available, false),
        };

        if buf.len() + chunk.len() > MAX_FRAME_SIZE {
            return Err(Error::Protocol(format!(
                "Frame too large: over {} bytes",
                MAX_FRAME_SIZE
            )));
        }

        buf.extend_from_slice(chunk);
        let used = chunk.len();
        reader.consume(used);

        if done {
            break;
        }
    }

    let line = String::from_utf8_lossy(&buf);
    Ok(line.trim_end_matches(&['\n', '\r'][..]).to_string())
}

/// Write a message as one line and flush it
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, msg: &Message) -> Result<()> {
    let mut line = msg.to_string();
    line.push('\n');

    writer.write_all(line.as_bytes()).await?;

    // Flush to ensure delivery
    writer.flush().await?;

    Ok(())
}
