//! TCP guest for joining a hosted match

use std::net::SocketAddr;
use std::sync::Arc;

use rps_core::Move;
use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::events::{EventSink, SessionEvent};
use crate::frame::{read_frame, write_frame};
use crate::protocol::{sanitize_name, Message};
use crate::DEFAULT_PORT;

/// Guest settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestConfig {
    /// Port used when the host address carries none
    pub port: u16,
}

impl Default for GuestConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Live connection to the host
struct Connection {
    addr: SocketAddr,
    name: String,
    tx: mpsc::UnboundedSender<Message>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Connection {
    fn is_alive(&self) -> bool {
        !self.reader.is_finished()
    }

    async fn close(self) {
        self.reader.abort();
        self.writer.abort();
        let _ = self.reader.await;
        let _ = self.writer.await;
        info!(addr = %self.addr, "Disconnected from host");
    }
}

/// Guest session handle
pub struct Guest {
    config: GuestConfig,
    events: Arc<dyn EventSink>,
    conn: Mutex<Option<Connection>>,
}

impl Guest {
    pub fn new(config: GuestConfig, events: impl EventSink) -> Self {
        Self {
            config,
            events: Arc::new(events),
            conn: Mutex::new(None),
        }
    }

    fn status(&self, text: impl Into<String>) {
        self.events.deliver(SessionEvent::Status(text.into()));
    }

    /// Connect to a host and introduce ourselves with HELLO.
    ///
    /// `host` is either `ip:port` (as shown by the host) or a bare address,
    /// in which case the configured port is used. Any previous connection is
    /// closed first. On failure nothing stays open and a status event says
    /// why. Other calls on the session do not wait for a pending dial.
    pub async fn connect(&self, host: &str, name: &str) -> Result<SocketAddr> {
        self.disconnect().await;

        let host = host.trim();
        let name = sanitize_name(name);
        info!(host = %host, name = %name, "Connecting to host");

        let dialed = match host.parse::<SocketAddr>() {
            Ok(addr) => TcpStream::connect(addr).await,
            Err(_) => TcpStream::connect((host, self.config.port)).await,
        };
        let connected = dialed.and_then(|stream| {
            let addr = stream.peer_addr()?;
            Ok((stream, addr))
        });
        let (stream, addr) = match connected {
            Ok(connected) => connected,
            Err(e) => {
                warn!(host = %host, error = %e, "Connect failed");
                self.status(format!("Could not connect to {}: {}", host, e));
                return Err(e.into());
            }
        };
        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "Could not set TCP_NODELAY");
        }

        let (reader, mut writer) = stream.into_split();

        // HELLO goes out before anything else
        let hello = Message::Hello { name: name.clone() };
        if let Err(e) = write_frame(&mut writer, &hello).await {
            warn!(addr = %addr, error = %e, "HELLO failed");
            self.status(format!("Could not connect to {}: {}", host, e));
            return Err(e);
        }

        self.status(format!("Connected to {}", addr));

        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(writer_task(writer, rx, self.events.clone()));
        let reader = tokio::spawn(read_loop(
            reader,
            name.clone(),
            self.events.clone(),
            writer.abort_handle(),
        ));

        let fresh = Connection {
            addr,
            name,
            tx,
            reader,
            writer,
        };
        // A concurrent connect may have finished first; the later one wins
        let replaced = self.conn.lock().await.replace(fresh);
        if let Some(previous) = replaced {
            previous.close().await;
        }

        Ok(addr)
    }

    /// Close the connection. Does nothing when not connected.
    pub async fn disconnect(&self) {
        if let Some(conn) = self.conn.lock().await.take() {
            conn.close().await;
        }
    }

    /// Send this round's move. The host decides whether it counts.
    pub async fn submit_move(&self, mv: Move) -> Result<()> {
        let conn = self.conn.lock().await;
        let sent = match conn.as_ref() {
            Some(c) if c.is_alive() => c.tx.send(Message::Move(mv)).is_ok(),
            _ => false,
        };
        if !sent {
            self.status("Not connected");
            return Err(Error::NotConnected);
        }
        debug!(mv = %mv, "Move sent");
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.as_ref().is_some_and(Connection::is_alive)
    }

    /// Name sent in HELLO on the current connection
    pub async fn name(&self) -> Option<String> {
        self.conn.lock().await.as_ref().map(|c| c.name.clone())
    }
}

/// Writer task - sends queued messages to the host
async fn writer_task(
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<Message>,
    events: Arc<dyn EventSink>,
) {
    while let Some(msg) = rx.recv().await {
        if let Err(e) = write_frame(&mut writer, &msg).await {
            warn!(error = %e, "Write to host failed");
            events.deliver(SessionEvent::Status(format!("Send to host failed: {}", e)));
            break;
        }
    }
}

/// Read loop - turns host messages into events until the connection ends
async fn read_loop(
    reader: OwnedReadHalf,
    my_name: String,
    events: Arc<dyn EventSink>,
    writer: AbortHandle,
) {
    let mut reader = BufReader::new(reader);

    let reason = loop {
        let line = match read_frame(&mut reader).await {
            Ok(line) => line,
            Err(e) => break e,
        };

        match line.parse::<Message>() {
            Ok(msg) => handle_host_message(msg, &my_name, events.as_ref()),
            Err(e) => {
                debug!(line = %line, error = %e, "Discarding frame");
            }
        }
    };

    match reason {
        Error::ConnectionClosed => debug!("Host closed connection"),
        ref e => warn!(error = %e, "Host read error"),
    }

    // Drop our half of the socket too
    writer.abort();
    events.deliver(SessionEvent::Status(format!("Disconnected: {}", reason)));
}

/// Handle a message from the host
fn handle_host_message(msg: Message, my_name: &str, events: &dyn EventSink) {
    match msg {
        Message::StartGame => {
            info!("Match started by host");
            events.deliver(SessionEvent::StartGame);
        }
        Message::Lobby { host, guest } => {
            // Until the host has recorded our HELLO, show our own name
            let guest = guest.or_else(|| Some(my_name.to_string()));
            events.deliver(SessionEvent::Players { host, guest });
        }
        Message::Result(line) => {
            debug!(line = %line, "Result received");
            events.deliver(SessionEvent::RoundResult(line));
        }
        _ => {
            debug!("Ignoring unexpected message");
        }
    }
}
