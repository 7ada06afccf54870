//! TCP host for a two-player match
//!
//! The host listens on a well-known port, accepts a single guest, and holds
//! the authoritative [`MatchState`]. Rounds are resolved here and every
//! result is sent to the guest as a RESULT line.

use std::net::SocketAddr;
use std::sync::Arc;

use rps_core::{MatchState, Move, RoundResult, Side, DEFAULT_TOTAL_ROUNDS, NO_NAME};
use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::discovery::join_address;
use crate::error::{Error, Result};
use crate::events::{EventSink, SessionEvent};
use crate::frame::{read_frame, write_frame};
use crate::protocol::{sanitize_name, Message, ResultLine};
use crate::DEFAULT_PORT;

/// Host settings, fixed for the lifetime of a [`Host`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Port to listen on across all interfaces. `0` picks a free port.
    pub port: u16,
    pub total_rounds: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            total_rounds: DEFAULT_TOTAL_ROUNDS,
        }
    }
}

/// The one accepted guest connection
struct GuestLink {
    conn_id: u64,
    addr: SocketAddr,
    tx: mpsc::UnboundedSender<Message>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl GuestLink {
    /// Queue a message for the writer task
    fn send(&self, msg: Message) -> Result<()> {
        self.tx.send(msg).map_err(|_| Error::ConnectionClosed)
    }

    fn abort(&self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Host state shared across tasks
struct HostState {
    host_name: String,
    match_state: MatchState,
    guest: Option<GuestLink>,
    next_conn_id: u64,
}

impl HostState {
    /// A guest counts once it has introduced itself with HELLO
    fn has_guest(&self) -> bool {
        self.guest.is_some() && self.match_state.guest_name().is_some()
    }

    fn is_current(&self, conn_id: u64) -> bool {
        self.guest.as_ref().is_some_and(|g| g.conn_id == conn_id)
    }

    fn lobby(&self) -> Message {
        Message::Lobby {
            host: self.host_name.clone(),
            guest: self.match_state.guest_name().map(str::to_string),
        }
    }

    fn players_event(&self) -> SessionEvent {
        SessionEvent::Players {
            host: self.host_name.clone(),
            guest: self.match_state.guest_name().map(str::to_string),
        }
    }

    fn send_to_guest(&self, msg: Message) {
        if let Some(guest) = &self.guest {
            if guest.send(msg).is_err() {
                debug!(conn_id = guest.conn_id, "Guest writer gone, message dropped");
            }
        }
    }

    /// Hand a resolved round to the local consumer and to the guest.
    /// Called with the state lock held so results go out in round order.
    fn publish(&self, result: &RoundResult, events: &dyn EventSink) {
        info!(
            round = result.round,
            winner = result.winner.wire_token(),
            host_score = result.host_score,
            guest_score = result.guest_score,
            game_over = result.game_over,
            "Round resolved"
        );

        let line = ResultLine::from(result);
        events.deliver(SessionEvent::RoundResult(line.clone()));
        self.send_to_guest(Message::Result(line));

        if result.game_over {
            events.deliver(SessionEvent::Status("Match over".into()));
        }
    }
}

/// A bound listener and everything spawned for it
struct Running {
    addr: SocketAddr,
    state: Arc<Mutex<HostState>>,
    shutdown_tx: broadcast::Sender<()>,
    accept_task: JoinHandle<()>,
}

impl Running {
    /// Close the listener and the guest connection, waiting until both
    /// sockets are actually released.
    async fn stop(mut self) {
        let _ = self.shutdown_tx.send(());
        let _ = (&mut self.accept_task).await;

        let guest = self.state.lock().await.guest.take();
        if let Some(guest) = guest {
            guest.abort();
            let GuestLink { reader, writer, .. } = guest;
            let _ = reader.await;
            let _ = writer.await;
        }

        info!(addr = %self.addr, "Host stopped");
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        self.accept_task.abort();
        if let Ok(mut state) = self.state.try_lock() {
            if let Some(guest) = state.guest.take() {
                guest.abort();
            }
        }
    }
}

/// Host session handle.
///
/// Construct once and keep it for as long as the host role may be used;
/// [`Host::start_host`] and [`Host::stop_host`] can be called repeatedly.
pub struct Host {
    config: HostConfig,
    events: Arc<dyn EventSink>,
    running: Mutex<Option<Running>>,
}

impl Host {
    pub fn new(config: HostConfig, events: impl EventSink) -> Self {
        Self {
            config,
            events: Arc::new(events),
            running: Mutex::new(None),
        }
    }

    fn status(&self, text: impl Into<String>) {
        self.events.deliver(SessionEvent::Status(text.into()));
    }

    /// Start hosting a new match, replacing any current one.
    ///
    /// Binds the configured port on all interfaces. A bind failure is
    /// reported as a status event and leaves the host not hosting.
    pub async fn start_host(&self, host_name: &str) -> Result<SocketAddr> {
        let mut running = self.running.lock().await;
        if let Some(previous) = running.take() {
            previous.stop().await;
        }

        let host_name = match sanitize_name(host_name) {
            name if name.is_empty() => NO_NAME.to_string(),
            name => name,
        };

        let bind_addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let bound = TcpListener::bind(bind_addr).await.and_then(|listener| {
            let addr = listener.local_addr()?;
            Ok((listener, addr))
        });
        let (listener, addr) = match bound {
            Ok(bound) => bound,
            Err(e) => {
                warn!(addr = %bind_addr, error = %e, "Bind failed");
                self.status(format!("Could not listen on port {}: {}", self.config.port, e));
                return Err(e.into());
            }
        };

        let mut match_state = MatchState::new(self.config.total_rounds);
        match_state.set_host_name(Some(host_name.clone()));

        let state = Arc::new(Mutex::new(HostState {
            host_name,
            match_state,
            guest: None,
            next_conn_id: 1,
        }));

        info!(addr = %addr, total_rounds = self.config.total_rounds, "Host started");
        self.status(format!("Listening on {}", join_address(addr.port())));
        self.events.deliver(state.lock().await.players_event());

        let (shutdown_tx, _) = broadcast::channel(1);
        let accept_task = tokio::spawn(accept_loop(
            listener,
            state.clone(),
            self.events.clone(),
            shutdown_tx.subscribe(),
        ));

        *running = Some(Running {
            addr,
            state,
            shutdown_tx,
            accept_task,
        });

        Ok(addr)
    }

    /// Stop hosting: release the listener and the guest, forget the match.
    /// Does nothing when not hosting.
    pub async fn stop_host(&self) {
        if let Some(running) = self.running.lock().await.take() {
            running.stop().await;
        }
    }

    /// Tell the guest the match starts. Needs a guest that has said HELLO.
    pub async fn start_game(&self) -> Result<()> {
        let running = self.running.lock().await;
        let Some(running) = running.as_ref() else {
            self.status("Not hosting");
            return Err(Error::NotHosting);
        };

        let state = running.state.lock().await;
        let guest = match &state.guest {
            Some(guest) if state.has_guest() => guest,
            _ => {
                self.status("Two players must be connected to start");
                return Err(Error::NoGuest);
            }
        };

        if let Err(e) = guest.send(Message::StartGame) {
            self.status(format!("Could not send START_GAME: {}", e));
            return Err(e);
        }

        info!("Match started");
        self.status("START_GAME sent");
        self.events.deliver(SessionEvent::StartGame);
        Ok(())
    }

    /// Record the host's own move for the current round.
    ///
    /// Rejected with a status event when not hosting, when no guest is
    /// present, after the match is over, or when the host already moved
    /// this round.
    pub async fn submit_host_move(&self, mv: Move) -> Result<()> {
        let running = self.running.lock().await;
        let Some(running) = running.as_ref() else {
            self.status("Not hosting");
            return Err(Error::NotHosting);
        };

        let mut state = running.state.lock().await;
        if !state.has_guest() {
            self.status("No guest yet");
            return Err(Error::NoGuest);
        }

        match state.match_state.submit(Side::Host, mv) {
            Ok(resolved) => {
                self.status(format!("Move registered: {}", mv));
                if let Some(result) = resolved {
                    state.publish(&result, self.events.as_ref());
                }
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "Host move rejected");
                self.status(format!("Move ignored: {}", e));
                Err(e.into())
            }
        }
    }

    pub async fn is_hosting(&self) -> bool {
        self.running.lock().await.is_some()
    }

    pub async fn has_guest(&self) -> bool {
        match self.running.lock().await.as_ref() {
            Some(running) => running.state.lock().await.has_guest(),
            None => false,
        }
    }

    pub async fn guest_name(&self) -> Option<String> {
        match self.running.lock().await.as_ref() {
            Some(running) => running
                .state
                .lock()
                .await
                .match_state
                .guest_name()
                .map(str::to_string),
            None => None,
        }
    }

    /// Copy of the current match state while hosting
    pub async fn match_state(&self) -> Option<MatchState> {
        match self.running.lock().await.as_ref() {
            Some(running) => Some(running.state.lock().await.match_state.clone()),
            None => None,
        }
    }
}

/// Accept guests until shutdown. Only one guest at a time; extra
/// connections are closed straight away.
async fn accept_loop(
    listener: TcpListener,
    state: Arc<Mutex<HostState>>,
    events: Arc<dyn EventSink>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    events.deliver(SessionEvent::Status("Waiting for a guest...".into()));

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        let mut s = state.lock().await;
                        if s.guest.is_some() {
                            warn!(addr = %addr, "Lobby full, refusing connection");
                            continue;
                        }
                        if let Err(e) = stream.set_nodelay(true) {
                            debug!(error = %e, "Could not set TCP_NODELAY");
                        }

                        let conn_id = s.next_conn_id;
                        s.next_conn_id += 1;

                        let (reader, writer) = stream.into_split();
                        let (tx, rx) = mpsc::unbounded_channel();
                        let writer = tokio::spawn(writer_task(writer, rx, events.clone()));
                        let reader = tokio::spawn(read_loop(
                            reader,
                            conn_id,
                            state.clone(),
                            events.clone(),
                        ));

                        s.guest = Some(GuestLink { conn_id, addr, tx, reader, writer });

                        info!(addr = %addr, conn_id, "Guest connected");
                        events.deliver(SessionEvent::Status(
                            "Guest connected, waiting for HELLO...".into(),
                        ));
                        let lobby = s.lobby();
                        s.send_to_guest(lobby);
                    }
                    Err(e) => {
                        error!(error = %e, "Accept failed");
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                debug!("Accept loop shutting down");
                break;
            }
        }
    }
}

/// Writer task - sends queued messages to the guest
async fn writer_task(
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<Message>,
    events: Arc<dyn EventSink>,
) {
    while let Some(msg) = rx.recv().await {
        if let Err(e) = write_frame(&mut writer, &msg).await {
            warn!(error = %e, "Write to guest failed");
            events.deliver(SessionEvent::Status(format!("Send to guest failed: {}", e)));
            break;
        }
    }
}

/// Read loop for one guest connection
async fn read_loop(
    reader: OwnedReadHalf,
    conn_id: u64,
    state: Arc<Mutex<HostState>>,
    events: Arc<dyn EventSink>,
) {
    let mut reader = BufReader::new(reader);

    let reason = loop {
        let line = match read_frame(&mut reader).await {
            Ok(line) => line,
            Err(e) => break e,
        };

        match line.parse::<Message>() {
            Ok(msg) => handle_message(msg, conn_id, &state, events.as_ref()).await,
            Err(e) => {
                debug!(conn_id, line = %line, error = %e, "Discarding frame");
            }
        }
    };

    match reason {
        Error::ConnectionClosed => debug!(conn_id, "Guest closed connection"),
        ref e => warn!(conn_id, error = %e, "Guest read error"),
    }

    let mut s = state.lock().await;
    if !s.is_current(conn_id) {
        return;
    }
    if let Some(guest) = s.guest.take() {
        // Dropping the link ends the writer; this task is finishing anyway
        info!(addr = %guest.addr, conn_id, "Guest left");
    }
    s.match_state.clear_guest();

    events.deliver(SessionEvent::Status(format!("Guest left: {}", reason)));
    events.deliver(s.players_event());
}

/// Handle one decoded message from the guest
async fn handle_message(
    msg: Message,
    conn_id: u64,
    state: &Arc<Mutex<HostState>>,
    events: &dyn EventSink,
) {
    let mut s = state.lock().await;
    if !s.is_current(conn_id) {
        return;
    }

    match msg {
        Message::Hello { name } => {
            let name = sanitize_name(&name);
            if name.is_empty() {
                debug!(conn_id, "Ignoring HELLO without a usable name");
                return;
            }
            info!(conn_id, name = %name, "HELLO received");
            s.match_state.set_guest_name(Some(name.clone()));

            events.deliver(SessionEvent::Status(format!("Guest joined: {}", name)));
            events.deliver(s.players_event());
            let lobby = s.lobby();
            s.send_to_guest(lobby);
        }
        Message::Move(mv) => {
            if !s.has_guest() {
                debug!(conn_id, "Ignoring MOVE before HELLO");
                return;
            }
            match s.match_state.submit(Side::Guest, mv) {
                Ok(resolved) => {
                    events.deliver(SessionEvent::Status("Guest has moved".into()));
                    if let Some(result) = resolved {
                        s.publish(&result, events);
                    }
                }
                Err(e) => {
                    debug!(conn_id, error = %e, "Guest move rejected");
                    events.deliver(SessionEvent::Status(format!("Guest move ignored: {}", e)));
                }
            }
        }
        _ => {
            debug!(conn_id, "Ignoring unexpected message type");
        }
    }
}
