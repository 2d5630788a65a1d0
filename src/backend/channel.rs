//! Realtime channel worker.
//!
//! A dedicated thread owns the websocket. It announces presence on every
//! (re)connect, drains the outbound queue, and forwards every server frame
//! into the app event queue. Reads use a short socket timeout so the loop
//! stays responsive to outbound sends and shutdown.

use std::{
    net::TcpStream,
    sync::{
        atomic::{AtomicU8, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tungstenite::{stream::MaybeTlsStream, Message as WsMessage, WebSocket};

use crate::{
    domain::events::{AppEvent, ClientAction, ConnectionStatus},
    usecases::contracts::{EmitError, OutboundChannel},
};

use super::protocol::{InboundFrame, OutboundFrame};

const READ_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct RealtimeSettings {
    pub socket_url: String,
    pub token: String,
    pub user_id: i64,
    /// Consecutive failed connection attempts before giving up. Resets
    /// after every successful connection.
    pub reconnect_attempts: u32,
    pub reconnect_backoff: Duration,
}

#[derive(Debug)]
pub enum ChannelStartError {
    WorkerSpawn(std::io::Error),
}

impl std::fmt::Display for ChannelStartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WorkerSpawn(source) => write!(f, "worker spawn failed: {source}"),
        }
    }
}

impl std::error::Error for ChannelStartError {}

pub struct RealtimeChannel {
    outbound_tx: Sender<OutboundFrame>,
    status: Arc<AtomicU8>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl RealtimeChannel {
    pub fn start(
        settings: RealtimeSettings,
        events_tx: Sender<AppEvent>,
    ) -> Result<Self, ChannelStartError> {
        let (outbound_tx, outbound_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel();
        let status = Arc::new(AtomicU8::new(encode_status(ConnectionStatus::Connecting)));

        let shared_status = Arc::clone(&status);
        let worker = thread::Builder::new()
            .name("parley-realtime".to_owned())
            .spawn(move || run_worker(settings, events_tx, outbound_rx, stop_rx, shared_status))
            .map_err(ChannelStartError::WorkerSpawn)?;

        Ok(Self {
            outbound_tx,
            status,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }
}

impl OutboundChannel for RealtimeChannel {
    fn status(&self) -> ConnectionStatus {
        decode_status(self.status.load(Ordering::SeqCst))
    }

    fn emit(&self, action: ClientAction) -> Result<(), EmitError> {
        if self.status() != ConnectionStatus::Connected {
            return Err(EmitError::NotConnected);
        }
        self.outbound_tx
            .send(OutboundFrame::from_action(action))
            .map_err(|_| EmitError::Closed)
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            if let Err(error) = worker.join() {
                tracing::warn!(error = ?error, "realtime channel worker panicked on shutdown");
            }
        }
    }
}

fn encode_status(status: ConnectionStatus) -> u8 {
    match status {
        ConnectionStatus::Connecting => 0,
        ConnectionStatus::Connected => 1,
        ConnectionStatus::Disconnected => 2,
        ConnectionStatus::Error => 3,
    }
}

fn decode_status(raw: u8) -> ConnectionStatus {
    match raw {
        0 => ConnectionStatus::Connecting,
        1 => ConnectionStatus::Connected,
        2 => ConnectionStatus::Disconnected,
        _ => ConnectionStatus::Error,
    }
}

struct StatusReporter {
    events_tx: Sender<AppEvent>,
    shared: Arc<AtomicU8>,
}

impl StatusReporter {
    fn set(&self, status: ConnectionStatus) {
        self.shared.store(encode_status(status), Ordering::SeqCst);
        let _ = self.events_tx.send(AppEvent::Connection(status));
    }
}

enum SessionEnd {
    StopRequested,
    ConnectionLost,
}

fn run_worker(
    settings: RealtimeSettings,
    events_tx: Sender<AppEvent>,
    outbound_rx: Receiver<OutboundFrame>,
    stop_rx: Receiver<()>,
    shared_status: Arc<AtomicU8>,
) {
    let reporter = StatusReporter {
        events_tx: events_tx.clone(),
        shared: shared_status,
    };
    let url = format!("{}?token={}", settings.socket_url, settings.token);
    let mut failures: u32 = 0;

    loop {
        reporter.set(ConnectionStatus::Connecting);

        match connect(&url) {
            Ok(mut socket) => {
                failures = 0;
                announce(&mut socket, settings.user_id);
                reporter.set(ConnectionStatus::Connected);

                match run_session(&mut socket, &events_tx, &outbound_rx, &stop_rx) {
                    SessionEnd::StopRequested => {
                        let _ = socket.close(None);
                        return;
                    }
                    SessionEnd::ConnectionLost => {
                        reporter.set(ConnectionStatus::Disconnected);
                    }
                }
            }
            Err(error) => {
                failures += 1;
                tracing::warn!(%error, failures, "realtime connection attempt failed");
                reporter.set(ConnectionStatus::Disconnected);
            }
        }

        if failures >= settings.reconnect_attempts {
            tracing::error!(failures, "realtime reconnect budget exhausted");
            reporter.set(ConnectionStatus::Error);
            let _ = stop_rx.recv();
            return;
        }

        match stop_rx.recv_timeout(settings.reconnect_backoff) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

fn connect(url: &str) -> Result<Socket, tungstenite::Error> {
    let (socket, _response) = tungstenite::connect(url)?;
    if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
        let _ = stream.set_read_timeout(Some(READ_TIMEOUT));
    }
    Ok(socket)
}

fn announce(socket: &mut Socket, user_id: i64) {
    let frame = OutboundFrame::UserOnline { user_id };
    if let Err(error) = send_frame(socket, &frame) {
        tracing::warn!(%error, "presence announcement failed");
    }
}

fn send_frame(socket: &mut Socket, frame: &OutboundFrame) -> Result<(), tungstenite::Error> {
    let text = serde_json::to_string(frame).map_err(|error| {
        tungstenite::Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, error))
    })?;
    socket.send(WsMessage::Text(text))
}

fn run_session(
    socket: &mut Socket,
    events_tx: &Sender<AppEvent>,
    outbound_rx: &Receiver<OutboundFrame>,
    stop_rx: &Receiver<()>,
) -> SessionEnd {
    loop {
        match stop_rx.try_recv() {
            Ok(()) => return SessionEnd::StopRequested,
            Err(TryRecvError::Disconnected) => return SessionEnd::StopRequested,
            Err(TryRecvError::Empty) => {}
        }

        loop {
            match outbound_rx.try_recv() {
                Ok(frame) => {
                    if let Err(error) = send_frame(socket, &frame) {
                        tracing::warn!(%error, "outbound frame failed, reconnecting");
                        return SessionEnd::ConnectionLost;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return SessionEnd::StopRequested,
            }
        }

        match socket.read() {
            Ok(WsMessage::Text(text)) => forward_frame(events_tx, &text),
            Ok(WsMessage::Close(_)) => return SessionEnd::ConnectionLost,
            // Pings are answered by the library on the next write.
            Ok(_) => {}
            Err(tungstenite::Error::Io(error))
                if matches!(
                    error.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) => {}
            Err(error) => {
                tracing::warn!(%error, "realtime read failed, reconnecting");
                return SessionEnd::ConnectionLost;
            }
        }
    }
}

fn forward_frame(events_tx: &Sender<AppEvent>, text: &str) {
    match serde_json::from_str::<InboundFrame>(text) {
        Ok(frame) => {
            let _ = events_tx.send(AppEvent::Server(frame.into_event()));
        }
        Err(error) => {
            // Unknown or malformed frames are skipped, never fatal.
            tracing::warn!(%error, "unrecognized realtime frame skipped");
        }
    }
}
