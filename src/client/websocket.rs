//! WebSocket client for the Dice Poker server
//!
//! The socket lives on its own thread and talks to the session through
//! bounded channels. There is no automatic reconnection: a dropped link
//! reports `Disconnected` and waits for the user to create or join again.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{connect, Message, WebSocket};

use crate::core::io_traits::{ConnectionStatus, IntentSender, ServerEvent, ServerEventReceiver};
use crate::core::protocol::{ClientMessage, ServerMessage};

// =============================================================================
// TYPES
// =============================================================================

const CHANNEL_CAPACITY: usize = 128;

/// Outgoing messages (main thread -> WS thread)
#[derive(Debug)]
enum OutgoingMessage {
    Intent(ClientMessage),
    Shutdown,
}

// =============================================================================
// URL HANDLING
// =============================================================================

/// Turn a configured endpoint into a WebSocket URL
///
/// `http(s)://` becomes `ws(s)://` and `/ws` is appended unless the path
/// already ends with it.
pub fn socket_url(base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    if ws_base.ends_with("/ws") {
        ws_base
    } else {
        format!("{}/ws", ws_base)
    }
}

/// Map one text frame to a session event; malformed frames yield `None`
pub fn decode_frame(text: &str) -> Option<ServerEvent> {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(ServerMessage::RoomJoined {
            room_id,
            player_index,
            room,
        }) => Some(ServerEvent::RoomJoined {
            room_id,
            player_index,
            room,
        }),
        Ok(ServerMessage::StateUpdate(payload)) => {
            Some(ServerEvent::StateUpdate(payload.into_snapshot()))
        }
        Ok(ServerMessage::ErrorMessage { message }) => Some(ServerEvent::Error(message)),
        Err(e) => {
            warn!(error = %e, "[WS] Dropping malformed frame");
            None
        }
    }
}

// =============================================================================
// WEBSOCKET CLIENT
// =============================================================================

/// Thread-backed WebSocket client for one game room
pub struct RoomSocketClient {
    url: String,
    tx: Option<Sender<OutgoingMessage>>,
    rx: Option<Receiver<ServerEvent>>,
    thread_handle: Option<JoinHandle<()>>,
    shutdown_flag: Arc<AtomicBool>,
    current_status: ConnectionStatus,
}

impl RoomSocketClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            url: socket_url(base_url),
            tx: None,
            rx: None,
            thread_handle: None,
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            current_status: ConnectionStatus::Disconnected,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Join a finished I/O thread so `connect` can start a new one
    fn reap_finished_thread(&mut self) {
        if self
            .thread_handle
            .as_ref()
            .is_some_and(|handle| handle.is_finished())
        {
            if let Some(handle) = self.thread_handle.take() {
                let _ = handle.join();
            }
        }
    }
}

impl IntentSender for RoomSocketClient {
    fn is_connected(&self) -> bool {
        self.current_status == ConnectionStatus::Connected
    }

    fn status(&self) -> ConnectionStatus {
        self.current_status
    }

    fn connect(&mut self) {
        self.reap_finished_thread();
        if self.thread_handle.is_some() {
            warn!("[WS] Already running");
            return;
        }

        let (outgoing_tx, outgoing_rx) = bounded::<OutgoingMessage>(CHANNEL_CAPACITY);
        let (incoming_tx, incoming_rx) = bounded::<ServerEvent>(CHANNEL_CAPACITY);

        self.tx = Some(outgoing_tx);
        self.rx = Some(incoming_rx);
        // Fresh flag per connection: a detached thread keeps its own
        self.shutdown_flag = Arc::new(AtomicBool::new(false));

        let shutdown_flag = Arc::clone(&self.shutdown_flag);
        let url = self.url.clone();

        let handle = thread::spawn(move || {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                websocket_thread(&url, outgoing_rx, incoming_tx.clone(), shutdown_flag);
            }));

            if let Err(panic_info) = result {
                let msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    format!("WS thread panic: {}", s)
                } else {
                    "WS thread panic".to_string()
                };
                error!("{}", msg);
                let _ = incoming_tx.send(ServerEvent::Error(msg));
                let _ = incoming_tx.send(ServerEvent::StatusChanged(ConnectionStatus::Error));
            }
        });

        self.thread_handle = Some(handle);
        self.current_status = ConnectionStatus::Connecting;
    }

    fn disconnect(&mut self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(OutgoingMessage::Shutdown);
        }
        // A thread still blocked in the handshake is detached; it sees the
        // flag once the connect attempt returns and exits on its own
        if let Some(handle) = self.thread_handle.take() {
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                debug!("[WS] Detaching I/O thread");
            }
        }
        self.tx = None;
        self.rx = None;
        self.current_status = ConnectionStatus::Disconnected;
    }

    fn send(&self, message: ClientMessage) {
        let Some(tx) = &self.tx else {
            warn!(event = message.event_name(), "[WS] Not connected, dropping intent");
            return;
        };
        debug!(event = message.event_name(), "[WS] Queueing intent");
        if let Err(e) = tx.try_send(OutgoingMessage::Intent(message)) {
            warn!("[WS] Failed to queue message: {}", e);
        }
    }
}

impl ServerEventReceiver for RoomSocketClient {
    fn poll_event(&mut self) -> Option<ServerEvent> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(event) => {
                if let ServerEvent::StatusChanged(status) = &event {
                    self.current_status = *status;
                }
                Some(event)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.rx = None;
                self.tx = None;
                // The thread reports its own final status; only cover a silent exit
                match self.current_status {
                    ConnectionStatus::Connecting | ConnectionStatus::Connected => {
                        self.current_status = ConnectionStatus::Disconnected;
                        Some(ServerEvent::StatusChanged(ConnectionStatus::Disconnected))
                    }
                    ConnectionStatus::Disconnected | ConnectionStatus::Error => None,
                }
            }
        }
    }
}

impl Drop for RoomSocketClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

// =============================================================================
// WEBSOCKET THREAD
// =============================================================================

fn websocket_thread(
    url: &str,
    outgoing_rx: Receiver<OutgoingMessage>,
    incoming_tx: Sender<ServerEvent>,
    shutdown_flag: Arc<AtomicBool>,
) {
    info!(url = %url, "[WS] Connecting...");
    let _ = incoming_tx.send(ServerEvent::StatusChanged(ConnectionStatus::Connecting));

    let mut socket = match connect(url) {
        Ok((socket, _)) => socket,
        Err(_) if shutdown_flag.load(Ordering::SeqCst) => {
            debug!("[WS] Connect aborted by disconnect");
            return;
        }
        Err(e) => {
            error!(error = %e, "[WS] Connection failed");
            let _ = incoming_tx.send(ServerEvent::Error(format!("Connect failed: {}", e)));
            let _ = incoming_tx.send(ServerEvent::StatusChanged(ConnectionStatus::Error));
            return;
        }
    };

    if shutdown_flag.load(Ordering::SeqCst) {
        debug!("[WS] Connected after disconnect, closing");
        let _ = socket.close(None);
        return;
    }

    // Intents queued while connecting (create/join) are delivered, not drained
    info!("[WS] Connected");
    let _ = incoming_tx.send(ServerEvent::StatusChanged(ConnectionStatus::Connected));

    let result = message_loop(&mut socket, &outgoing_rx, &incoming_tx, &shutdown_flag);
    let _ = socket.close(None);

    match result {
        Ok(()) => {
            info!("[WS] Closed");
            let _ = incoming_tx.send(ServerEvent::StatusChanged(ConnectionStatus::Disconnected));
        }
        Err(e) => {
            info!(error = %e, "[WS] Disconnected");
            let _ = incoming_tx.send(ServerEvent::Error(e));
            let _ = incoming_tx.send(ServerEvent::StatusChanged(ConnectionStatus::Disconnected));
        }
    }
}

fn send_json(
    socket: &mut WebSocket<MaybeTlsStream<TcpStream>>,
    message: &ClientMessage,
) -> Result<(), String> {
    let json = serde_json::to_string(message).map_err(|e| e.to_string())?;
    socket
        .send(Message::Text(json))
        .map_err(|e| format!("Send: {}", e))
}

fn message_loop(
    socket: &mut WebSocket<MaybeTlsStream<TcpStream>>,
    outgoing_rx: &Receiver<OutgoingMessage>,
    incoming_tx: &Sender<ServerEvent>,
    shutdown_flag: &Arc<AtomicBool>,
) -> Result<(), String> {
    // Set non-blocking
    match socket.get_ref() {
        MaybeTlsStream::Plain(tcp) => {
            let _ = tcp.set_nonblocking(true);
        }
        MaybeTlsStream::NativeTls(tls) => {
            let _ = tls.get_ref().set_nonblocking(true);
        }
        _ => {}
    }

    loop {
        if shutdown_flag.load(Ordering::SeqCst) {
            return Ok(());
        }

        // Handle outgoing
        match outgoing_rx.try_recv() {
            Ok(OutgoingMessage::Intent(message)) => {
                debug!(event = message.event_name(), "[WS] Sending");
                send_json(socket, &message)?;
            }
            Ok(OutgoingMessage::Shutdown) => return Ok(()),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => return Err("Channel disconnected".to_string()),
        }

        // Handle incoming
        match socket.read() {
            Ok(Message::Text(text)) => {
                if let Some(event) = decode_frame(&text) {
                    if incoming_tx.send(event).is_err() {
                        return Ok(());
                    }
                }
            }
            Ok(Message::Close(frame)) => {
                debug!(frame = ?frame, "[WS] Server closed the connection");
                return Ok(());
            }
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(format!("Read error: {}", e)),
            _ => {}
        }

        thread::sleep(Duration::from_millis(10));
    }
}
