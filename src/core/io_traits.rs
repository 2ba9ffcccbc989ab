//! I/O traits for game session operations
//!
//! These traits abstract the duplex channel and the clock, enabling session
//! tests with mock implementations and no socket.

use std::time::Instant;

use crate::core::protocol::{ClientMessage, RoomSnapshot};

// =============================================================================
// CONNECTION STATUS
// =============================================================================

/// Connection status of the duplex channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Not connected to server
    Disconnected,
    /// Attempting to connect
    Connecting,
    /// Channel open
    Connected,
    /// Connection failed or dropped with an error
    Error,
}

// =============================================================================
// SERVER EVENTS
// =============================================================================

/// Typed events received from the server
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Connection status changed
    StatusChanged(ConnectionStatus),
    /// We were seated in a room
    RoomJoined {
        room_id: String,
        player_index: usize,
        room: RoomSnapshot,
    },
    /// New authoritative snapshot
    StateUpdate(RoomSnapshot),
    /// Server or transport error message
    Error(String),
}

// =============================================================================
// I/O TRAITS
// =============================================================================

/// Outbound side of the channel
pub trait IntentSender {
    /// Check if the channel is open
    fn is_connected(&self) -> bool;

    /// Get current connection status
    fn status(&self) -> ConnectionStatus;

    /// Open the channel if it is not already open or opening
    fn connect(&mut self);

    /// Release the channel
    fn disconnect(&mut self);

    /// Emit an intent (fire-and-forget)
    fn send(&self, message: ClientMessage);
}

/// Inbound side of the channel
pub trait ServerEventReceiver {
    /// Poll for the next server event (non-blocking)
    ///
    /// Returns `Some(event)` if an event is available, `None` otherwise.
    fn poll_event(&mut self) -> Option<ServerEvent>;
}

/// Combined trait for full server communication
///
/// This is automatically implemented for any type that implements
/// both `IntentSender` and `ServerEventReceiver`.
pub trait ServerConnection: IntentSender + ServerEventReceiver {}
impl<T: IntentSender + ServerEventReceiver> ServerConnection for T {}

/// Time source for the presentation timers
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// =============================================================================
// MOCK IMPLEMENTATIONS FOR TESTING
// =============================================================================

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    /// Mock server connection for testing
    ///
    /// This mock allows tests to:
    /// - Track which intents were sent
    /// - Queue server events to be returned by `poll_event()`
    /// - Control connection status
    pub struct MockServerConnection {
        /// Whether the mock is "connected"
        pub connected: RefCell<bool>,
        /// Number of `connect()` calls
        pub connect_calls: Cell<usize>,
        /// Number of `disconnect()` calls
        pub disconnect_calls: Cell<usize>,
        /// Intents that were sent
        pub sent: RefCell<Vec<ClientMessage>>,
        /// Events to return from poll_event()
        pub pending_events: RefCell<Vec<ServerEvent>>,
    }

    impl MockServerConnection {
        /// Create a new connected mock server
        pub fn new() -> Self {
            Self {
                connected: RefCell::new(true),
                connect_calls: Cell::new(0),
                disconnect_calls: Cell::new(0),
                sent: RefCell::new(Vec::new()),
                pending_events: RefCell::new(Vec::new()),
            }
        }

        /// Create a disconnected mock server
        pub fn disconnected() -> Self {
            let mock = Self::new();
            *mock.connected.borrow_mut() = false;
            mock
        }

        /// Queue a server event to be returned by poll_event()
        pub fn queue_event(&self, event: ServerEvent) {
            self.pending_events.borrow_mut().push(event);
        }

        /// Queue a state update
        pub fn queue_snapshot(&self, room: RoomSnapshot) {
            self.queue_event(ServerEvent::StateUpdate(room));
        }

        /// Queue a room-joined event
        pub fn queue_joined(&self, room_id: &str, player_index: usize, room: RoomSnapshot) {
            self.queue_event(ServerEvent::RoomJoined {
                room_id: room_id.to_string(),
                player_index,
                room,
            });
        }

        /// Get the number of intents sent
        pub fn sent_count(&self) -> usize {
            self.sent.borrow().len()
        }

        /// Get the last intent sent, if any
        pub fn last_sent(&self) -> Option<ClientMessage> {
            self.sent.borrow().last().cloned()
        }
    }

    impl Default for MockServerConnection {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IntentSender for MockServerConnection {
        fn is_connected(&self) -> bool {
            *self.connected.borrow()
        }

        fn status(&self) -> ConnectionStatus {
            if *self.connected.borrow() {
                ConnectionStatus::Connected
            } else {
                ConnectionStatus::Disconnected
            }
        }

        fn connect(&mut self) {
            self.connect_calls.set(self.connect_calls.get() + 1);
            *self.connected.borrow_mut() = true;
        }

        fn disconnect(&mut self) {
            self.disconnect_calls.set(self.disconnect_calls.get() + 1);
            *self.connected.borrow_mut() = false;
        }

        fn send(&self, message: ClientMessage) {
            self.sent.borrow_mut().push(message);
        }
    }

    impl ServerEventReceiver for MockServerConnection {
        fn poll_event(&mut self) -> Option<ServerEvent> {
            let mut events = self.pending_events.borrow_mut();
            if events.is_empty() {
                None
            } else {
                Some(events.remove(0))
            }
        }
    }

    /// Manually advanced clock
    pub struct MockClock {
        now: Cell<Instant>,
    }

    impl MockClock {
        pub fn new() -> Self {
            Self {
                now: Cell::new(Instant::now()),
            }
        }

        pub fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by);
        }

        pub fn advance_ms(&self, ms: u64) {
            self.advance(Duration::from_millis(ms));
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            self.now.get()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
