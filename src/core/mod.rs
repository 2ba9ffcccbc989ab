//! Core module - platform-independent game client logic
//!
//! Everything here is pure or driven through `io_traits`, so it is tested
//! without sockets or wall-clock time.

pub mod announcement;
pub mod constants;
pub mod format;
pub mod io_traits;
pub mod protocol;
pub mod reconciler;
pub mod sequencer;
pub mod session;
pub mod timer;
pub mod view_model;

pub use announcement::{AnnouncementItem, AnnouncementKind};
pub use io_traits::{ConnectionStatus, ServerConnection, ServerEvent};
pub use protocol::{ClientMessage, RoomSnapshot, ServerMessage};
pub use reconciler::{Reconciler, Reconciliation};
pub use sequencer::{Overlay, PresentationPhase, PresentationSequencer};
pub use session::{GameSession, IntentError, SessionEvent};
pub use view_model::TurnView;
