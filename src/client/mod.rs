//! Client module - everything that touches the outside world
//!
//! This module contains:
//! - Configuration loading
//! - Logging setup
//! - WebSocket client for the game server
//! - Legacy REST client
//! - Terminal front-end and application loop

pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod terminal;
pub mod websocket;

pub use app::App;
pub use config::Config;
pub use websocket::RoomSocketClient;
