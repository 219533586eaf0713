// WebSocket module - Client side of the daemon's websocket protocol
pub mod client;

pub use client::WsClient;
