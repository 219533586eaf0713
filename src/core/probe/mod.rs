// Probe module - Single-shot request/response probes
pub mod serial;
pub mod websocket;

pub use serial::SerialExchange;
pub use websocket::{OutboundFrame, WsEvent, WsExchange};
