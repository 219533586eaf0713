//! mtdprobe library
//!
//! Single-shot probes for the switching-matrix pin controller: a blocking
//! serial line probe and a websocket probe for the controller's daemon.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::probe::{SerialExchange, WsExchange};
pub use crate::domain::config::ProbeConfig;
pub use crate::domain::error::{ProbeError, ProbeResult};
pub use crate::domain::pins::PinGrid;
