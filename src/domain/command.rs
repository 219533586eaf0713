//! Request types understood by the pin controller and its websocket daemon.

use crate::domain::error::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Line commands accepted by the controller firmware over serial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialCommand {
    /// Query a single pin
    PinStat(u16),
    /// Query every pin as a space-separated list
    PinStatAll,
    /// Switch a pin on
    On(u16),
    /// Switch a pin off
    Off(u16),
}

impl SerialCommand {
    /// Build an `ON`/`OFF` command from a boolean state.
    pub fn switch(channel: u16, on: bool) -> Self {
        if on {
            Self::On(channel)
        } else {
            Self::Off(channel)
        }
    }

    /// Acknowledgement prefix the firmware replies with, if the command has one.
    pub fn expected_ack(&self) -> Option<String> {
        match self {
            Self::On(ch) => Some(format!("turning ON {}", ch)),
            Self::Off(ch) => Some(format!("turning OFF {}", ch)),
            Self::PinStat(_) | Self::PinStatAll => None,
        }
    }

    /// Check a stripped response against the expected acknowledgement.
    pub fn check_ack(&self, response: &str) -> ProbeResult<()> {
        match self.expected_ack() {
            Some(expected) if !response.starts_with(&expected) => Err(ProbeError::Protocol(
                format!("expected '{}', device replied '{}'", expected, response),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SerialCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinStat(ch) => write!(f, "PINSTAT {}", ch),
            Self::PinStatAll => write!(f, "PINSTAT ALL"),
            Self::On(ch) => write!(f, "ON {}", ch),
            Self::Off(ch) => write!(f, "OFF {}", ch),
        }
    }
}

/// Encode a text line for the wire: ASCII only, terminator appended.
pub fn encode_line(text: &str, terminator: &str) -> ProbeResult<Vec<u8>> {
    if !text.is_ascii() {
        return Err(ProbeError::InvalidInput(format!(
            "serial commands must be ASCII: {:?}",
            text
        )));
    }
    let mut line = Vec::with_capacity(text.len() + terminator.len());
    line.extend_from_slice(text.as_bytes());
    line.extend_from_slice(terminator.as_bytes());
    Ok(line)
}

/// JSON commands accepted by the websocket daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum WsCommand {
    Get,
    Set { ch: u16, val: bool },
}

impl WsCommand {
    /// Text frame exactly as the daemon's reference client writes it.
    pub fn to_frame(&self) -> String {
        match self {
            Self::Get => r#"{"cmd": "get"}"#.to_string(),
            Self::Set { ch, val } => {
                format!(r#"{{"cmd": "set", "ch": {}, "val": {}}}"#, ch, val)
            }
        }
    }

    /// Short name used in progress output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set { .. } => "set",
        }
    }
}

/// Frames sent by a bare `ws probe`: read state, then switch channel 2 on.
pub fn default_ws_script() -> Vec<WsCommand> {
    vec![WsCommand::Get, WsCommand::Set { ch: 2, val: true }]
}

/// Command sent by a bare `serial probe`.
pub fn default_serial_command() -> SerialCommand {
    SerialCommand::PinStat(0)
}
