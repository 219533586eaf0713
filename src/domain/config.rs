use crate::domain::error::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Probe configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Serial probe target
    #[serde(default)]
    pub serial: SerialSettings,
    /// WebSocket probe target
    #[serde(default)]
    pub websocket: WebSocketSettings,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Serial port settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialSettings {
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Bound on a whole line read, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default)]
    pub parity: ParityConfig,
    #[serde(default)]
    pub flow_control: FlowControlConfig,
    /// Appended to every outgoing line
    #[serde(default = "default_write_terminator")]
    pub write_terminator: String,
    /// Byte that ends an incoming line
    #[serde(default = "default_read_terminator")]
    pub read_terminator: char,
}

/// WebSocket endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketSettings {
    #[serde(default = "default_url")]
    pub url: String,
}

/// Parity configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    #[default]
    None,
    Odd,
    Even,
}

/// Flow control configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlConfig {
    #[default]
    None,
    Hardware,
    Software,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> String {
    "/dev/ttyACM0".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

fn default_write_terminator() -> String {
    "\r".to_string()
}

fn default_read_terminator() -> char {
    '\n'
}

fn default_url() -> String {
    "ws://localhost:3001".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: ParityConfig::default(),
            flow_control: FlowControlConfig::default(),
            write_terminator: default_write_terminator(),
            read_terminator: default_read_terminator(),
        }
    }
}

impl Default for WebSocketSettings {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

impl SerialSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The read terminator as a single byte. Only valid after `validate`.
    pub fn read_terminator_byte(&self) -> u8 {
        self.read_terminator as u8
    }

    pub fn validate(&self) -> ProbeResult<()> {
        if self.port.trim().is_empty() {
            return Err(config_error("serial port must not be empty"));
        }
        if self.baud_rate == 0 {
            return Err(config_error("baud rate must be greater than zero"));
        }
        if !(5..=8).contains(&self.data_bits) {
            return Err(config_error(format!("invalid data bits: {}", self.data_bits)));
        }
        if !matches!(self.stop_bits, 1 | 2) {
            return Err(config_error(format!("invalid stop bits: {}", self.stop_bits)));
        }
        if self.timeout_ms == 0 {
            return Err(config_error("serial timeout must be greater than zero"));
        }
        if !self.read_terminator.is_ascii() {
            return Err(config_error(format!(
                "read terminator must be a single ASCII character, got {:?}",
                self.read_terminator
            )));
        }
        if !self.write_terminator.is_ascii() {
            return Err(config_error("write terminator must be ASCII"));
        }
        Ok(())
    }
}

impl WebSocketSettings {
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(config_error(format!(
                "websocket url must start with ws:// or wss://, got {}",
                self.url
            )));
        }
        Ok(())
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> ProbeResult<()> {
        self.serial.validate()?;
        self.websocket.validate()
    }
}

fn config_error(message: impl Into<String>) -> ProbeError {
    ProbeError::Config {
        message: message.into(),
    }
}
