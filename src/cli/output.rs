use crate::cli::args::OutputFormat;
use crate::core::probe::{SerialExchange, WsEvent, WsExchange};
use crate::domain::config::ProbeConfig;
use crate::domain::pins::PinGrid;
use std::io;

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_serial_exchange(&self, exchange: &SerialExchange) -> Result<(), OutputError>;
    fn write_pins(&self, grid: &PinGrid) -> Result<(), OutputError>;
    fn write_ws_event(&self, event: &WsEvent<'_>) -> Result<(), OutputError>;
    fn write_ws_exchange(&self, exchange: &WsExchange, grid: Option<&PinGrid>) -> Result<(), OutputError>;
    fn write_ports(&self, ports: &[serialport::SerialPortInfo]) -> Result<(), OutputError>;
    fn write_config(&self, config: &ProbeConfig) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::ProbeError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

/// Text-mode line for a serial reply. Two spaces after the colon, as the
/// bench scripts print it.
pub fn serial_exchange_line(exchange: &SerialExchange) -> String {
    format!("Res:  {}", exchange.response)
}

/// Text-mode progress line for a websocket event.
pub fn ws_event_line(event: &WsEvent<'_>) -> String {
    match event {
        WsEvent::Connected { .. } => "Connected to server".to_string(),
        WsEvent::Sent { frame } => format!("Sent: {}", frame.label),
        WsEvent::Received { text } => format!("Received: {}", text),
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_serial_exchange(&self, exchange: &SerialExchange) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                println!("{}", serial_exchange_line(exchange));
            }
            OutputFormat::Json => {
                let mut value = serde_json::to_value(exchange)?;
                value["raw_hex"] = serde_json::Value::String(hex::encode(&exchange.raw));
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
        }
        Ok(())
    }

    fn write_pins(&self, grid: &PinGrid) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                print!("{}", grid.render());
                println!("{} of {} pins on", grid.count_on(), grid.total());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(grid)?);
            }
        }
        Ok(())
    }

    fn write_ws_event(&self, event: &WsEvent<'_>) -> Result<(), OutputError> {
        // JSON mode reports the whole exchange once it completes.
        if self.format != OutputFormat::Text {
            return Ok(());
        }
        println!("{}", ws_event_line(event));
        Ok(())
    }

    fn write_ws_exchange(&self, exchange: &WsExchange, grid: Option<&PinGrid>) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                if let Some(grid) = grid {
                    self.write_pins(grid)?;
                }
            }
            OutputFormat::Json => {
                let mut value = serde_json::to_value(exchange)?;
                if let Some(grid) = grid {
                    value["grid"] = serde_json::to_value(grid)?;
                }
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
        }
        Ok(())
    }

    fn write_ports(&self, ports: &[serialport::SerialPortInfo]) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                println!("Available serial ports:");
                for port in ports {
                    println!("  {} ({})", port.port_name, describe_port_type(&port.port_type));
                }
            }
            OutputFormat::Json => {
                let list: Vec<serde_json::Value> = ports
                    .iter()
                    .map(|port| {
                        serde_json::json!({
                            "port": port.port_name,
                            "type": describe_port_type(&port.port_type),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&list)?);
            }
        }
        Ok(())
    }

    fn write_config(&self, config: &ProbeConfig) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                print!("{}", toml::to_string_pretty(config)?);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(config)?);
            }
        }
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "message": message,
                    "level": "info"
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                println!("{}", message);
            }
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "error": error,
                    "level": "error"
                });
                eprintln!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                eprintln!("Error: {}", error);
            }
        }
        Ok(())
    }
}

/// Short human-readable port type.
pub fn describe_port_type(port_type: &serialport::SerialPortType) -> String {
    match port_type {
        serialport::SerialPortType::UsbPort(usb) => {
            let product = usb.product.as_deref().unwrap_or("USB");
            format!("{} {:04x}:{:04x}", product, usb.vid, usb.pid)
        }
        serialport::SerialPortType::PciPort => "PCI".to_string(),
        serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        serialport::SerialPortType::Unknown => "unknown".to_string(),
    }
}
