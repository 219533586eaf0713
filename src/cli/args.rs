use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Command line arguments for mtdprobe
#[derive(Parser, Debug)]
#[command(
    name = "mtdprobe",
    version = env!("CARGO_PKG_VERSION"),
    about = "Serial and WebSocket probe for the switching-matrix pin controller",
    long_about = "Sends fixed requests to a pin controller over serial, or to its websocket daemon, and prints the raw reply for manual inspection."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serial probe commands
    Serial(SerialArgs),
    /// WebSocket probe commands
    Ws(WsArgs),
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Serial probe arguments. Unset options come from the configuration.
#[derive(ClapArgs, Debug)]
pub struct SerialArgs {
    /// Serial port path
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Read timeout in milliseconds
    #[arg(short, long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Serial subcommand
    #[command(subcommand)]
    pub command: SerialCommand,
}

/// WebSocket probe arguments
#[derive(ClapArgs, Debug)]
pub struct WsArgs {
    /// Daemon URL
    #[arg(short, long)]
    pub url: Option<String>,

    /// WebSocket subcommand
    #[command(subcommand)]
    pub command: WsCommand,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Serial subcommands
#[derive(Subcommand, Debug)]
pub enum SerialCommand {
    /// Send one line and print the reply
    Probe {
        /// Data to send (defaults to "PINSTAT 0")
        data: Option<String>,
        /// Data encoding
        #[arg(short, long, value_enum, default_value = "text")]
        encoding: DataFormat,
    },
    /// Read every pin state with PINSTAT ALL
    Pins,
    /// Switch a pin and check the acknowledgement
    Set {
        /// Pin channel
        channel: u16,
        /// Target state
        #[arg(value_enum)]
        state: PinState,
    },
    /// Interactive line console
    Console,
    /// List available serial ports
    List,
}

/// WebSocket subcommands
#[derive(Subcommand, Debug)]
pub enum WsCommand {
    /// Send the get and set frames and print one reply
    Probe {
        /// Raw text frame to send instead of the default pair (repeatable)
        #[arg(long = "frame")]
        frames: Vec<String>,
        /// Render the reply as a pin grid
        #[arg(long)]
        grid: bool,
    },
    /// Request the pin state
    Get {
        /// Render the reply as a pin grid
        #[arg(long)]
        grid: bool,
    },
    /// Switch a pin through the daemon
    Set {
        /// Pin channel
        channel: u16,
        /// Target state
        #[arg(value_enum)]
        state: PinState,
        /// Render the reply as a pin grid
        #[arg(long)]
        grid: bool,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Target file path
        #[arg(short, long)]
        file: Option<String>,
        /// Write the global configuration instead of a project one
        #[arg(short, long)]
        global: bool,
    },
}

/// Data format argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataFormat {
    #[default]
    Text,
    Hex,
    Base64,
}

/// Pin state argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    On,
    Off,
}

impl From<PinState> for bool {
    fn from(state: PinState) -> Self {
        matches!(state, PinState::On)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Text => write!(f, "text"),
            DataFormat::Hex => write!(f, "hex"),
            DataFormat::Base64 => write!(f, "base64"),
        }
    }
}
