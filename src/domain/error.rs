use thiserror::Error;

/// Exit code for a clean run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for any failure that is not a serial connection failure.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when the serial port cannot be opened or configured.
pub const EXIT_SERIAL_CONNECTION: i32 = 2;

/// Unified probe error type
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid data format: {0}")]
    InvalidData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Communication error: {message}")]
    Communication { message: String },

    #[error("Output error: {0}")]
    Output(String),
}

impl ProbeError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProbeError::Serial(_) => EXIT_SERIAL_CONNECTION,
            _ => EXIT_FAILURE,
        }
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;
