use crate::cli::args::{
    Args, Command, ConfigCommand, DataFormat, SerialArgs, SerialCommand, WsArgs, WsCommand,
};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::console::{run_console, ConsoleOptions};
use crate::core::probe::{self, OutboundFrame};
use crate::domain::command::{self, encode_line, SerialCommand as LineCommand};
use crate::domain::config::{ProbeConfig, SerialSettings, WebSocketSettings};
use crate::domain::error::{ProbeError, ProbeResult};
use crate::domain::pins::{PinGrid, DEFAULT_COLS, DEFAULT_ROWS};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::serial::SerialClient;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Execute CLI command
pub async fn execute_command(args: Args) -> ProbeResult<()> {
    let writer = ConsoleWriter::new(args.output);

    if let Command::Version = args.command {
        writer.write_message(&format!("mtdprobe {}", env!("CARGO_PKG_VERSION")))?;
        return Ok(());
    }

    let config_manager = ConfigManager::new();
    let config_path = match &args.config {
        Some(path) => Some(PathBuf::from(path)),
        None => config_manager.active_config_path().cloned(),
    };
    let loaded = match &config_path {
        Some(path) => config_manager.load_config_from_path(path),
        None => Ok(ProbeConfig::default()),
    };

    // Start logging before reporting on the configuration, falling back to
    // the default level when the file itself is broken.
    if !args.quiet {
        let log_level = match &loaded {
            Ok(config) => config.global.log_level.clone(),
            Err(_) => ProbeConfig::default().global.log_level,
        };
        if let Err(e) = init_logging(&log_level, args.verbose) {
            debug!("Logging already initialized: {}", e);
        }
    }

    let config = loaded?;
    match &config_path {
        Some(path) => debug!("Configuration loaded from {}", path.display()),
        None => debug!("No configuration file found, using defaults"),
    }

    match args.command {
        Command::Serial(serial_args) => execute_serial_command(serial_args, &writer, &config).await,
        Command::Ws(ws_args) => execute_ws_command(ws_args, &writer, &config).await,
        Command::Config(config_args) => {
            execute_config_command(config_args.command, &writer, &config, &config_manager)
        }
        Command::Version => Ok(()),
    }
}

/// Apply command-line overrides on top of the configured serial settings.
pub fn serial_settings(args: &SerialArgs, config: &SerialSettings) -> ProbeResult<SerialSettings> {
    let mut settings = config.clone();
    if let Some(port) = &args.port {
        settings.port = port.clone();
    }
    if let Some(baud) = args.baud {
        settings.baud_rate = baud;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }
    settings.validate()?;
    Ok(settings)
}

/// Apply the command-line URL on top of the configured websocket settings.
pub fn ws_settings(args: &WsArgs, config: &WebSocketSettings) -> ProbeResult<WebSocketSettings> {
    let settings = WebSocketSettings {
        url: args.url.clone().unwrap_or_else(|| config.url.clone()),
    };
    settings.validate()?;
    Ok(settings)
}

async fn execute_serial_command(
    args: SerialArgs,
    writer: &ConsoleWriter,
    config: &ProbeConfig,
) -> ProbeResult<()> {
    let settings = serial_settings(&args, &config.serial)?;
    let terminator = settings.write_terminator.clone();

    match args.command {
        SerialCommand::Probe { data, encoding } => {
            let line = match data {
                Some(data) => parse_data(&data, encoding, &terminator)?,
                None => encode_line(&command::default_serial_command().to_string(), &terminator)?,
            };
            let exchange = run_blocking(move || {
                let client = SerialClient::open(&settings)?;
                probe::serial::probe(client, &line)
            })
            .await?;
            writer.write_serial_exchange(&exchange)?;
            Ok(())
        }
        SerialCommand::Pins => {
            let (exchange, grid) = run_blocking(move || {
                let client = SerialClient::open(&settings)?;
                probe::serial::read_pins(client, &terminator, DEFAULT_ROWS, DEFAULT_COLS)
            })
            .await?;
            debug!("PINSTAT ALL answered in {} ms", exchange.elapsed_ms);
            writer.write_pins(&grid)?;
            Ok(())
        }
        SerialCommand::Set { channel, state } => {
            let line_command = LineCommand::switch(channel, state.into());
            let exchange = run_blocking(move || {
                let client = SerialClient::open(&settings)?;
                probe::serial::switch_pin(client, line_command, &terminator)
            })
            .await?;
            writer.write_serial_exchange(&exchange)?;
            Ok(())
        }
        SerialCommand::Console => {
            let options = ConsoleOptions {
                terminator,
                ..ConsoleOptions::default()
            };
            let sent = run_blocking(move || {
                let client = SerialClient::open(&settings)?;
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                run_console(client, stdin.lock(), stdout.lock(), &options)
            })
            .await?;
            debug!("Console finished after {} lines", sent);
            Ok(())
        }
        SerialCommand::List => {
            let ports = serialport::available_ports().map_err(port_listing_error)?;
            writer.write_ports(&ports)?;
            Ok(())
        }
    }
}

async fn execute_ws_command(args: WsArgs, writer: &ConsoleWriter, config: &ProbeConfig) -> ProbeResult<()> {
    let settings = ws_settings(&args, &config.websocket)?;

    let (frames, want_grid) = match args.command {
        WsCommand::Probe { frames, grid } => (outbound_frames(frames), grid),
        WsCommand::Get { grid } => (vec![command::WsCommand::Get.into()], grid),
        WsCommand::Set {
            channel,
            state,
            grid,
        } => (
            vec![command::WsCommand::Set {
                ch: channel,
                val: state.into(),
            }
            .into()],
            grid,
        ),
    };

    let exchange = probe::websocket::probe(&settings.url, &frames, |event| {
        if let Err(e) = writer.write_ws_event(&event) {
            warn!("Failed to print progress: {}", e);
        }
    })
    .await?;

    let grid = if want_grid {
        Some(PinGrid::from_json(&exchange.received)?)
    } else {
        None
    };
    writer.write_ws_exchange(&exchange, grid.as_ref())?;
    Ok(())
}

fn execute_config_command(
    config_command: ConfigCommand,
    writer: &ConsoleWriter,
    config: &ProbeConfig,
    config_manager: &ConfigManager,
) -> ProbeResult<()> {
    match config_command {
        ConfigCommand::Show => {
            writer.write_config(config)?;
            Ok(())
        }
        ConfigCommand::Init { file, global } => {
            let path = match (file, global) {
                (Some(file), _) => PathBuf::from(file),
                (None, true) => config_manager
                    .get_global_config_path_ref()
                    .cloned()
                    .ok_or_else(|| ProbeError::Config {
                        message: "Could not determine home directory".to_string(),
                    })?,
                (None, false) => ConfigManager::project_config_path_in(&std::env::current_dir()?),
            };
            config_manager.init_config(&path)?;
            writer.write_message(&format!("Configuration written to {}", path.display()))?;
            Ok(())
        }
    }
}

/// Frames for `ws probe`: the default get/set pair unless overridden.
pub fn outbound_frames(frames: Vec<String>) -> Vec<OutboundFrame> {
    if frames.is_empty() {
        command::default_ws_script()
            .into_iter()
            .map(OutboundFrame::from)
            .collect()
    } else {
        frames.into_iter().map(OutboundFrame::from_text).collect()
    }
}

/// Turn command-line data into wire bytes. Text gets the line terminator;
/// hex and base64 are sent exactly as decoded.
pub fn parse_data(data: &str, format: DataFormat, terminator: &str) -> ProbeResult<Vec<u8>> {
    match format {
        DataFormat::Text => encode_line(data, terminator),
        DataFormat::Hex => {
            let cleaned = data.replace([' ', '\n'], "");
            hex::decode(&cleaned)
                .map_err(|e| ProbeError::InvalidInput(format!("Invalid hex data: {}", e)))
        }
        DataFormat::Base64 => {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(data)
                .map_err(|e| ProbeError::InvalidInput(format!("Invalid base64 data: {}", e)))
        }
    }
}

/// Enumeration failures are not open failures and keep the generic exit code.
fn port_listing_error(err: serialport::Error) -> ProbeError {
    ProbeError::Communication {
        message: format!("Failed to list serial ports: {}", err),
    }
}

/// Serial I/O blocks; keep it off the async workers.
async fn run_blocking<T, F>(task: F) -> ProbeResult<T>
where
    F: FnOnce() -> ProbeResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ProbeError::Communication {
            message: format!("Serial task failed: {}", e),
        })?
}
