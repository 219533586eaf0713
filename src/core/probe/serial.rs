use crate::domain::command::{encode_line, SerialCommand};
use crate::domain::error::{ProbeError, ProbeResult};
use crate::domain::pins::PinGrid;
use crate::infrastructure::serial::{SerialClient, SerialLink};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

/// Outcome of one write/read round trip.
#[derive(Debug, Clone, Serialize)]
pub struct SerialExchange {
    pub port: String,
    /// Request as sent, terminator included
    pub request: String,
    #[serde(skip)]
    pub raw: Vec<u8>,
    /// Reply with surrounding whitespace stripped
    pub response: String,
    pub timed_out: bool,
    pub elapsed_ms: u64,
}

/// Write one line, read one reply, release the port.
///
/// The client is consumed, so the device is released on every path,
/// including early error returns.
pub fn probe<L: SerialLink>(mut client: SerialClient<L>, line: &[u8]) -> ProbeResult<SerialExchange> {
    let exchange = round_trip(&mut client, line)?;
    client.close();
    Ok(exchange)
}

/// Send an `ON`/`OFF` command and require the firmware acknowledgement.
pub fn switch_pin<L: SerialLink>(
    client: SerialClient<L>,
    command: SerialCommand,
    terminator: &str,
) -> ProbeResult<SerialExchange> {
    let line = encode_line(&command.to_string(), terminator)?;
    let exchange = probe(client, &line)?;
    command.check_ack(&exchange.response)?;
    info!("Device acknowledged '{}'", command);
    Ok(exchange)
}

/// Ask for every pin state and parse the reply into a grid.
pub fn read_pins<L: SerialLink>(
    client: SerialClient<L>,
    terminator: &str,
    rows: u16,
    cols: u16,
) -> ProbeResult<(SerialExchange, PinGrid)> {
    let line = encode_line(&SerialCommand::PinStatAll.to_string(), terminator)?;
    let exchange = probe(client, &line)?;
    let grid = PinGrid::from_pinstat(&exchange.response, rows, cols)?;
    Ok((exchange, grid))
}

fn round_trip<L: SerialLink>(client: &mut SerialClient<L>, line: &[u8]) -> ProbeResult<SerialExchange> {
    let started = Instant::now();
    client.write_bytes(line)?;
    let read = client.read_line()?;
    let response = decode_response(&read.bytes)?;

    Ok(SerialExchange {
        port: client.name().to_string(),
        request: String::from_utf8_lossy(line).into_owned(),
        raw: read.bytes,
        response,
        timed_out: read.timed_out,
        elapsed_ms: elapsed_ms(started.elapsed()),
    })
}

/// Strip whitespace and line terminators from both ends, then decode.
pub fn decode_response(raw: &[u8]) -> ProbeResult<String> {
    let trimmed = raw.trim_ascii();
    String::from_utf8(trimmed.to_vec())
        .map_err(|e| ProbeError::InvalidData(format!("response is not valid UTF-8: {}", e)))
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
