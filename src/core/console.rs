//! Interactive serial console: one line in, buffered reply out.

use crate::domain::command::encode_line;
use crate::domain::error::ProbeResult;
use crate::infrastructure::serial::{SerialClient, SerialLink};
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing::debug;

/// Delay between writing a line and collecting the reply.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(200);
/// Per-chunk wait while draining the reply.
pub const DEFAULT_POLL: Duration = Duration::from_millis(20);

pub const EXIT_COMMAND: &str = "exit";

#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    pub terminator: String,
    pub settle: Duration,
    pub poll: Duration,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            terminator: "\n".to_string(),
            settle: DEFAULT_SETTLE,
            poll: DEFAULT_POLL,
        }
    }
}

/// Run until `exit` or end of input. Returns the number of lines sent.
pub fn run_console<L, R, W>(
    mut client: SerialClient<L>,
    mut input: R,
    mut output: W,
    options: &ConsoleOptions,
) -> ProbeResult<usize>
where
    L: SerialLink,
    R: BufRead,
    W: Write,
{
    let mut sent = 0;
    let mut line = String::new();

    loop {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let command = line.trim_end_matches(['\r', '\n']);
        if command == EXIT_COMMAND {
            break;
        }

        let encoded = match encode_line(command, &options.terminator) {
            Ok(encoded) => encoded,
            Err(e) => {
                writeln!(output, "{}", e)?;
                continue;
            }
        };
        client.write_bytes(&encoded)?;
        sent += 1;
        std::thread::sleep(options.settle);

        let reply = client.read_available(options.poll)?;
        let text = String::from_utf8_lossy(reply.trim_ascii());
        debug!("Console reply: {} bytes", reply.len());

        if text.is_empty() {
            writeln!(output, "(no response)")?;
        } else {
            writeln!(output, "Response: {}", text)?;
        }
    }

    client.close();
    Ok(sent)
}
