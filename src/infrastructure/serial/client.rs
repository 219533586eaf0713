use crate::domain::config::{FlowControlConfig, ParityConfig, SerialSettings};
use crate::domain::error::{ProbeError, ProbeResult};
use crate::infrastructure::serial::link::SerialLink;
use std::io::ErrorKind;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Bytes collected by a single line read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRead {
    pub bytes: Vec<u8>,
    /// The deadline passed before the terminator arrived
    pub timed_out: bool,
}

/// Blocking line-oriented client over a serial link.
///
/// The client owns the link; dropping the client releases the device.
pub struct SerialClient<L: SerialLink = Box<dyn serialport::SerialPort>> {
    link: L,
    name: String,
    timeout: Duration,
    read_terminator: u8,
}

impl SerialClient {
    /// Open the port described by `settings`.
    pub fn open(settings: &SerialSettings) -> ProbeResult<Self> {
        settings.validate()?;

        let builder = serialport::new(&settings.port, settings.baud_rate)
            .data_bits(match settings.data_bits {
                5 => serialport::DataBits::Five,
                6 => serialport::DataBits::Six,
                7 => serialport::DataBits::Seven,
                _ => serialport::DataBits::Eight,
            })
            .stop_bits(match settings.stop_bits {
                2 => serialport::StopBits::Two,
                _ => serialport::StopBits::One,
            })
            .parity(match settings.parity {
                ParityConfig::None => serialport::Parity::None,
                ParityConfig::Even => serialport::Parity::Even,
                ParityConfig::Odd => serialport::Parity::Odd,
            })
            .flow_control(match settings.flow_control {
                FlowControlConfig::None => serialport::FlowControl::None,
                FlowControlConfig::Software => serialport::FlowControl::Software,
                FlowControlConfig::Hardware => serialport::FlowControl::Hardware,
            })
            .timeout(settings.timeout());

        let port = builder.open()?;

        info!(
            "Serial port {} opened at {} baud",
            settings.port, settings.baud_rate
        );

        Ok(Self::with_link(
            port,
            settings.timeout(),
            settings.read_terminator_byte(),
        ))
    }
}

impl<L: SerialLink> SerialClient<L> {
    /// Wrap an already opened link.
    pub fn with_link(link: L, timeout: Duration, read_terminator: u8) -> Self {
        let name = link.port_name();
        Self {
            link,
            name,
            timeout,
            read_terminator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write raw bytes and flush.
    pub fn write_bytes(&mut self, data: &[u8]) -> ProbeResult<()> {
        self.link.write_all(data)?;
        self.link.flush()?;
        debug!("Sent {} bytes over {}", data.len(), self.name);
        Ok(())
    }

    /// Read until the terminator byte or until the timeout elapses.
    ///
    /// The timeout bounds the whole call. Whatever arrived before the
    /// deadline is returned; an empty result is not an error.
    pub fn read_line(&mut self) -> ProbeResult<LineRead> {
        let deadline = Instant::now() + self.timeout;
        let mut bytes = Vec::new();
        let mut byte = [0u8; 1];

        let timed_out = loop {
            let now = Instant::now();
            if now >= deadline {
                break true;
            }
            self.link.apply_timeout(deadline - now)?;

            match self.link.read(&mut byte) {
                Ok(0) => break false,
                Ok(_) => {
                    bytes.push(byte[0]);
                    if byte[0] == self.read_terminator {
                        break false;
                    }
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => break true,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };

        // Leave the link configured with the full timeout for the next caller.
        self.link.apply_timeout(self.timeout)?;

        if timed_out {
            debug!("Read on {} timed out with {} bytes", self.name, bytes.len());
        } else {
            debug!("Received {} bytes over {}", bytes.len(), self.name);
        }

        Ok(LineRead { bytes, timed_out })
    }

    /// Drain whatever is buffered, waiting at most `poll` for each chunk.
    pub fn read_available(&mut self, poll: Duration) -> ProbeResult<Vec<u8>> {
        self.link.apply_timeout(poll)?;

        let mut out = Vec::new();
        let mut chunk = [0u8; 256];
        let result = loop {
            match self.link.read(&mut chunk) {
                Ok(0) => break Ok(()),
                Ok(n) => out.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::TimedOut => break Ok(()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => break Err(ProbeError::from(e)),
            }
        };

        self.link.apply_timeout(self.timeout)?;
        result.map(|_| out)
    }

    /// Release the device.
    pub fn close(self) {
        info!("Serial port {} closed", self.name);
    }
}

impl<L: SerialLink> Drop for SerialClient<L> {
    fn drop(&mut self) {
        if let Err(e) = self.link.flush() {
            warn!("Failed to flush {} on release: {}", self.name, e);
        }
    }
}
