use crate::domain::error::{ProbeError, ProbeResult};
use std::io::{Read, Write};
use std::time::Duration;

/// Byte-level serial link.
///
/// Implemented for the `serialport` handle and for `MockSerialPort`, so the
/// probes can run without hardware attached. A read with nothing to deliver
/// must fail with `ErrorKind::TimedOut` once the configured timeout elapses.
pub trait SerialLink: Read + Write + Send {
    /// Port path or identifier, for logging.
    fn port_name(&self) -> String;

    /// Bound on how long a single read may block.
    fn apply_timeout(&mut self, timeout: Duration) -> ProbeResult<()>;
}

impl SerialLink for Box<dyn serialport::SerialPort> {
    fn port_name(&self) -> String {
        self.as_ref()
            .name()
            .unwrap_or_else(|| "<unnamed>".to_string())
    }

    fn apply_timeout(&mut self, timeout: Duration) -> ProbeResult<()> {
        serialport::SerialPort::set_timeout(self.as_mut(), timeout).map_err(ProbeError::from)
    }
}
