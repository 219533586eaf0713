//! In-memory serial port for exercising the probes without hardware.
//!
//! `MockSerialPort::new` returns the port together with a `MockHandle`. The
//! port is handed to the code under test; the handle stays with the test to
//! queue replies, inspect writes and check that the port was released.

use crate::domain::error::ProbeResult;
use crate::infrastructure::serial::link::SerialLink;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug)]
struct MockPortState {
    /// Bytes returned by subsequent reads
    read_queue: VecDeque<u8>,
    /// Every write, in order
    write_log: Vec<Vec<u8>>,
    /// Replies queued one per write
    replies: VecDeque<Vec<u8>>,
    /// Copy every write back into the read queue
    echo: bool,
    timeout: Duration,
    closed: bool,
}

/// Mock serial port.
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

/// Test-side view of a `MockSerialPort`.
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    pub fn new(name: impl Into<String>) -> (Self, MockHandle) {
        let state = Arc::new(Mutex::new(MockPortState {
            read_queue: VecDeque::new(),
            write_log: Vec::new(),
            replies: VecDeque::new(),
            echo: false,
            timeout: Duration::from_secs(1),
            closed: false,
        }));
        let port = Self {
            name: name.into(),
            state: Arc::clone(&state),
        };
        (port, MockHandle { state })
    }

    /// A port that writes every line straight back.
    pub fn echo(name: impl Into<String>) -> (Self, MockHandle) {
        let (port, handle) = Self::new(name);
        handle.lock().echo = true;
        (port, handle)
    }

    fn lock(&self) -> MutexGuard<'_, MockPortState> {
        // A panicking test thread may poison the lock; the state is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MockHandle {
    fn lock(&self) -> MutexGuard<'_, MockPortState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue bytes for the next reads.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.lock().read_queue.extend(data);
    }

    /// Queue a reply that is released by the next write.
    pub fn reply_on_write(&self, data: &[u8]) {
        self.lock().replies.push_back(data.to_vec());
    }

    pub fn write_log(&self) -> Vec<Vec<u8>> {
        self.lock().write_log.clone()
    }

    pub fn available_bytes(&self) -> usize {
        self.lock().read_queue.len()
    }

    pub fn current_timeout(&self) -> Duration {
        self.lock().timeout
    }

    /// Set once the port has been dropped.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

impl Read for MockSerialPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let timeout = {
            let mut state = self.lock();
            if !state.read_queue.is_empty() {
                let n = buf.len().min(state.read_queue.len());
                for (slot, byte) in buf.iter_mut().zip(state.read_queue.drain(..n)) {
                    *slot = byte;
                }
                return Ok(n);
            }
            state.timeout
        };

        std::thread::sleep(timeout);
        Err(io::Error::new(io::ErrorKind::TimedOut, "mock read timed out"))
    }
}

impl Write for MockSerialPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock();
        state.write_log.push(buf.to_vec());
        if state.echo {
            state.read_queue.extend(buf);
        }
        if let Some(reply) = state.replies.pop_front() {
            state.read_queue.extend(reply);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialLink for MockSerialPort {
    fn port_name(&self) -> String {
        self.name.clone()
    }

    fn apply_timeout(&mut self, timeout: Duration) -> ProbeResult<()> {
        self.lock().timeout = timeout;
        Ok(())
    }
}

impl Drop for MockSerialPort {
    fn drop(&mut self) {
        self.lock().closed = true;
    }
}
