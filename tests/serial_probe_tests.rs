use mtdprobe::core::probe::serial::{probe, read_pins, switch_pin};
use mtdprobe::domain::command::{default_serial_command, encode_line, SerialCommand};
use mtdprobe::infrastructure::serial::{MockSerialPort, SerialClient};
use mtdprobe::ProbeError;
use std::time::{Duration, Instant};

fn client(port: MockSerialPort, timeout: Duration) -> SerialClient<MockSerialPort> {
    SerialClient::with_link(port, timeout, b'\n')
}

fn default_line() -> Vec<u8> {
    encode_line(&default_serial_command().to_string(), "\r").unwrap()
}

#[test]
fn test_echoed_command_is_printed_without_terminator() {
    let (port, handle) = MockSerialPort::echo("/dev/ttyACM0");

    let exchange = probe(client(port, Duration::from_millis(100)), &default_line()).unwrap();

    assert_eq!(handle.write_log(), vec![b"PINSTAT 0\r".to_vec()]);
    assert_eq!(exchange.raw, b"PINSTAT 0\r");
    assert_eq!(exchange.response, "PINSTAT 0");
}

#[test]
fn test_silent_device_returns_after_timeout() {
    let (port, _handle) = MockSerialPort::new("/dev/ttyACM0");
    let timeout = Duration::from_millis(150);

    let started = Instant::now();
    let exchange = probe(client(port, timeout), &default_line()).unwrap();
    let elapsed = started.elapsed();

    assert!(exchange.timed_out);
    assert!(exchange.response.is_empty());
    assert!(elapsed >= timeout);
    assert!(elapsed < Duration::from_secs(2), "probe hung for {:?}", elapsed);
}

#[test]
fn test_partial_reply_is_kept_on_timeout() {
    let (port, handle) = MockSerialPort::new("/dev/ttyACM0");
    handle.reply_on_write(b"  1 ");

    let exchange = probe(client(port, Duration::from_millis(80)), &default_line()).unwrap();

    assert!(exchange.timed_out);
    assert_eq!(exchange.response, "1");
}

#[test]
fn test_device_is_released_after_success() {
    let (port, handle) = MockSerialPort::echo("/dev/ttyACM0");

    probe(client(port, Duration::from_millis(50)), &default_line()).unwrap();

    assert!(handle.is_closed());
}

#[test]
fn test_device_is_released_after_failure() {
    let (port, handle) = MockSerialPort::new("/dev/ttyACM0");
    handle.reply_on_write(&[0xc3, 0x28, b'\n']);

    let result = probe(client(port, Duration::from_millis(50)), &default_line());

    assert!(matches!(result, Err(ProbeError::InvalidData(_))));
    assert!(handle.is_closed());
}

#[test]
fn test_switch_pin_accepts_acknowledgement() {
    let (port, handle) = MockSerialPort::new("/dev/ttyACM0");
    handle.reply_on_write(b"turning ON 5\r\n");

    let exchange = switch_pin(
        client(port, Duration::from_millis(100)),
        SerialCommand::switch(5, true),
        "\r",
    )
    .unwrap();

    assert_eq!(exchange.response, "turning ON 5");
    assert_eq!(handle.write_log(), vec![b"ON 5\r".to_vec()]);
}

#[test]
fn test_switch_pin_rejects_wrong_acknowledgement() {
    let (port, handle) = MockSerialPort::new("/dev/ttyACM0");
    handle.reply_on_write(b"ERR\n");

    let result = switch_pin(
        client(port, Duration::from_millis(100)),
        SerialCommand::Off(5),
        "\r",
    );

    assert!(matches!(result, Err(ProbeError::Protocol(_))));
    assert!(handle.is_closed());
}

#[test]
fn test_read_pins_parses_full_grid() {
    let (port, handle) = MockSerialPort::new("/dev/ttyACM0");
    let mut reply = vec!["0"; 256];
    reply[17] = "1";
    handle.reply_on_write(format!("{}\n", reply.join(" ")).as_bytes());

    let (exchange, grid) = read_pins(client(port, Duration::from_millis(200)), "\r", 16, 16).unwrap();

    assert!(!exchange.timed_out);
    assert_eq!(handle.write_log(), vec![b"PINSTAT ALL\r".to_vec()]);
    assert!(grid.get_at(1, 1).unwrap());
    assert_eq!(grid.count_on(), 1);
}

#[test]
fn test_read_pins_rejects_short_reply() {
    let (port, handle) = MockSerialPort::new("/dev/ttyACM0");
    handle.reply_on_write(b"0 1 0\n");

    let result = read_pins(client(port, Duration::from_millis(100)), "\r", 16, 16);

    assert!(matches!(result, Err(ProbeError::InvalidData(_))));
}
