// Serial module - Blocking serial link, line client and mock port
pub mod client;
pub mod link;
pub mod mock;

pub use client::{LineRead, SerialClient};
pub use link::SerialLink;
pub use mock::{MockHandle, MockSerialPort};
