// Core module - Probe flows over the serial and websocket clients
pub mod console;
pub mod probe;
