// Domain module - Request types, pin state, configuration and errors
pub mod command;
pub mod config;
pub mod error;
pub mod pins;
