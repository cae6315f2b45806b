//! Channel abstraction for patient input and transcript display.

pub mod channel;
pub mod cli;

pub use channel::*;
pub use cli::CliChannel;
