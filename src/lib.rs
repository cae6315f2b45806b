//! Clinic Intake: scripted receptionist that books appointments by chat.

pub mod channels;
pub mod config;
pub mod error;
pub mod intake;
pub mod session;
pub mod transcript;
