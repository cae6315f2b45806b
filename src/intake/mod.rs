//! Intake system: scripted receptionist conversation.
//!
//! The receptionist greets the patient and collects name, age, presenting
//! issue and a preferred slot, one stage at a time. Common questions (hours,
//! fees, services, location, doctor, parking) can be asked at any point; they
//! are answered from a fixed table and the pending question is asked again
//! without losing progress.

pub mod controller;
pub mod extract;
pub mod interrupts;
pub mod model;
pub mod normalize;
pub mod prompts;
pub mod state;

pub use controller::{Conversation, PendingReply, Submission, TurnReport};
pub use interrupts::{InterruptEntry, InterruptMatcher, MatchMode, Topic, INTERRUPT_TABLE};
pub use model::PatientRecord;
pub use state::Stage;
