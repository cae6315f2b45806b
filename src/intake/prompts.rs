//! The receptionist's fixed script.
//!
//! Every agent utterance the controller can emit lives here so the flow logic
//! never carries literal text.

use super::model::PatientRecord;
use super::state::Stage;

/// Opening line, emitted once when a conversation is created.
pub fn opening_greeting(clinic_name: &str) -> String {
    format!("Namaste ji! Main {clinic_name} Clinic se bol rahi hoon. Aap kaise hain ji?")
}

/// Reminder re-asking the pending question of `stage`, used after answering
/// an out-of-flow question.
///
/// `GreetingResponse` has none: its question is the opening greeting itself.
/// `Done` has a closing line, but the controller uses [`DONE_INTERRUPT_FILLER`]
/// there instead.
pub fn stage_reminder(stage: Stage, record: &PatientRecord) -> Option<String> {
    match stage {
        Stage::GreetingResponse => None,
        Stage::AskName => Some("Main note kar leti hoon ji. Aapka poora naam bataiye ji.".to_string()),
        Stage::AskAge => {
            let address = if record.name.is_empty() {
                String::new()
            } else {
                format!("{} ji, ", record.name)
            };
            Some(format!("{address}aapki umar kya hai ji?"))
        }
        Stage::AskIssue => Some(
            "Kaunsi samasya ke liye appointment lena chahte hain ji? (jaise bal girna, dard, skin problem)"
                .to_string(),
        ),
        Stage::AskSlot => {
            Some("Aapko appointment ke liye kaunsa din aur time convenient rahega ji?".to_string())
        }
        Stage::Done => Some("Kya aapko kisi aur cheez me madad chahiye ji?".to_string()),
    }
}

/// Answer to an out-of-flow question once the intake is finished.
pub const DONE_INTERRUPT_FILLER: &str =
    "Main yahin hoon ji, jab bhi aap ready hon appointment details confirm karne ke liye bataiye ji.";

// ── Stage advance prompts ──────────────────────────────────────────

pub const ASK_NAME: &str = "Bahut accha ji! Main note kar leti hoon. Aapka poora naam bataiye ji.";

pub fn ask_age(name: &str) -> String {
    format!("Dhanyavaad {name} ji! Aapki umar kya hai ji?")
}

pub const ASK_ISSUE: &str =
    "Samajh gayi ji. Kaunsi samasya ke liye appointment lena chahte hain ji?";

pub const ASK_SLOT: &str =
    "Theek hai ji. Aapko appointment ke liye kaunsa din aur time convenient rahega ji?";

pub fn booking_ack(slot: &str) -> String {
    format!("Bahut badhiya ji! Main {slot} ke liye appointment block kar rahi hoon ji.")
}

pub const BOOKING_CONFIRMED: &str = "Aapka appointment confirm kar diya gaya hai. Clinic ka address aur timing WhatsApp/SMS me bhej diya jayega ji.";

pub const BOOKING_CLOSING: &str = "Kya aapko kisi aur cheez me madad chahiye ji? Main yahin hoon ji.";

pub const DONE_ACK: &str =
    "Dhanyavaad ji! Agar aapko aur koi sawaal ya reschedule karna ho to bas bata dijiye ji.";

// ── Re-asks ────────────────────────────────────────────────────────

pub const REASK_NAME: &str = "Mujhe aapka poora naam theek se samajh nahi aaya ji. Kripya apna first aur last name bataiye ji.";

pub const REASK_AGE_MISSING: &str = "Maaf kijiye ji, mujhe aapki umar samajh nahi aayi. Kripya pure ank me batayein, jaise 32 ji.";

pub const REASK_AGE_RANGE: &str =
    "Kya aap apni sahi umar bata sakte hain ji? 1 se 120 ke beech me koi bhi ank chalega ji.";

pub const REASK_ISSUE: &str =
    "Kripya thoda detail me batayein ji ki aapko kis takleef ke liye salaah chahiye ji.";

pub const REASK_SLOT: &str =
    "Kripya koi specific din aur time suggest kijiye ji, jaise 'Somwaar dopahar 3 baje' ji.";
