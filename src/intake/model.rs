//! Patient record built up during intake.

use serde::{Deserialize, Serialize};

/// Structured result of the intake conversation.
///
/// Every field starts empty and is written only by its own stage's extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub name: String,
    /// Decimal string of an integer in `1..=120`.
    pub age: String,
    pub issue: String,
    /// Preferred slot exactly as the patient typed it (whitespace-normalized).
    pub slot: String,
}

/// Separator between summary entries.
pub const SUMMARY_SEPARATOR: &str = " | ";

impl PatientRecord {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.age.is_empty() && self.issue.is_empty() && self.slot.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.age.is_empty() && !self.issue.is_empty() && !self.slot.is_empty()
    }

    /// One-line "appointment notes" for the summary panel.
    ///
    /// Only filled fields appear. `None` until something has been recorded.
    pub fn summary(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut parts = Vec::new();
        if !self.name.is_empty() {
            parts.push(format!("Naam: {} ji", self.name));
        }
        if !self.age.is_empty() {
            parts.push(format!("Umar: {} saal", self.age));
        }
        if !self.issue.is_empty() {
            parts.push(format!("Samasya: {}", self.issue));
        }
        if !self.slot.is_empty() {
            parts.push(format!("Preferred time: {}", self.slot));
        }

        Some(parts.join(SUMMARY_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_has_no_summary() {
        let record = PatientRecord::default();
        assert!(record.is_empty());
        assert!(!record.is_complete());
        assert!(record.summary().is_none());
    }

    #[test]
    fn summary_skips_missing_fields() {
        let record = PatientRecord {
            name: "Rita Verma".to_string(),
            issue: "Baal girna".to_string(),
            ..Default::default()
        };
        assert_eq!(
            record.summary().unwrap(),
            "Naam: Rita Verma ji | Samasya: Baal girna"
        );
    }

    #[test]
    fn full_summary_in_field_order() {
        let record = PatientRecord {
            name: "Rita Verma".to_string(),
            age: "28".to_string(),
            issue: "Baal girna".to_string(),
            slot: "somwaar subah 10 baje".to_string(),
        };
        assert!(record.is_complete());
        assert_eq!(
            record.summary().unwrap(),
            "Naam: Rita Verma ji | Umar: 28 saal | Samasya: Baal girna | Preferred time: somwaar subah 10 baje"
        );
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = PatientRecord {
            name: "Amit Kumar".to_string(),
            age: "32".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: PatientRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
