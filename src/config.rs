//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;
use crate::intake::MatchMode;

/// Reply pacing. Multi-part answers are staggered so they read like typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Pause before the first reply to any user turn.
    pub response_delay: Duration,
    /// Pause between a canned FAQ answer and the stage reminder.
    pub reminder_delay: Duration,
    /// Pause between the parts of the booking confirmation.
    pub stagger_delay: Duration,
}

impl PacingConfig {
    /// Every delay zero; replies are released back to back.
    pub fn immediate() -> Self {
        Self {
            response_delay: Duration::ZERO,
            reminder_delay: Duration::ZERO,
            stagger_delay: Duration::ZERO,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            response_delay: Duration::from_millis(220),
            reminder_delay: Duration::from_millis(350),
            stagger_delay: Duration::from_millis(400),
        }
    }
}

/// Intake receptionist configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Clinic name used in the opening greeting.
    pub clinic_name: String,
    /// How FAQ keywords are matched.
    pub match_mode: MatchMode,
    pub pacing: PacingConfig,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            clinic_name: "_________".to_string(),
            match_mode: MatchMode::default(),
            pacing: PacingConfig::default(),
        }
    }
}

impl IntakeConfig {
    /// Build from `INTAKE_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let clinic_name = std::env::var("INTAKE_CLINIC_NAME")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.clinic_name);

        let match_mode = match std::env::var("INTAKE_MATCH_MODE") {
            Ok(raw) => raw.parse::<MatchMode>().map_err(|message| ConfigError::InvalidValue {
                key: "INTAKE_MATCH_MODE".to_string(),
                message,
            })?,
            Err(_) => defaults.match_mode,
        };

        let pacing_enabled = match std::env::var("INTAKE_PACING") {
            Ok(raw) => parse_switch("INTAKE_PACING", &raw)?,
            Err(_) => true,
        };

        let pacing = if pacing_enabled {
            PacingConfig {
                response_delay: env_millis("INTAKE_RESPONSE_DELAY_MS", defaults.pacing.response_delay)?,
                reminder_delay: env_millis("INTAKE_REMINDER_DELAY_MS", defaults.pacing.reminder_delay)?,
                stagger_delay: env_millis("INTAKE_STAGGER_DELAY_MS", defaults.pacing.stagger_delay)?,
            }
        } else {
            PacingConfig::immediate()
        };

        Ok(Self {
            clinic_name,
            match_mode,
            pacing,
        })
    }

    pub fn with_clinic_name(mut self, name: impl Into<String>) -> Self {
        self.clinic_name = name.into();
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }
}

fn env_millis(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse_millis(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected milliseconds, got '{raw}': {e}"),
        })
}

fn parse_switch(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected on/off, got '{other}'"),
        }),
    }
}
