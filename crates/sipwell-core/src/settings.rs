//! Reminder settings model.
//!
//! The settings record is a singleton owned by the [`Coordinator`]: UI
//! contexts only ever see copies of it, delivered over the message channel.
//! Field names match the wire protocol, so the struct serializes directly
//! into the store record.
//!
//! [`Coordinator`]: crate::coordinator::Coordinator

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Display unit for volumes. Display-only: arithmetic is unit-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Measurement {
    #[default]
    Ml,
    Oz,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::Ml => write!(f, "ml"),
            Measurement::Oz => write!(f, "oz"),
        }
    }
}

/// Delivery channel for a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertMode {
    #[default]
    Notify,
    Alarm,
    Both,
    None,
}

impl fmt::Display for AlertMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertMode::Notify => write!(f, "notify"),
            AlertMode::Alarm => write!(f, "alarm"),
            AlertMode::Both => write!(f, "both"),
            AlertMode::None => write!(f, "none"),
        }
    }
}

/// User-facing reminder configuration.
///
/// Reminders fire every `interval` minutes inside the half-open active
/// window `[start_time, end_time)`. The window never wraps past midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Daily target volume.
    #[serde(default = "default_goal")]
    pub goal: u32,
    /// Default volume added per logged drink.
    #[serde(default = "default_intake")]
    pub intake: u32,
    /// Minutes between reminders.
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub measurement: Measurement,
    #[serde(default = "default_start_time", with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(default = "default_end_time", with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub alert_type: AlertMode,
}

fn default_goal() -> u32 {
    1800
}
fn default_intake() -> u32 {
    100
}
fn default_interval() -> u32 {
    60
}
fn default_true() -> bool {
    true
}
fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default()
}
fn default_end_time() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            goal: default_goal(),
            intake: default_intake(),
            interval: default_interval(),
            enabled: true,
            measurement: Measurement::Ml,
            start_time: default_start_time(),
            end_time: default_end_time(),
            alert_type: AlertMode::Notify,
        }
    }
}

impl Settings {
    /// Check the record against the model invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a zero goal/intake/interval or an
    /// active window whose end does not come after its start.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.goal == 0 {
            return Err(ValidationError::InvalidValue {
                field: "goal",
                message: "daily goal must be greater than zero".into(),
            });
        }
        if self.intake == 0 {
            return Err(ValidationError::InvalidValue {
                field: "intake",
                message: "intake step must be greater than zero".into(),
            });
        }
        if self.interval == 0 {
            return Err(ValidationError::InvalidValue {
                field: "interval",
                message: "reminder interval must be greater than zero".into(),
            });
        }
        if self.start_time >= self.end_time {
            return Err(ValidationError::InvalidWindow {
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(())
    }

    /// Whether `t` falls inside the half-open active window `[start, end)`.
    pub fn in_active_window(&self, t: NaiveTime) -> bool {
        self.start_time <= t && t < self.end_time
    }
}

/// Serde adapter for `HH:MM` time-of-day strings on the wire.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
