//! Per-day intake log model.
//!
//! One [`DailyLog`] exists per calendar day, keyed by the device-local date.
//! Once the date key advances, the previous day's record becomes immutable
//! history in the store; only today's record is ever rewritten.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::settings::{Measurement, Settings};

/// Canonical date key (`YYYY-MM-DD`) for a local calendar date.
///
/// Stable sort key: lexicographic order equals chronological order.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// One logged drink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeEntry {
    pub amount: u32,
    pub at: DateTime<Utc>,
}

/// The record for one calendar day.
///
/// `goal` and `measurement` are snapshots copied from [`Settings`] when the
/// day is created, so later settings edits do not rewrite a finished day's
/// displayed target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLog {
    #[serde(default)]
    pub date_key: String,
    #[serde(default)]
    pub goal: u32,
    #[serde(default)]
    pub measurement: Measurement,
    /// Running total; always the sum of `logs[*].amount`.
    #[serde(default)]
    pub intake: u32,
    #[serde(default)]
    pub logs: Vec<IntakeEntry>,
}

impl DailyLog {
    /// Fresh empty log for `date_key`, with goal/measurement snapshotted
    /// from the current settings.
    pub fn seeded(date_key: impl Into<String>, settings: &Settings) -> Self {
        Self {
            date_key: date_key.into(),
            goal: settings.goal,
            measurement: settings.measurement,
            intake: 0,
            logs: Vec::new(),
        }
    }

    /// Append one drink and bump the running total in the same call, so the
    /// total never drifts from the entries.
    pub fn log_intake(&mut self, amount: u32, at: DateTime<Utc>) {
        self.logs.push(IntakeEntry { amount, at });
        self.intake = self.intake.saturating_add(amount);
    }

    /// Volume still missing to reach the day's goal.
    pub fn remaining(&self) -> u32 {
        self.goal.saturating_sub(self.intake)
    }

    pub fn goal_reached(&self) -> bool {
        self.intake >= self.goal
    }
}
