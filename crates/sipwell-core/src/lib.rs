//! # Sipwell Core Library
//!
//! Core engine for the Sipwell water reminder: a notification scheduler
//! plus the state-synchronization machinery that keeps settings and the
//! daily intake log consistent across independently-running contexts
//! (coordinator, UI panels, audio playback) that share no memory and only
//! pass messages.
//!
//! ## Architecture
//!
//! - **Coordinator**: single-threaded actor that owns the authoritative
//!   settings and day records, answers UI requests, and reacts to store
//!   change events
//! - **Scheduler**: one recurring timer, atomically replaced on every
//!   policy change; fires inside the daily active window only
//! - **Store**: durable key→JSON mapping with a change-notification
//!   stream; the coordinator is its only writer by convention
//! - **Client**: UI-side proxy mirroring state over request/response
//!   messages
//!
//! ## Key Components
//!
//! - [`Coordinator`]: message routing, merge policy, change propagation
//! - [`Scheduler`]: reminder timing and alert delivery
//! - [`Settings`] / [`DailyLog`]: the two synchronized records
//! - [`StateStore`]: persistence boundary

pub mod alert;
pub mod audio;
pub mod client;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod daylog;
pub mod error;
pub mod merge;
pub mod protocol;
pub mod scheduler;
pub mod settings;
pub mod store;

pub use alert::{AlertSink, ConsoleAlert, RecordingAlert};
pub use audio::{AlarmPlayer, AudioContext, AudioHandle, AudioMessage, LogPlayer, RecordingPlayer};
pub use client::UiClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use coordinator::{Coordinator, CoordinatorHandle};
pub use daylog::{date_key, DailyLog, IntakeEntry};
pub use error::{CoreError, Result, StoreError, ValidationError};
pub use protocol::{Request, Response, SettingsPayload, UI_ROLE};
pub use scheduler::{ReminderPolicy, Scheduler};
pub use settings::{AlertMode, Measurement, Settings};
pub use store::{ChangeEvent, JsonFileStore, MemoryStore, StateStore, SETTINGS_KEY};
