//! Notification scheduler.
//!
//! Owns the single recurring reminder timer. The timer is a spawned tokio
//! task; [`Scheduler::configure`] atomically replaces it, so no stale timer
//! can fire with old parameters. Firing outside the active window skips
//! that one occurrence without touching the timer: suppression is
//! per-occurrence, never deferred, so an occurrence suppressed at 07:59
//! does not double-fire when the window opens.
//!
//! Known limitation: aborting the timer task cannot recall a firing that is
//! already in flight on the scheduling thread. A reminder may still be
//! delivered immediately after `cancel` returns. Best-effort by design.

use chrono::NaiveTime;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::alert::AlertSink;
use crate::audio::AudioContext;
use crate::clock::Clock;
use crate::settings::{AlertMode, Settings};

pub const WELCOME_TITLE: &str = "Welcome to Sipwell";
pub const WELCOME_BODY: &str = "We'll remind you to drink water during your active hours.";
pub const REMINDER_TITLE: &str = "Time to hydrate";
pub const REMINDER_BODY: &str = "Have a sip of water and log it.";

/// The slice of settings the scheduler acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPolicy {
    pub enabled: bool,
    /// Minutes between reminders.
    pub interval: u32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub alert_type: AlertMode,
}

impl From<&Settings> for ReminderPolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            enabled: settings.enabled,
            interval: settings.interval,
            start_time: settings.start_time,
            end_time: settings.end_time,
            alert_type: settings.alert_type,
        }
    }
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        let mut policy = Self::from(&Settings::default());
        policy.enabled = false;
        policy
    }
}

impl ReminderPolicy {
    /// A timer is armed only for an enabled policy with a real delivery
    /// channel.
    pub fn should_arm(&self) -> bool {
        self.enabled && self.alert_type != AlertMode::None
    }

    /// Whether `t` falls inside the half-open active window `[start, end)`.
    pub fn in_active_window(&self, t: NaiveTime) -> bool {
        self.start_time <= t && t < self.end_time
    }
}

pub struct Scheduler {
    clock: Arc<dyn Clock>,
    alerts: Arc<dyn AlertSink>,
    audio: Arc<AudioContext>,
    alarm_sound: String,
    /// Shared with the timer task: window and alert mode are re-read at
    /// every fire, so policy refreshes apply without re-arming.
    policy: Arc<Mutex<ReminderPolicy>>,
    timer: Option<JoinHandle<()>>,
    welcomed: bool,
}

impl Scheduler {
    pub fn new(
        clock: Arc<dyn Clock>,
        alerts: Arc<dyn AlertSink>,
        audio: Arc<AudioContext>,
        alarm_sound: impl Into<String>,
    ) -> Self {
        Self {
            clock,
            alerts,
            audio,
            alarm_sound: alarm_sound.into(),
            policy: Arc::new(Mutex::new(ReminderPolicy::default())),
            timer: None,
            welcomed: false,
        }
    }

    pub fn policy(&self) -> ReminderPolicy {
        self.policy.lock().unwrap().clone()
    }

    pub fn is_armed(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Replace the active policy and atomically reschedule.
    ///
    /// Any pending timer is canceled first; a new recurring timer is armed
    /// only when the policy calls for one, and it starts its count from
    /// this instant. The very first configure also emits the one-time
    /// welcome notification, independent of the recurring schedule.
    pub fn configure(&mut self, policy: ReminderPolicy) {
        self.cancel();
        *self.policy.lock().unwrap() = policy.clone();

        if !self.welcomed {
            self.welcomed = true;
            if let Err(error) = self.alerts.notify(WELCOME_TITLE, WELCOME_BODY) {
                warn!(%error, "welcome notification failed");
            }
        }

        if !policy.should_arm() {
            return;
        }

        let period = Duration::from_secs(u64::from(policy.interval) * 60);
        let shared = Arc::clone(&self.policy);
        let clock = Arc::clone(&self.clock);
        let alerts = Arc::clone(&self.alerts);
        let audio = Arc::clone(&self.audio);
        let sound = self.alarm_sound.clone();
        self.timer = Some(tokio::spawn(async move {
            // First fire one full interval from now, then every interval.
            let mut ticker = time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let policy = shared.lock().unwrap().clone();
                on_fire(&policy, clock.as_ref(), alerts.as_ref(), &audio, &sound);
            }
        }));
    }

    /// Refresh the policy the running timer reads, without re-arming.
    ///
    /// Window and alert-mode updates apply from the next fire; an interval
    /// change only takes hold at the next [`configure`](Self::configure).
    pub fn update_policy(&self, policy: ReminderPolicy) {
        *self.policy.lock().unwrap() = policy;
    }

    /// Disarm the timer. Idempotent; a no-op when nothing is armed.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// One timer occurrence. Skips silently outside the active window,
/// otherwise delivers per the alert mode.
fn on_fire(
    policy: &ReminderPolicy,
    clock: &dyn Clock,
    alerts: &dyn AlertSink,
    audio: &AudioContext,
    sound: &str,
) {
    let now = clock.now().time();
    if !policy.in_active_window(now) {
        debug!(%now, "reminder suppressed outside active window");
        return;
    }
    match policy.alert_type {
        AlertMode::Notify => notify(alerts),
        AlertMode::Alarm => audio.ensure().send_alarm(sound),
        AlertMode::Both => {
            notify(alerts);
            audio.ensure().send_alarm(sound);
        }
        // Never armed with None; nothing to deliver even if reached.
        AlertMode::None => {}
    }
}

fn notify(alerts: &dyn AlertSink) {
    if let Err(error) = alerts.notify(REMINDER_TITLE, REMINDER_BODY) {
        warn!(%error, "reminder notification failed");
    }
}
