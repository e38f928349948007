//! Timer behavior under simulated time.
//!
//! Tokio's paused clock drives the recurring timer while a ManualClock
//! supplies the wall time-of-day the active window is checked against.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use sipwell_core::scheduler::{REMINDER_TITLE, WELCOME_TITLE};
use sipwell_core::{
    AlertMode, AlertSink, AudioContext, CoreError, ManualClock, RecordingAlert, RecordingPlayer,
    ReminderPolicy, Scheduler, Settings,
};

struct Rig {
    clock: ManualClock,
    alerts: RecordingAlert,
    player: RecordingPlayer,
    scheduler: Scheduler,
}

fn rig(h: u32, m: u32) -> Rig {
    let clock = ManualClock::new(
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap(),
    );
    let alerts = RecordingAlert::new();
    let player = RecordingPlayer::new();
    let scheduler = Scheduler::new(
        Arc::new(clock.clone()),
        Arc::new(alerts.clone()),
        Arc::new(AudioContext::new(Arc::new(player.clone()))),
        "water-drop",
    );
    Rig {
        clock,
        alerts,
        player,
        scheduler,
    }
}

fn hourly_notify() -> ReminderPolicy {
    // enabled, every 60 minutes, 08:00-18:00, notify
    ReminderPolicy::from(&Settings::default())
}

/// Let spawned timer tasks observe the paused clock.
async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Advance both clocks in lockstep.
async fn advance(rig: &Rig, minutes: u64) {
    rig.clock.advance(chrono::Duration::minutes(minutes as i64));
    tokio::time::advance(Duration::from_secs(minutes * 60)).await;
    settle().await;
}

fn reminders(rig: &Rig) -> usize {
    rig.alerts.count_titled(REMINDER_TITLE)
}

#[tokio::test(start_paused = true)]
async fn hourly_reminder_fires_inside_the_window() {
    let mut rig = rig(9, 0);
    rig.scheduler.configure(hourly_notify());
    settle().await;

    assert_eq!(reminders(&rig), 0, "nothing fires before the interval elapses");
    advance(&rig, 60).await;
    assert_eq!(reminders(&rig), 1);
    advance(&rig, 60).await;
    assert_eq!(reminders(&rig), 2);
}

#[tokio::test(start_paused = true)]
async fn window_close_suppresses_but_keeps_the_timer_armed() {
    let mut rig = rig(17, 30);
    rig.scheduler.configure(hourly_notify());
    settle().await;

    // 18:30: outside the window, occurrence skipped.
    advance(&rig, 60).await;
    assert_eq!(reminders(&rig), 0);
    assert!(rig.scheduler.is_armed());

    // Jump the wall clock back into the window; the next occurrence
    // delivers exactly once, with no catch-up for the suppressed one.
    rig.clock.set(
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
    );
    tokio::time::advance(Duration::from_secs(3600)).await;
    settle().await;
    assert_eq!(reminders(&rig), 1);
}

#[tokio::test(start_paused = true)]
async fn window_end_is_exclusive() {
    let mut rig = rig(17, 0);
    rig.scheduler.configure(hourly_notify());
    settle().await;

    // Fires exactly at 18:00, the first instant outside [08:00, 18:00).
    advance(&rig, 60).await;
    assert_eq!(reminders(&rig), 0);
}

#[tokio::test(start_paused = true)]
async fn disabled_policy_never_delivers() {
    let mut rig = rig(9, 0);
    let mut policy = hourly_notify();
    policy.enabled = false;
    rig.scheduler.configure(policy);
    settle().await;

    assert!(!rig.scheduler.is_armed());
    advance(&rig, 60 * 12).await;
    assert_eq!(reminders(&rig), 0);
    assert!(rig.player.played().is_empty());
}

#[tokio::test(start_paused = true)]
async fn none_alert_mode_never_delivers() {
    let mut rig = rig(9, 0);
    let mut policy = hourly_notify();
    policy.alert_type = AlertMode::None;
    rig.scheduler.configure(policy);
    settle().await;

    assert!(!rig.scheduler.is_armed());
    advance(&rig, 60 * 12).await;
    assert_eq!(reminders(&rig), 0);
}

#[tokio::test(start_paused = true)]
async fn reconfigure_restarts_the_count_from_now() {
    let mut rig = rig(9, 0);
    rig.scheduler.configure(hourly_notify());
    settle().await;

    advance(&rig, 30).await;
    let mut faster = hourly_notify();
    faster.interval = 45;
    rig.scheduler.configure(faster);
    settle().await;

    // The original timer would have fired at the 60-minute mark; it must
    // not. The new one counts 45 minutes from the reconfiguration instant.
    advance(&rig, 31).await;
    assert_eq!(reminders(&rig), 0);
    advance(&rig, 14).await;
    assert_eq!(reminders(&rig), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_future_deliveries() {
    let mut rig = rig(9, 0);
    rig.scheduler.configure(hourly_notify());
    settle().await;

    advance(&rig, 60).await;
    assert_eq!(reminders(&rig), 1);

    rig.scheduler.cancel();
    rig.scheduler.cancel(); // idempotent
    advance(&rig, 60 * 6).await;
    assert_eq!(reminders(&rig), 1);
}

#[tokio::test(start_paused = true)]
async fn alarm_mode_reaches_the_audio_context() {
    let mut rig = rig(9, 0);
    let mut policy = hourly_notify();
    policy.alert_type = AlertMode::Alarm;
    rig.scheduler.configure(policy);
    settle().await;

    advance(&rig, 60).await;
    assert_eq!(reminders(&rig), 0);
    assert_eq!(rig.player.played(), vec!["water-drop".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn policy_refresh_applies_to_the_running_timer() {
    let mut rig = rig(16, 30);
    rig.scheduler.configure(hourly_notify());
    settle().await;

    // Extend the window before the next fire; 17:30 would have been the
    // last in-window fire otherwise, 19:30 must now deliver too.
    let mut extended = hourly_notify();
    extended.end_time = chrono::NaiveTime::from_hms_opt(20, 0, 0).unwrap();
    rig.scheduler.update_policy(extended);

    advance(&rig, 60).await; // 17:30
    advance(&rig, 60).await; // 18:30
    advance(&rig, 60).await; // 19:30
    assert_eq!(reminders(&rig), 3);
}

/// Sink whose every delivery is rejected. Counts the attempts.
#[derive(Debug, Clone, Default)]
struct RejectingAlert {
    attempts: Arc<Mutex<usize>>,
}

impl RejectingAlert {
    fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl AlertSink for RejectingAlert {
    fn notify(&self, _title: &str, _body: &str) -> sipwell_core::Result<()> {
        *self.attempts.lock().unwrap() += 1;
        Err(CoreError::Delivery("notification service unavailable".into()))
    }
}

#[tokio::test(start_paused = true)]
async fn delivery_failure_leaves_the_timer_armed() {
    let clock = ManualClock::new(
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
    );
    let alerts = RejectingAlert::default();
    let mut scheduler = Scheduler::new(
        Arc::new(clock.clone()),
        Arc::new(alerts.clone()),
        Arc::new(AudioContext::new(Arc::new(RecordingPlayer::new()))),
        "water-drop",
    );
    scheduler.configure(hourly_notify());
    settle().await;

    // The rejected welcome did not disturb the schedule.
    assert_eq!(alerts.attempts(), 1);
    assert!(scheduler.is_armed());

    clock.advance(chrono::Duration::minutes(60));
    tokio::time::advance(Duration::from_secs(3600)).await;
    settle().await;
    assert_eq!(alerts.attempts(), 2);
    assert!(scheduler.is_armed());

    // Later occurrences still attempt delivery.
    clock.advance(chrono::Duration::minutes(60));
    tokio::time::advance(Duration::from_secs(3600)).await;
    settle().await;
    assert_eq!(alerts.attempts(), 3);
    assert!(scheduler.is_armed());
}

#[tokio::test(start_paused = true)]
async fn first_configure_emits_one_welcome() {
    let mut rig = rig(9, 0);
    rig.scheduler.configure(hourly_notify());
    rig.scheduler.configure(hourly_notify());
    settle().await;
    assert_eq!(rig.alerts.count_titled(WELCOME_TITLE), 1);
    // The welcome is independent of the recurring schedule.
    assert_eq!(reminders(&rig), 0);
}
