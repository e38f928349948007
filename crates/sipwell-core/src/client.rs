//! UI client proxy.
//!
//! Lives inside a UI context and mirrors a local copy of the settings and
//! today's log. All state flows through request/response messages: the
//! proxy never touches the store, which keeps the coordinator the single
//! writer.

use chrono::{Local, Utc};
use tokio::sync::mpsc;

use crate::coordinator::CoordinatorHandle;
use crate::daylog::{date_key, DailyLog};
use crate::protocol::{Request, Response, UI_ROLE};
use crate::settings::Settings;

pub struct UiClient {
    coordinator: CoordinatorHandle,
    rx: mpsc::UnboundedReceiver<Response>,
    settings: Settings,
    today: Option<DailyLog>,
}

impl UiClient {
    /// Open the UI channel. A second client connecting supersedes the
    /// first at the coordinator.
    pub fn connect(coordinator: &CoordinatorHandle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        coordinator.connect(UI_ROLE, tx);
        Self {
            coordinator: coordinator.clone(),
            rx,
            settings: Settings::default(),
            today: None,
        }
    }

    /// Local mirror of the settings (defaults until populated).
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Local mirror of today's log, once populated.
    pub fn today(&self) -> Option<&DailyLog> {
        self.today.as_ref()
    }

    /// Ask the coordinator for both records, passing the local mirrors as
    /// first-run seeds.
    pub fn populate(&self) {
        self.coordinator.send(&Request::GetSettings {
            data: Some(self.settings.clone()),
        });
        self.coordinator.send(&Request::GetToday {
            data: self.today.clone(),
        });
    }

    /// Wait for the next response and fold it into the local mirror.
    /// Returns `None` once the channel is gone.
    pub async fn recv(&mut self) -> Option<Response> {
        let response = self.rx.recv().await?;
        self.apply(&response);
        Some(response)
    }

    /// Fold in a response if one is already waiting, without blocking.
    pub fn try_recv(&mut self) -> Option<Response> {
        let response = self.rx.try_recv().ok()?;
        self.apply(&response);
        Some(response)
    }

    fn apply(&mut self, response: &Response) {
        match response {
            Response::GetSettings(payload) | Response::SetSettings(payload) => {
                self.settings = payload.settings.clone();
            }
            Response::GetToday(by_date) => {
                if let Some((_, log)) = by_date.iter().next() {
                    self.today = Some(log.clone());
                }
            }
        }
    }

    /// Update the mirror and push the whole settings record.
    pub fn push_settings(&mut self, settings: Settings) {
        self.settings = settings.clone();
        self.coordinator.send(&Request::SetSettings { data: settings });
    }

    /// Log one drink locally and push the whole day. The coordinator
    /// replaces the day's record wholesale; `logs` are never merged.
    pub fn log_intake(&mut self, amount: u32) {
        let mut today = self.today.take().unwrap_or_else(|| {
            DailyLog::seeded(date_key(Local::now().date_naive()), &self.settings)
        });
        today.log_intake(amount, Utc::now());
        self.coordinator.send(&Request::SetToday { data: today.clone() });
        self.today = Some(today);
    }

    /// Drop the channel. Pending responses are lost, not resumed.
    pub fn disconnect(&self) {
        self.coordinator.disconnect();
    }
}
