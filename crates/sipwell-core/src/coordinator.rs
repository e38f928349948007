//! Coordinator: the long-lived owner of settings and day records.
//!
//! Runs as a single-threaded actor: one tokio task selecting over its
//! command inbox and the store's change-notification stream. All writes to
//! the store funnel through it, which is what serializes concurrent edits
//! without locks. Request handlers never block and nothing in here is
//! fatal; failed operations are logged and the request goes unanswered,
//! because the channel has no structured error-reply type.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::daylog::{date_key, DailyLog};
use crate::error::Result;
use crate::merge;
use crate::protocol::{Request, Response, SettingsPayload, UI_ROLE};
use crate::scheduler::{ReminderPolicy, Scheduler};
use crate::settings::Settings;
use crate::store::{ChangeEvent, StateStore, SETTINGS_KEY};

/// Sender half of a UI connection; responses flow back over it.
pub type UiPort = mpsc::UnboundedSender<Response>;

/// Inbox messages for the coordinator task.
#[derive(Debug)]
enum Command {
    /// A context opened a channel under `role`. Only the UI role is
    /// tracked; a new connection supersedes the previous handle.
    Connect { role: String, port: UiPort },
    /// The tracked UI channel went away.
    Disconnect,
    /// Raw message off the wire; malformed ones are dropped here.
    Message(Value),
}

/// Cloneable handle for talking to a spawned coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl CoordinatorHandle {
    pub fn connect(&self, role: &str, port: UiPort) {
        let _ = self.tx.send(Command::Connect {
            role: role.to_string(),
            port,
        });
    }

    pub fn disconnect(&self) {
        let _ = self.tx.send(Command::Disconnect);
    }

    /// Send a typed request.
    pub fn send(&self, request: &Request) {
        match serde_json::to_value(request) {
            Ok(message) => self.send_raw(message),
            Err(error) => debug!(%error, "unserializable request dropped"),
        }
    }

    /// Send a raw JSON message, exactly as it would arrive off the wire.
    pub fn send_raw(&self, message: Value) {
        let _ = self.tx.send(Command::Message(message));
    }
}

pub struct Coordinator {
    store: Arc<dyn StateStore>,
    scheduler: Scheduler,
    clock: Arc<dyn Clock>,
    defaults: Settings,
    /// The one tracked UI channel. Connect overwrites, disconnect clears.
    ui_port: Option<UiPort>,
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn StateStore>,
        scheduler: Scheduler,
        clock: Arc<dyn Clock>,
        defaults: Settings,
    ) -> Self {
        Self {
            store,
            scheduler,
            clock,
            defaults,
            ui_port: None,
        }
    }

    /// First-run bootstrap, idempotent across restarts.
    ///
    /// Seeds the store with default settings and an empty day record when
    /// no settings exist yet, then hands the scheduler its policy either
    /// way. Returns the effective settings.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn install(&mut self) -> Result<Settings> {
        let settings = match self.load_settings()? {
            Some(existing) => existing,
            None => {
                let settings = self.defaults.clone();
                self.store
                    .set(SETTINGS_KEY, serde_json::to_value(&settings)?)?;
                let key = date_key(self.clock.now().date());
                let today = DailyLog::seeded(&key, &settings);
                self.store.set(&key, serde_json::to_value(&today)?)?;
                info!(date_key = %key, "seeded first-run state");
                settings
            }
        };
        self.scheduler.configure(ReminderPolicy::from(&settings));
        Ok(settings)
    }

    /// Run the actor on its own task, consuming the coordinator.
    pub fn spawn(mut self) -> CoordinatorHandle {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut changes = self.store.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    command = rx.recv() => match command {
                        Some(command) => self.handle_command(command),
                        None => break,
                    },
                    event = changes.recv() => match event {
                        Ok(event) => self.handle_change(event),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "change stream lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
        CoordinatorHandle { tx }
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Read settings; a missing record is seeded from `fallback` (or the
    /// built-in defaults), persisted, and returned.
    ///
    /// # Errors
    ///
    /// Propagates store and decode failures.
    pub fn get_settings(&mut self, fallback: Option<Settings>) -> Result<Settings> {
        match self.load_settings()? {
            Some(settings) => Ok(settings),
            None => {
                let seed = fallback.unwrap_or_else(|| self.defaults.clone());
                self.store.set(SETTINGS_KEY, serde_json::to_value(&seed)?)?;
                Ok(seed)
            }
        }
    }

    /// Persist settings verbatim and hand the scheduler the fresh policy.
    ///
    /// The policy handed over always reflects the latest interval and
    /// window, not just the arm/cancel-relevant fields.
    ///
    /// # Errors
    ///
    /// Propagates validation and store failures; nothing is persisted on
    /// invalid settings.
    pub fn set_settings(&mut self, settings: Settings) -> Result<Settings> {
        settings.validate()?;
        self.store
            .set(SETTINGS_KEY, serde_json::to_value(&settings)?)?;
        self.scheduler.configure(ReminderPolicy::from(&settings));
        Ok(settings)
    }

    /// Today's record under the current date key.
    ///
    /// An existing record is returned with the current settings' shared
    /// fields overlaid (record as base); the merged view is NOT persisted.
    /// A missing record is created from `seed` (settings overlaid onto it),
    /// persisted, and returned. The previous day's record is left untouched
    /// either way.
    ///
    /// # Errors
    ///
    /// Propagates store and decode failures.
    pub fn get_today(&mut self, seed: Option<DailyLog>) -> Result<(String, DailyLog)> {
        let key = date_key(self.clock.now().date());
        let settings = self.load_settings()?;

        if let Some(mut existing) = self.store.get(&key)? {
            if let Some(settings) = &settings {
                merge::apply_settings(&mut existing, settings);
            }
            let log: DailyLog = serde_json::from_value(existing)?;
            return Ok((key, log));
        }

        let mut log =
            seed.unwrap_or_else(|| DailyLog::seeded(&key, settings.as_ref().unwrap_or(&self.defaults)));
        log.date_key = key.clone();
        if let Some(settings) = &settings {
            log = merge::merge_day_with_settings(&log, settings)?;
        }
        self.store.set(&key, serde_json::to_value(&log)?)?;
        Ok((key, log))
    }

    /// Overwrite today's record wholesale. The day's `logs` sequence is
    /// never merged, only replaced.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn set_today(&mut self, mut log: DailyLog) -> Result<()> {
        let key = date_key(self.clock.now().date());
        log.date_key = key.clone();
        self.store.set(&key, serde_json::to_value(&log)?)
    }

    // ── Message handling ─────────────────────────────────────────────

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect { role, port } => {
                if role == UI_ROLE {
                    // Supersedes any previous UI channel; the old handle is
                    // simply dropped, not closed.
                    self.ui_port = Some(port);
                } else {
                    debug!(%role, "ignoring connection for unknown role");
                }
            }
            Command::Disconnect => {
                self.ui_port = None;
            }
            Command::Message(raw) => match serde_json::from_value::<Request>(raw) {
                Ok(request) => {
                    if let Err(error) = self.dispatch(request) {
                        warn!(%error, "request failed, no response sent");
                    }
                }
                Err(error) => debug!(%error, "ignoring malformed message"),
            },
        }
    }

    fn dispatch(&mut self, request: Request) -> Result<()> {
        let response = match request {
            Request::GetSettings { data } => Some(Response::GetSettings(SettingsPayload {
                settings: self.get_settings(data)?,
            })),
            Request::SetSettings { data } => Some(Response::SetSettings(SettingsPayload {
                settings: self.set_settings(data)?,
            })),
            Request::GetToday { data } => {
                let (key, log) = self.get_today(data)?;
                Some(Response::today(key, log))
            }
            Request::SetToday { data } => {
                self.set_today(data)?;
                None
            }
        };
        if let Some(response) = response {
            self.respond(response);
        }
        Ok(())
    }

    /// Deliver a response on the tracked UI channel, if any. Responses to a
    /// dead channel are dropped, never retried.
    fn respond(&mut self, response: Response) {
        if let Some(port) = &self.ui_port {
            if port.send(response).is_err() {
                self.ui_port = None;
            }
        }
    }

    // ── Change propagation ───────────────────────────────────────────

    /// React to a settings write from any context. A flip of `enabled` or
    /// `alert_type` re-arms or cancels the timer; other edits only refresh
    /// the policy the running timer reads.
    fn handle_change(&mut self, event: ChangeEvent) {
        if event.key != SETTINGS_KEY {
            return;
        }
        let Some(new_value) = event.new_value else {
            return;
        };
        let Ok(settings) = serde_json::from_value::<Settings>(new_value) else {
            warn!("settings record changed to an undecodable value");
            return;
        };
        let old: Option<Settings> = event
            .old_value
            .and_then(|value| serde_json::from_value(value).ok());

        let policy = ReminderPolicy::from(&settings);
        let arm_relevant_change = match &old {
            Some(old) => old.enabled != settings.enabled || old.alert_type != settings.alert_type,
            None => true,
        };
        if arm_relevant_change {
            self.scheduler.configure(policy);
        } else {
            self.scheduler.update_policy(policy);
        }
    }

    fn load_settings(&self) -> Result<Option<Settings>> {
        self.store
            .get(SETTINGS_KEY)?
            .map(|value| serde_json::from_value(value).map_err(Into::into))
            .transpose()
    }

    #[cfg(test)]
    pub(crate) fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}
