//! UI↔coordinator wire protocol.
//!
//! Request/response pairs over a per-connection channel, JSON-serializable
//! end to end. The request tag doubles as the response tag with a
//! `:response` suffix; `set:today` is the one request that emits no
//! response. Unknown tags or missing payloads fail deserialization and the
//! coordinator drops them silently, since the channel has no structured
//! error-reply type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::daylog::DailyLog;
use crate::settings::Settings;

/// Channel role under which a UI panel connects.
pub const UI_ROLE: &str = "popup";

/// Requests a UI context may issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Read settings; `data` seeds the store on first run.
    #[serde(rename = "get:settings")]
    GetSettings {
        #[serde(default)]
        data: Option<Settings>,
    },
    /// Persist settings verbatim.
    #[serde(rename = "set:settings")]
    SetSettings { data: Settings },
    /// Read today's log; `data` seeds a missing day.
    #[serde(rename = "get:today")]
    GetToday {
        #[serde(default)]
        data: Option<DailyLog>,
    },
    /// Overwrite today's log. No response is emitted.
    #[serde(rename = "set:today")]
    SetToday { data: DailyLog },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsPayload {
    pub settings: Settings,
}

/// Responses the coordinator sends back on the UI channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "response")]
pub enum Response {
    #[serde(rename = "get:settings:response")]
    GetSettings(SettingsPayload),
    #[serde(rename = "set:settings:response")]
    SetSettings(SettingsPayload),
    /// Single-entry map keyed by the date key.
    #[serde(rename = "get:today:response")]
    GetToday(BTreeMap<String, DailyLog>),
}

impl Response {
    pub fn today(date_key: String, log: DailyLog) -> Self {
        Response::GetToday(BTreeMap::from([(date_key, log)]))
    }
}
