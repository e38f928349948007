//! Audio playback context.
//!
//! Audio alerts play in a context of their own, reached only by
//! fire-and-forget messages. The context is created lazily the first time a
//! sound is needed and reused afterwards; [`AudioContext::ensure`] is the
//! idempotent create-if-absent entry point.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::Result;

/// Routing target carried by every audio message.
pub const AUDIO_TARGET: &str = "audio-context";

/// Fire-and-forget message to the audio context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub target: String,
    /// Sound identifier to play.
    pub data: String,
}

impl AudioMessage {
    pub fn alarm(sound: impl Into<String>) -> Self {
        Self {
            kind: "alarm".into(),
            target: AUDIO_TARGET.into(),
            data: sound.into(),
        }
    }
}

/// Sound-file playback boundary inside the audio context.
pub trait AlarmPlayer: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns an error when playback is rejected; the context logs it and
    /// keeps serving later messages.
    fn play(&self, sound: &str) -> Result<()>;
}

/// Logs the sound instead of playing it. Stand-in playback for the CLI
/// runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPlayer;

impl AlarmPlayer for LogPlayer {
    fn play(&self, sound: &str) -> Result<()> {
        println!("♪ alarm: {sound}");
        Ok(())
    }
}

/// Records play requests instead of playing them. Test double.
#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    played: Arc<Mutex<Vec<String>>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }
}

impl AlarmPlayer for RecordingPlayer {
    fn play(&self, sound: &str) -> Result<()> {
        self.played.lock().unwrap().push(sound.to_string());
        Ok(())
    }
}

/// Sender half of the audio channel. Sends never block and never fail
/// visibly; a closed context just drops the message.
#[derive(Debug, Clone)]
pub struct AudioHandle {
    tx: mpsc::UnboundedSender<AudioMessage>,
}

impl AudioHandle {
    pub fn send(&self, message: AudioMessage) {
        let _ = self.tx.send(message);
    }

    pub fn send_alarm(&self, sound: &str) {
        self.send(AudioMessage::alarm(sound));
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Lazily-spawned audio playback context.
pub struct AudioContext {
    player: Arc<dyn AlarmPlayer>,
    handle: Mutex<Option<AudioHandle>>,
}

impl AudioContext {
    pub fn new(player: Arc<dyn AlarmPlayer>) -> Self {
        Self {
            player,
            handle: Mutex::new(None),
        }
    }

    /// Get a handle to the context, spawning it if it does not exist yet.
    ///
    /// Repeated calls return handles to the same context.
    pub fn ensure(&self) -> AudioHandle {
        let mut guard = self.handle.lock().unwrap();
        if let Some(handle) = guard.as_ref() {
            if !handle.is_closed() {
                return handle.clone();
            }
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<AudioMessage>();
        let player = Arc::clone(&self.player);
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if message.target != AUDIO_TARGET || message.kind != "alarm" {
                    debug!(kind = %message.kind, target = %message.target, "ignoring message");
                    continue;
                }
                if let Err(error) = player.play(&message.data) {
                    warn!(%error, sound = %message.data, "alarm playback failed");
                }
            }
        });

        let handle = AudioHandle { tx };
        *guard = Some(handle.clone());
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alarm_message_wire_shape() {
        let json = serde_json::to_value(AudioMessage::alarm("water-drop")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "alarm", "target": "audio-context", "data": "water-drop"})
        );
    }

    #[tokio::test]
    async fn ensure_is_idempotent_and_plays() {
        let player = RecordingPlayer::new();
        let context = AudioContext::new(Arc::new(player.clone()));

        let first = context.ensure();
        let second = context.ensure();
        first.send_alarm("drip");
        second.send_alarm("drop");

        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert_eq!(player.played(), vec!["drip".to_string(), "drop".to_string()]);
    }

    #[tokio::test]
    async fn messages_for_other_targets_are_ignored() {
        let player = RecordingPlayer::new();
        let context = AudioContext::new(Arc::new(player.clone()));
        let handle = context.ensure();

        handle.send(AudioMessage {
            kind: "alarm".into(),
            target: "popup".into(),
            data: "drip".into(),
        });
        handle.send_alarm("drop");

        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert_eq!(player.played(), vec!["drop".to_string()]);
    }
}
