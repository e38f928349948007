pub mod log;
pub mod run;
pub mod settings;
pub mod today;

use std::sync::Arc;

use sipwell_core::{
    AppConfig, AudioContext, ConsoleAlert, Coordinator, JsonFileStore, LogPlayer, Scheduler,
    StateStore, SystemClock,
};

/// Open the coordinator against the durable store, wired for console
/// delivery. Every subcommand goes through this; the store folds in
/// writes from other sipwell processes, so a one-shot command and a
/// running daemon see each other's edits.
pub fn open_coordinator() -> Result<(Coordinator, Arc<JsonFileStore>), Box<dyn std::error::Error>> {
    let config = AppConfig::load_or_default();
    let store = Arc::new(JsonFileStore::open(config.store_path()?)?);
    let clock = Arc::new(SystemClock);
    let audio = Arc::new(AudioContext::new(Arc::new(LogPlayer)));
    let scheduler = Scheduler::new(
        clock.clone(),
        Arc::new(ConsoleAlert),
        audio,
        config.alarm_sound.clone(),
    );
    let coordinator = Coordinator::new(
        Arc::clone(&store) as Arc<dyn StateStore>,
        scheduler,
        clock,
        config.defaults.clone(),
    );
    Ok((coordinator, store))
}
