//! Watch loop - periodic fetch and render of the upcoming video list

mod engine;

pub use engine::WatchEngine;

use tokio::sync::mpsc;

/// Commands that can be sent to the watch engine
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Fetch fresh video data now, outside the regular schedule
    Refresh,
    /// Shutdown the engine
    Shutdown,
}

/// Create the command channel for the engine
pub fn create_engine_channels() -> (mpsc::Sender<EngineCommand>, mpsc::Receiver<EngineCommand>) {
    mpsc::channel(8)
}
