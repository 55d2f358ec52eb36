//! Watch engine
//!
//! Owns the in-memory event list and drives two independent timers: a slow
//! one that fetches fresh data from the backend and a fast one that re-renders
//! so relative-time labels stay current between fetches. The timers share the
//! event list without synchronization because the engine owns it outright.

use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, UpcomingEvent};
use crate::config::Config;
use crate::store::{ChannelStore, Persistence, Provider};
use crate::view;

use super::EngineCommand;

/// The watch engine polls the backend and renders the bucketed video list
pub struct WatchEngine<P: Persistence> {
    /// Backend API client
    api: ApiClient,
    /// Tracked-channel store (read on every refresh, so edits from other
    /// invocations are picked up at the next fetch)
    store: ChannelStore<P>,
    /// Command receiver
    cmd_rx: mpsc::Receiver<EngineCommand>,
    /// Current event list; replaced wholesale on a successful fetch
    events: Vec<UpcomingEvent>,
    /// Seconds between backend fetches
    refresh_interval_secs: u64,
    /// Seconds between re-renders
    render_interval_secs: u64,
}

impl<P: Persistence> WatchEngine<P> {
    /// Create a new watch engine
    pub fn new(
        config: &Config,
        api: ApiClient,
        store: ChannelStore<P>,
        cmd_rx: mpsc::Receiver<EngineCommand>,
    ) -> Self {
        Self {
            api,
            store,
            cmd_rx,
            events: Vec::new(),
            refresh_interval_secs: config.watch.refresh_interval_secs,
            render_interval_secs: config.watch.render_interval_secs,
        }
    }

    /// Run the engine main loop
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Watch loop starting (refresh every {}s, render every {}s)",
            self.refresh_interval_secs, self.render_interval_secs
        );

        // First fetch and render happen immediately; the timers only cover
        // the steady state. interval_at delays the first tick, interval()
        // would fire it at once.
        self.refresh().await;
        self.render();

        let refresh_period = Duration::from_secs(self.refresh_interval_secs);
        let render_period = Duration::from_secs(self.render_interval_secs);
        let mut refresh_timer =
            tokio::time::interval_at(Instant::now() + refresh_period, refresh_period);
        let mut render_timer =
            tokio::time::interval_at(Instant::now() + render_period, render_period);

        loop {
            tokio::select! {
                // Handle commands
                Some(cmd) = self.cmd_rx.recv() => {
                    match cmd {
                        EngineCommand::Refresh => {
                            info!("Manual refresh requested");
                            self.refresh().await;
                            self.render();
                        }
                        EngineCommand::Shutdown => {
                            info!("Shutdown command received");
                            break;
                        }
                    }
                }

                // Fetch fresh video data
                _ = refresh_timer.tick() => {
                    self.refresh().await;
                    self.render();
                }

                // Re-render so relative-time labels stay current
                _ = render_timer.tick() => {
                    self.render();
                }
            }
        }

        info!("Watch loop stopped");
        Ok(())
    }

    /// Fetch the combined video list for both tracked-channel lists.
    ///
    /// With nothing tracked the event list is cleared and no request is
    /// made. On success the list is replaced wholesale; on failure the
    /// previous list is kept and re-rendered stale.
    async fn refresh(&mut self) {
        let yt_list = self.store.get(Provider::YouTube);
        let tw_list = self.store.get(Provider::Twitch);

        if yt_list.is_empty() && tw_list.is_empty() {
            debug!("No channels tracked, skipping fetch");
            self.events.clear();
            return;
        }

        debug!(
            "Updating video info for {} YouTube / {} Twitch channels",
            yt_list.len(),
            tw_list.len()
        );

        match self.api.video_data(&yt_list, &tw_list).await {
            Ok(events) => {
                debug!("Video list replaced ({} events)", events.len());
                self.events = events;
            }
            Err(e) => {
                warn!("Video fetch failed, keeping previous data: {}", e);
            }
        }
    }

    /// Render the current event list against the current wall clock
    fn render(&self) {
        let view = view::build_view(&self.events, chrono::Utc::now());
        view::render(&view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPersistence;
    use crate::watch::create_engine_channels;

    fn engine_with_store(
        store: ChannelStore<MemoryPersistence>,
    ) -> WatchEngine<MemoryPersistence> {
        // Unconfigured client: any attempted request would fail loudly
        let config = Config::default();
        let api = ApiClient::new(&config);
        let (_cmd_tx, cmd_rx) = create_engine_channels();
        WatchEngine::new(&config, api, store, cmd_rx)
    }

    #[tokio::test]
    async fn refresh_with_empty_store_clears_events_without_network() {
        let store = ChannelStore::new(MemoryPersistence::default());
        let mut engine = engine_with_store(store);
        engine.events = vec![crate::view::tests_support::sample_event()];

        // Had a fetch been attempted it would have failed (unconfigured
        // client) and kept the stale event; the empty store must clear it
        // locally instead.
        engine.refresh().await;
        assert!(engine.events.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_events() {
        let mut store = ChannelStore::new(MemoryPersistence::default());
        store.add(Provider::YouTube, "somechannel").unwrap();
        let mut engine = engine_with_store(store);

        // Pretend an earlier fetch succeeded, then the endpoint goes away
        // (the test client was never configured, so the fetch errors).
        let stale = crate::view::tests_support::sample_event();
        engine.events = vec![stale];

        engine.refresh().await;
        assert_eq!(engine.events.len(), 1);
    }

    #[tokio::test]
    async fn refresh_clears_stale_events_when_last_channel_is_removed() {
        let mut store = ChannelStore::new(MemoryPersistence::default());
        store.add(Provider::Twitch, "someone").unwrap();
        store.remove(Provider::Twitch, "someone").unwrap();
        let mut engine = engine_with_store(store);
        engine.events = vec![crate::view::tests_support::sample_event()];

        engine.refresh().await;
        assert!(engine.events.is_empty());
    }
}
