//! Sync loop: fetch the manifest, mirror it, restart playback.

use crate::playback::Playback;
use crate::schedule::{SyncSchedule, SyncTrigger};
use chrono::Local;
use opicache::Reconciler;
use opiapi::ControlPlane;
use opiconfig::TokenStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const SYNC_TICK: Duration = Duration::from_secs(60);

/// Delay before re-reading an absent token on the very first tick.
pub const FIRST_TICK_GRACE: Duration = Duration::from_secs(2);

/// How a [`SyncController::sync_and_play`] round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    MissingToken,
    /// Manifest not obtained; the running pipeline was left alone.
    FetchFailed,
    /// Pipeline stopped, nothing downloaded, nothing restarted.
    NothingDownloaded,
    StartFailed,
    Started { downloaded: usize },
}

pub struct SyncController {
    api: Arc<dyn ControlPlane>,
    tokens: TokenStore,
    reconciler: Reconciler,
    playback: Arc<dyn Playback>,
}

impl SyncController {
    pub fn new(
        api: Arc<dyn ControlPlane>,
        tokens: TokenStore,
        reconciler: Reconciler,
        playback: Arc<dyn Playback>,
    ) -> Self {
        Self {
            api,
            tokens,
            reconciler,
            playback,
        }
    }

    /// One full round: manifest, teardown, reconcile, restart.
    ///
    /// Teardown only happens once a manifest is in hand, so a control-plane
    /// failure never blanks a playing screen. An empty manifest is a valid
    /// answer: playback stops and the directory is emptied.
    pub async fn sync_and_play(&self) -> SyncOutcome {
        let Some(token) = self.tokens.load() else {
            warn!("Sync skipped: no token");
            return SyncOutcome::MissingToken;
        };

        let items = match self.api.fetch_media(&token).await {
            Ok(items) => items,
            Err(e) if e.is_unauthorized() => {
                error!("Fetch media: {} (token kept, check the device group)", e);
                return SyncOutcome::FetchFailed;
            }
            Err(e) => {
                error!("Fetch media failed: {}", e);
                return SyncOutcome::FetchFailed;
            }
        };
        info!(items = items.len(), "Playlist received");

        self.playback.teardown().await;

        let downloaded = self.reconciler.reconcile(&items).await;
        if downloaded.is_empty() {
            warn!("No media downloaded, playback not restarted");
            return SyncOutcome::NothingDownloaded;
        }

        self.playback.prepare_screen().await;
        match self.playback.start(self.reconciler.dir()).await {
            Ok(()) => SyncOutcome::Started {
                downloaded: downloaded.len(),
            },
            Err(e) => {
                error!("Playback start failed: {}", e);
                SyncOutcome::StartFailed
            }
        }
    }

    /// Sync loop: samples the schedule every [`SYNC_TICK`] and whenever
    /// `token_ready` fires. Runs until `shutdown` is cancelled.
    pub async fn run(&self, token_ready: Arc<Notify>, shutdown: CancellationToken) {
        let mut schedule = SyncSchedule::new();
        let mut ticker = interval(SYNC_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut first_tick = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
                _ = token_ready.notified() => debug!("Token available"),
            }

            let mut token_present = self.tokens.load().is_some();
            if first_tick && !token_present {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = sleep(FIRST_TICK_GRACE) => {}
                }
                token_present = self.tokens.load().is_some();
            }
            first_tick = false;

            if let Some(trigger) = schedule.poll(Local::now().naive_local(), token_present) {
                match trigger {
                    SyncTrigger::FirstToken => info!("First token seen, syncing"),
                    SyncTrigger::Daily(date) => info!(%date, "Daily sync"),
                }
                let outcome = self.sync_and_play().await;
                debug!(?outcome, "Sync finished");
            } else if !schedule.is_armed() {
                debug!("No token yet");
            }
        }
    }
}
