//! Screen and pipeline operations seen by the sync controller.

use async_trait::async_trait;
use opiplayer::{DisplayEnv, Screen, Supervisor, set_resolution};
use std::path::Path;

#[async_trait]
pub trait Playback: Send + Sync {
    /// Stops the running pipeline, if any.
    async fn teardown(&self);

    /// Readies the output before a new pipeline: 1280x720, blank screen.
    async fn prepare_screen(&self);

    /// Starts a pipeline over the videos in `media_dir`.
    async fn start(&self, media_dir: &Path) -> opiplayer::Result<()>;
}

/// [`Playback`] backed by the process supervisor.
pub struct SupervisedPlayback {
    supervisor: Supervisor,
    display: DisplayEnv,
    screen: Screen,
}

impl SupervisedPlayback {
    pub fn new(supervisor: Supervisor, display: DisplayEnv, screen: Screen) -> Self {
        Self {
            supervisor,
            display,
            screen,
        }
    }
}

#[async_trait]
impl Playback for SupervisedPlayback {
    async fn teardown(&self) {
        self.supervisor.teardown().await;
    }

    async fn prepare_screen(&self) {
        set_resolution(&self.display).await;
        self.screen.blank_async().await;
    }

    async fn start(&self, media_dir: &Path) -> opiplayer::Result<()> {
        self.supervisor.start(media_dir).await
    }
}
