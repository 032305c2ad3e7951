//! Supervision of the muxer → player pipeline.
//!
//! At most one pipeline exists. Its handle lives behind a single mutex and
//! every compound operation (spawn-and-store, kill-and-clear) runs under it.
//! The player is owned by a waiter task; the muxer stays in the handle.

use crate::backend::{CommandSpec, PipelineLauncher};
use crate::display::Screen;
use crate::error::{PlayerError, Result};
use crate::playlist::{list_video_files, write_concat};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::process::Child;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct ActivePipeline {
    generation: u64,
    muxer: Child,
    cancel: CancellationToken,
    waiter: JoinHandle<()>,
}

type Slot = Arc<Mutex<Option<ActivePipeline>>>;

/// Starts, watches and stops the playback pipeline.
pub struct Supervisor {
    launcher: Arc<dyn PipelineLauncher>,
    screen: Screen,
    active: Slot,
    generation: AtomicU64,
}

impl Supervisor {
    pub fn new(launcher: Arc<dyn PipelineLauncher>, screen: Screen) -> Self {
        Self {
            launcher,
            screen,
            active: Arc::new(Mutex::new(None)),
            generation: AtomicU64::new(0),
        }
    }

    /// True while a pipeline is registered.
    pub async fn is_running(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Starts a pipeline looping over every video currently in `media_dir`.
    ///
    /// Writes the concat list, starts the muxer with its stdout piped into
    /// the player, then hands the player to a waiter task. If the player
    /// cannot start, the muxer is killed and no handle is stored.
    pub async fn start(&self, media_dir: &Path) -> Result<()> {
        let files = list_video_files(media_dir);
        if files.is_empty() {
            return Err(PlayerError::NoMedia(media_dir.display().to_string()));
        }
        let concat = write_concat(media_dir, &files)?;

        let mut slot = self.active.lock().await;
        if let Some(previous) = slot.take() {
            debug!("Replacing running pipeline");
            stop_pipeline(previous).await;
        }

        let muxer_spec = self.launcher.muxer(&concat);
        let mut muxer = spawn(&muxer_spec, Stdio::null(), Stdio::piped(), Stdio::null())?;

        let player_spec = self.launcher.player();
        let player = match muxer.stdout.take() {
            Some(stdout) => {
                let stdin: Stdio = stdout.try_into()?;
                spawn(&player_spec, stdin, Stdio::inherit(), Stdio::inherit())
            }
            None => Err(PlayerError::spawn(
                muxer_spec.display_name(),
                std::io::Error::other("muxer stdout not captured"),
            )),
        };
        let player = match player {
            Ok(child) => child,
            Err(e) => {
                kill_child(&mut muxer).await;
                return Err(e);
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        let waiter = tokio::spawn(watch_player(
            player,
            generation,
            cancel.clone(),
            Arc::clone(&self.active),
        ));

        *slot = Some(ActivePipeline {
            generation,
            muxer,
            cancel,
            waiter,
        });
        info!(
            files = files.len(),
            "Playback started ({} | {})",
            muxer_spec.display_name(),
            player_spec.display_name()
        );
        Ok(())
    }

    /// Stops the running pipeline, if any, then blanks the screen.
    ///
    /// The player is killed before the muxer and the handle is cleared before
    /// this returns.
    pub async fn teardown(&self) {
        {
            let mut slot = self.active.lock().await;
            if let Some(active) = slot.take() {
                stop_pipeline(active).await;
                info!("Playback stopped");
            }
        }
        self.screen.blank_async().await;
    }
}

fn spawn(spec: &CommandSpec, stdin: Stdio, stdout: Stdio, stderr: Stdio) -> Result<Child> {
    spec.to_command()
        .stdin(stdin)
        .stdout(stdout)
        .stderr(stderr)
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| PlayerError::spawn(spec.display_name(), e))
}

async fn kill_child(child: &mut Child) {
    if let Err(e) = child.kill().await {
        debug!("kill: {}", e);
    }
}

/// Cancels the waiter (which kills the player), then kills the muxer.
///
/// Must be called with the slot lock held and the pipeline already taken.
async fn stop_pipeline(mut active: ActivePipeline) {
    active.cancel.cancel();
    let _ = (&mut active.waiter).await;
    kill_child(&mut active.muxer).await;
}

/// Waits for the player to exit or for cancellation.
///
/// On a natural exit the muxer is killed and the slot cleared, unless a
/// newer pipeline took the slot or a teardown is already in progress.
async fn watch_player(
    mut player: Child,
    generation: u64,
    cancel: CancellationToken,
    active: Slot,
) {
    tokio::select! {
        status = player.wait() => {
            match status {
                Ok(status) => warn!("Player exited: {}", status),
                Err(e) => warn!("Player wait failed: {}", e),
            }
            tokio::select! {
                mut slot = active.lock() => {
                    let current = slot.as_ref().map(|p| p.generation) == Some(generation);
                    if current {
                        if let Some(mut finished) = slot.take() {
                            kill_child(&mut finished.muxer).await;
                        }
                    }
                }
                _ = cancel.cancelled() => {}
            }
        }
        _ = cancel.cancelled() => {
            kill_child(&mut player).await;
        }
    }
}
