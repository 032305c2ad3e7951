//! Startup checks run once before the agent loop.

use crate::backend::PlayerBackend;
use crate::display::set_resolution;
use crate::error::{PlayerError, Result};
use crate::x11::DisplayEnv;
use opiutils::{find_first_program, find_program};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// ALSA card list.
pub const SOUND_CARDS: &str = "/proc/asound/cards";

const MUXER_PROGRAM: &str = "ffmpeg";

/// What the preflight found on this machine.
#[derive(Debug, Clone)]
pub struct Preflight {
    pub backend: PlayerBackend,
    pub player_path: PathBuf,
    pub muxer_path: PathBuf,
}

/// Locates mplayer (preferred) or mpv.
pub fn find_player() -> Result<(PlayerBackend, PathBuf)> {
    let (name, path) =
        find_first_program(&PlayerBackend::PREFERENCE).ok_or(PlayerError::MissingPlayer)?;
    let backend = PlayerBackend::from_program(name).ok_or(PlayerError::MissingPlayer)?;
    Ok((backend, path))
}

/// Locates ffmpeg.
pub fn find_muxer() -> Result<PathBuf> {
    find_program(MUXER_PROGRAM).ok_or(PlayerError::MissingMuxer)
}

/// True when the ALSA card list names at least one card.
pub fn sound_cards_present(cards: &Path) -> bool {
    match std::fs::read_to_string(cards) {
        Ok(content) => {
            let content = content.trim();
            !content.is_empty() && !content.contains("no soundcards")
        }
        Err(_) => false,
    }
}

/// Runs every startup check.
///
/// Missing player or muxer binaries are fatal; a missing sound card only
/// warns. When X11 is reachable the output is switched to 1280x720.
pub async fn run_preflight(display: &DisplayEnv) -> Result<Preflight> {
    let (backend, player_path) = find_player()?;
    info!(path = %player_path.display(), "Check: {} found", backend);

    let muxer_path = find_muxer()?;
    info!(path = %muxer_path.display(), "Check: ffmpeg found");

    if sound_cards_present(Path::new(SOUND_CARDS)) {
        info!("Check: sound cards detected");
    } else {
        warn!("No sound card found (aplay -l); audio may not work");
    }

    if display.child_display().is_some() {
        set_resolution(display).await;
    } else {
        info!("Check: X11 not active, video goes to the framebuffer");
    }

    Ok(Preflight {
        backend,
        player_path,
        muxer_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_cards_present() {
        let dir = tempfile::tempdir().unwrap();
        let cards = dir.path().join("cards");

        assert!(!sound_cards_present(&cards));

        std::fs::write(&cards, "--- no soundcards ---\n").unwrap();
        assert!(!sound_cards_present(&cards));

        std::fs::write(&cards, "   \n").unwrap();
        assert!(!sound_cards_present(&cards));

        std::fs::write(
            &cards,
            " 0 [audiocodec     ]: audiocodec - audiocodec\n 1 [ahubhdmi       ]: ahubhdmi - ahubhdmi\n",
        )
        .unwrap();
        assert!(sound_cards_present(&cards));
    }
}
