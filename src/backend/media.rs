//! Local media handling: opening downloaded files with the platform
//! handler and playing voice notes through an external player process.

use std::{
    path::Path,
    process::{Child, Command, Stdio},
};

use anyhow::{Context, Result};

use crate::usecases::{
    contracts::ExternalOpener,
    playback::{AudioBackend, PlaybackError, PlaybackHandle},
};

/// Opens files with the desktop's default application.
pub struct SystemOpener;

impl ExternalOpener for SystemOpener {
    fn open(&self, path: &Path) -> Result<()> {
        open::that(path).with_context(|| format!("could not open {}", path.display()))
    }
}

/// Plays audio by spawning the configured player command with the file as
/// its single argument. Stopping kills the child process.
pub struct ProcessAudioBackend {
    player_command: String,
}

impl ProcessAudioBackend {
    pub fn new(player_command: &str) -> Self {
        Self {
            player_command: player_command.to_owned(),
        }
    }
}

pub struct ProcessPlaybackHandle {
    child: Child,
}

impl PlaybackHandle for ProcessPlaybackHandle {
    fn stop(&mut self) {
        if let Err(error) = self.child.kill() {
            tracing::debug!(%error, "audio player already exited");
        }
        let _ = self.child.wait();
    }
}

impl AudioBackend for ProcessAudioBackend {
    type Handle = ProcessPlaybackHandle;

    fn play(&self, path: &Path) -> Result<ProcessPlaybackHandle, PlaybackError> {
        let mut parts = self.player_command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| PlaybackError::BackendFailed("empty player command".to_owned()))?;

        let child = Command::new(program)
            .args(parts)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|error| PlaybackError::BackendFailed(error.to_string()))?;

        Ok(ProcessPlaybackHandle { child })
    }
}
