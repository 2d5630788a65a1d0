//! Voice message playback with a single active handle.
//!
//! Starting playback of a new voice message stops and releases any
//! currently playing one first.

use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The audio backend could not start playback.
    BackendFailed(String),
}

pub trait PlaybackHandle {
    fn stop(&mut self);
}

pub trait AudioBackend {
    type Handle: PlaybackHandle;

    fn play(&self, path: &Path) -> Result<Self::Handle, PlaybackError>;
}

pub struct VoicePlayer<B: AudioBackend> {
    backend: B,
    active: Option<B::Handle>,
}

impl<B: AudioBackend> VoicePlayer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            active: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    /// Stops the current playback, if any, then starts the new one.
    pub fn play(&mut self, path: &Path) -> Result<(), PlaybackError> {
        self.stop();
        self.active = Some(self.backend.play(path)?);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(mut handle) = self.active.take() {
            handle.stop();
        }
    }
}

impl<B: AudioBackend> Drop for VoicePlayer<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        rc::Rc,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[derive(Default)]
    struct Counters {
        started: AtomicUsize,
        stopped: AtomicUsize,
    }

    struct StubHandle {
        counters: Rc<Counters>,
        stopped: bool,
    }

    impl PlaybackHandle for StubHandle {
        fn stop(&mut self) {
            if !self.stopped {
                self.stopped = true;
                self.counters.stopped.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    struct StubBackend {
        counters: Rc<Counters>,
        fail: bool,
    }

    impl AudioBackend for StubBackend {
        type Handle = StubHandle;

        fn play(&self, _path: &Path) -> Result<StubHandle, PlaybackError> {
            if self.fail {
                return Err(PlaybackError::BackendFailed("no player".to_owned()));
            }
            self.counters.started.fetch_add(1, Ordering::SeqCst);
            Ok(StubHandle {
                counters: Rc::clone(&self.counters),
                stopped: false,
            })
        }
    }

    fn player(fail: bool) -> (VoicePlayer<StubBackend>, Rc<Counters>) {
        let counters = Rc::new(Counters::default());
        (
            VoicePlayer::new(StubBackend {
                counters: Rc::clone(&counters),
                fail,
            }),
            counters,
        )
    }

    #[test]
    fn starting_a_second_playback_stops_the_first() {
        let (mut player, counters) = player(false);

        player.play(&PathBuf::from("a.ogg")).expect("first play");
        player.play(&PathBuf::from("b.ogg")).expect("second play");

        assert_eq!(counters.started.load(Ordering::SeqCst), 2);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
        assert!(player.is_playing());
    }

    #[test]
    fn stop_releases_the_handle_once() {
        let (mut player, counters) = player(false);
        player.play(&PathBuf::from("a.ogg")).expect("play");

        player.stop();
        player.stop();

        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
        assert!(!player.is_playing());
    }

    #[test]
    fn failed_start_leaves_nothing_active() {
        let (mut player, _) = player(true);

        let result = player.play(&PathBuf::from("a.ogg"));

        assert!(result.is_err());
        assert!(!player.is_playing());
    }

    #[test]
    fn drop_stops_active_playback() {
        let (mut player, counters) = player(false);
        player.play(&PathBuf::from("a.ogg")).expect("play");

        drop(player);

        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
    }
}
