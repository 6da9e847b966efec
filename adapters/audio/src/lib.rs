#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Voice playback contracts for Voice Garden adapters.
//!
//! The gameplay core only hands out playback keys. Backends decide whether a
//! key is playable and own the lifecycle of the handles they return; callers
//! stop every handle they started.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};
use voice_garden_core::VoiceClip;
use voice_garden_system_catalog::Catalog;

/// Opaque identifier of a sound started by a playback backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceHandle(u64);

impl VoiceHandle {
    /// Numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Audio subsystem able to play preloaded voice clips.
pub trait VoicePlayback {
    /// Starts the sound registered under `playback_key`.
    ///
    /// Returns `None` when the key was never preloaded.
    fn start(&mut self, playback_key: &str) -> Option<VoiceHandle>;

    /// Stops and releases a previously started sound.
    fn stop(&mut self, handle: VoiceHandle);
}

/// Starts the clip announcing a falling cluster, if the backend has it.
pub fn start_cluster_voice<P>(playback: &mut P, clip: &VoiceClip) -> Option<VoiceHandle>
where
    P: VoicePlayback + ?Sized,
{
    let handle = playback.start(clip.playback_key());
    if handle.is_none() {
        warn!(key = clip.playback_key(), "voice clip not preloaded");
    }
    handle
}

/// Stops the voice of a cluster that landed or was discarded.
pub fn stop_cluster_voice<P>(playback: &mut P, handle: Option<VoiceHandle>)
where
    P: VoicePlayback + ?Sized,
{
    if let Some(handle) = handle {
        playback.stop(handle);
    }
}

/// In-memory backend that tracks which keys are loaded and which play.
#[derive(Debug, Default)]
pub struct PreloadedVoices {
    preloaded: HashSet<String>,
    playing: BTreeMap<VoiceHandle, String>,
    next_handle: u64,
    started: u64,
}

impl PreloadedVoices {
    /// Creates a backend with nothing preloaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with every clip of the catalog preloaded.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut voices = Self::new();
        for clip in catalog.iter() {
            voices.preload(clip.playback_key());
        }
        voices
    }

    /// Registers a playback key as playable.
    pub fn preload(&mut self, playback_key: &str) {
        let _ = self.preloaded.insert(playback_key.to_owned());
    }

    /// Whether the key was preloaded.
    #[must_use]
    pub fn is_preloaded(&self, playback_key: &str) -> bool {
        self.preloaded.contains(playback_key)
    }

    /// Key of the sound behind `handle`, while it plays.
    #[must_use]
    pub fn playing(&self, handle: VoiceHandle) -> Option<&str> {
        self.playing.get(&handle).map(String::as_str)
    }

    /// Number of sounds currently playing.
    #[must_use]
    pub fn playing_count(&self) -> usize {
        self.playing.len()
    }

    /// Number of sounds started over the backend's lifetime.
    #[must_use]
    pub const fn started_count(&self) -> u64 {
        self.started
    }
}

impl VoicePlayback for PreloadedVoices {
    fn start(&mut self, playback_key: &str) -> Option<VoiceHandle> {
        if !self.is_preloaded(playback_key) {
            return None;
        }

        let handle = VoiceHandle(self.next_handle);
        self.next_handle += 1;
        self.started += 1;
        let _ = self.playing.insert(handle, playback_key.to_owned());
        debug!(key = playback_key, handle = handle.get(), "voice started");
        Some(handle)
    }

    fn stop(&mut self, handle: VoiceHandle) {
        if self.playing.remove(&handle).is_some() {
            debug!(handle = handle.get(), "voice stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_are_unavailable() {
        let mut voices = PreloadedVoices::new();
        voices.preload("voice:S01_D1_F_PP+100p_VTL-20p");

        assert!(voices.start("voice:missing").is_none());
        assert_eq!(voices.playing_count(), 0);
        assert_eq!(voices.started_count(), 0);
    }

    #[test]
    fn handles_are_unique_and_released_on_stop() {
        let mut voices = PreloadedVoices::new();
        voices.preload("voice:a");

        let first = voices.start("voice:a").expect("preloaded key plays");
        let second = voices.start("voice:a").expect("preloaded key plays");
        assert_ne!(first, second);
        assert_eq!(voices.playing(first), Some("voice:a"));
        assert_eq!(voices.playing_count(), 2);

        voices.stop(first);
        voices.stop(first);
        assert_eq!(voices.playing(first), None);
        assert_eq!(voices.playing_count(), 1);
        assert_eq!(voices.started_count(), 2);
    }

    #[test]
    fn cluster_voice_round_trip_uses_the_playback_key() {
        let catalog = Catalog::builtin().expect("builtin catalog parses");
        let mut voices = PreloadedVoices::from_catalog(catalog);
        let clip = catalog.first();

        let handle = start_cluster_voice(&mut voices, clip);
        let playing = handle.and_then(|handle| voices.playing(handle));
        assert_eq!(playing, Some(clip.playback_key()));

        stop_cluster_voice(&mut voices, handle);
        assert_eq!(voices.playing_count(), 0);

        stop_cluster_voice(&mut voices, None);
        assert_eq!(voices.playing_count(), 0);
    }
}
