//! Track list with wrap-around navigation and track-change observers.

use crate::error::EngineError;
use crate::transport::Transport;
use rand::Rng;
use serde::Deserialize;
use std::panic::{catch_unwind, AssertUnwindSafe};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    /// Advisory; the transport's reported duration wins.
    #[serde(default)]
    pub duration: Option<f64>,
    pub file_path: String,
}

#[derive(Deserialize)]
struct PlaylistFile {
    tracks: Vec<Track>,
}

pub type TrackObserver = Box<dyn FnMut(&Track) -> anyhow::Result<()>>;

/// Handle returned by [`Playlist::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

#[derive(Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    current: usize,
    observers: Vec<(Subscription, TrackObserver)>,
    next_subscription: u64,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            ..Self::default()
        }
    }

    /// Parse `{ "tracks": [...] }`.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let file: PlaylistFile = serde_json::from_str(json)?;
        log::info!("[playlist] loaded {} tracks", file.tracks.len());
        Ok(Self::new(file.tracks))
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.current)
    }

    pub fn next_index(&self) -> Option<usize> {
        (!self.is_empty()).then(|| (self.current + 1) % self.len())
    }

    pub fn previous_index(&self) -> Option<usize> {
        (!self.is_empty()).then(|| (self.current + self.len() - 1) % self.len())
    }

    /// A random index other than the current one (the current one if it is
    /// the only track).
    pub fn random_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        match self.len() {
            0 => None,
            1 => Some(0),
            n => {
                let pick = rng.gen_range(0..n - 1);
                Some(if pick >= self.current { pick + 1 } else { pick })
            }
        }
    }

    /// Point the transport at track `index` and notify observers.
    pub fn load<T: Transport + ?Sized>(
        &mut self,
        index: usize,
        transport: &mut T,
    ) -> Result<&Track, EngineError> {
        if self.is_empty() {
            return Err(EngineError::EmptyPlaylist);
        }
        if index >= self.len() {
            return Err(EngineError::TrackOutOfRange {
                index,
                len: self.len(),
            });
        }
        self.current = index;
        transport.load(&self.tracks[index].file_path);
        log::info!(
            "[playlist] track {}: {} - {}",
            index,
            self.tracks[index].artist,
            self.tracks[index].title
        );
        self.notify();
        Ok(&self.tracks[index])
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Track) -> anyhow::Result<()> + 'static) -> Subscription {
        self.next_subscription += 1;
        let sub = Subscription(self.next_subscription);
        self.observers.push((sub, Box::new(observer)));
        sub
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(s, _)| *s != subscription);
        self.observers.len() != before
    }

    // A failing observer is logged and skipped; the rest still run.
    fn notify(&mut self) {
        let Some(track) = self.tracks.get(self.current) else {
            return;
        };
        for (sub, observer) in &mut self.observers {
            match catch_unwind(AssertUnwindSafe(|| observer(track))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::error!("[playlist] observer {:?} failed: {e:#}", sub),
                Err(_) => log::error!("[playlist] observer {:?} panicked", sub),
            }
        }
    }
}
