//! Audio session: the graph plus everything that lives as long as it does.
//!
//! Created inside the first user gesture and dropped on explicit teardown.
//! Until then the engine runs with no session and every audio call is
//! skipped.

use crate::audio::AudioGraph;
use crate::sfx::SfxSynth;
use crate::transport::Direction;

pub struct AudioSession<G: AudioGraph> {
    graph: G,
    sfx: SfxSynth<G>,
}

impl<G: AudioGraph> AudioSession<G> {
    pub fn new(graph: G, seed: u64) -> Self {
        Self {
            graph,
            sfx: SfxSynth::new(seed),
        }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn sfx(&self) -> &SfxSynth<G> {
        &self.sfx
    }

    /// Build the noise buffer ahead of the first effect.
    pub fn prepare(&mut self) {
        if let Err(e) = self.sfx.ensure_noise_buffer(&mut self.graph) {
            log::warn!("[sfx] noise buffer unavailable: {e}");
        }
    }

    pub fn play_whoosh(&mut self, direction: Direction, duration: f64, peak: f32) {
        if let Err(e) = self.sfx.play_whoosh(&mut self.graph, direction, duration, peak) {
            log::warn!("[sfx] whoosh failed: {e}");
        }
    }

    pub fn start_sustained(&mut self, direction: Direction) {
        if let Err(e) = self.sfx.play_sustained_whoosh(&mut self.graph, direction) {
            log::warn!("[sfx] sustained whoosh failed: {e}");
        }
    }

    pub fn stop_sustained(&mut self) {
        if let Err(e) = self.sfx.stop_sustained_whoosh(&mut self.graph) {
            log::warn!("[sfx] stopping sustained whoosh failed: {e}");
        }
    }

    /// Silence anything still looping and hand the graph back.
    pub fn close(mut self) -> G {
        self.stop_sustained();
        self.graph
    }
}
