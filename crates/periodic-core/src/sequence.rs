//! Demo playback: step through the first elements one per interval.

use crate::constants::{SEQUENCE_HIGHLIGHT_SEC, SEQUENCE_INTERVAL_SEC, SEQUENCE_LENGTH};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ElementSequence {
    steps: Vec<u32>,
    next: usize,
    accum: f64,
    since_step: f64,
    interval: f64,
    playing: bool,
}

impl Default for ElementSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementSequence {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            next: 0,
            accum: 0.0,
            since_step: 0.0,
            interval: SEQUENCE_INTERVAL_SEC as f64,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Begin with the first [`SEQUENCE_LENGTH`] atomic numbers given. The first
    /// step fires on the next `tick`.
    pub fn start<I: IntoIterator<Item = u32>>(&mut self, atomic_numbers: I) {
        self.steps = atomic_numbers.into_iter().take(SEQUENCE_LENGTH).collect();
        self.next = 0;
        self.accum = self.interval;
        self.since_step = 0.0;
        self.playing = !self.steps.is_empty();
        if self.playing {
            log::info!("[sequence] playing {} element(s)", self.steps.len());
        }
    }

    pub fn stop(&mut self) {
        if self.playing {
            log::info!("[sequence] stopped at step {}", self.next);
        }
        self.playing = false;
    }

    /// Advance by `dt`, appending the atomic number of every step that came due.
    pub fn tick(&mut self, dt: Duration, out_steps: &mut Vec<u32>) {
        if !self.playing {
            return;
        }
        let dt = dt.as_secs_f64();
        self.accum += dt;
        self.since_step += dt;
        while self.accum >= self.interval {
            self.accum -= self.interval;
            match self.steps.get(self.next) {
                Some(&n) => {
                    out_steps.push(n);
                    self.next += 1;
                    self.since_step = self.accum;
                }
                None => {
                    self.playing = false;
                    return;
                }
            }
        }
    }

    /// Element currently emphasised, cleared shortly before the next step.
    pub fn highlighted(&self) -> Option<u32> {
        if !self.playing || self.next == 0 || self.since_step >= SEQUENCE_HIGHLIGHT_SEC as f64 {
            return None;
        }
        self.steps.get(self.next - 1).copied()
    }
}
