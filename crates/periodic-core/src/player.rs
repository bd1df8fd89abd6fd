//! Procedural tone player with an explicit active-tone registry.
//!
//! The player is generic over an [`AudioBackend`] that owns the real
//! oscillator/gain nodes (WebAudio in the browser, a software mixer natively).
//! Deferred cleanup runs through a [`TaskQueue`] drained by [`TonePlayer::poll`]
//! from the host's frame loop, so no timers are left behind and tests can
//! drive time directly.
//!
//! Registry rules:
//! - at most one tone per frequency; a new tone at a busy frequency stops the old one
//! - `stop` removes the entry immediately and releases the nodes after a short fade
//! - natural expiry removes the entry when the scheduled stop time passes

use crate::constants::{DEFAULT_VOLUME, STOP_FADE_SEC, STOP_TAIL_SEC};
use crate::envelope::Envelope;
use crate::scheduler::{TaskId, TaskQueue};
use crate::tone::{ToneRequest, Waveform};
use fnv::FnvHashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
    #[error("failed to create {kind} node: {reason}")]
    NodeCreation { kind: &'static str, reason: String },
    #[error("audio output error: {0}")]
    Output(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputState {
    Running,
    Suspended,
    Closed,
}

/// Everything a backend needs to create and schedule one oscillator/gain pair.
#[derive(Clone, Debug)]
pub struct VoiceSpec {
    pub frequency_hz: f32,
    pub waveform: Waveform,
    pub envelope: Envelope,
    pub start_at: f64,
    pub stop_at: f64,
}

/// Platform audio graph as seen by the player.
pub trait AudioBackend {
    type Voice;

    /// Output clock in seconds.
    fn current_time(&self) -> f64;
    fn state(&self) -> OutputState;
    fn resume(&mut self) -> Result<(), AudioError>;
    fn set_master_gain(&mut self, gain: f32);
    /// Create oscillator -> gain -> master, apply the envelope, start at
    /// `start_at` and schedule the oscillator stop at `stop_at`.
    fn start_voice(&mut self, spec: &VoiceSpec) -> Result<Self::Voice, AudioError>;
    /// Ramp the voice's gain from its current value to 0 over `[from, until]`.
    fn fade_out(&mut self, voice: &mut Self::Voice, from: f64, until: f64);
    /// Stop the oscillator if still running and disconnect both nodes.
    fn release(&mut self, voice: Self::Voice);
}

/// Returned by a successful [`TonePlayer::play`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneHandle {
    pub frequency_hz: f32,
    pub started_at: f64,
    pub stop_at: f64,
    pub generation: u64,
}

struct ActiveTone<V> {
    voice: V,
    generation: u64,
    frequency_hz: f32,
    stop_at: f64,
    expiry: TaskId,
}

enum ToneTask {
    Expire { key: u32, generation: u64 },
    Release { fade_id: u64 },
}

#[inline]
fn frequency_key(frequency_hz: f32) -> u32 {
    // +0.0 and -0.0 never reach here; frequencies are validated positive.
    frequency_hz.to_bits()
}

pub struct TonePlayer<B: AudioBackend> {
    backend: Option<B>,
    warned: bool,
    active: FnvHashMap<u32, ActiveTone<B::Voice>>,
    fading: FnvHashMap<u64, B::Voice>,
    tasks: TaskQueue<ToneTask>,
    next_generation: u64,
    next_fade_id: u64,
    volume: f32,
}

impl<B: AudioBackend> TonePlayer<B> {
    pub fn new(mut backend: B) -> Self {
        backend.set_master_gain(DEFAULT_VOLUME);
        Self::with_backend(Some(backend))
    }

    /// Degraded player: every `play` is a no-op and the first one logs a warning.
    pub fn unavailable() -> Self {
        Self::with_backend(None)
    }

    /// Build from a backend constructor result, warning once on failure.
    pub fn from_backend(result: Result<B, AudioError>) -> Self {
        match result {
            Ok(backend) => Self::new(backend),
            Err(e) => {
                log::warn!("[audio] {}; tone playback disabled", e);
                let mut player = Self::unavailable();
                player.warned = true;
                player
            }
        }
    }

    fn with_backend(backend: Option<B>) -> Self {
        Self {
            backend,
            warned: false,
            active: FnvHashMap::default(),
            fading: FnvHashMap::default(),
            tasks: TaskQueue::new(),
            next_generation: 0,
            next_fade_id: 0,
            volume: DEFAULT_VOLUME,
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, frequency_hz: f32) -> bool {
        self.active.contains_key(&frequency_key(frequency_hz))
    }

    /// Active frequencies in ascending order.
    pub fn active_frequencies(&self) -> Vec<f32> {
        let mut freqs: Vec<f32> = self.active.values().map(|t| t.frequency_hz).collect();
        freqs.sort_by(f32::total_cmp);
        freqs
    }

    /// Scheduled stop time of the tone at `frequency_hz`, if one is active.
    pub fn stop_time(&self, frequency_hz: f32) -> Option<f64> {
        self.active
            .get(&frequency_key(frequency_hz))
            .map(|t| t.stop_at)
    }

    /// Voices fading out after an explicit stop, not yet released.
    pub fn fading_count(&self) -> usize {
        self.fading.len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Start a tone, replacing any tone already sounding at the same frequency.
    pub fn play(&mut self, request: ToneRequest) -> Option<ToneHandle> {
        if self.backend.is_none() {
            self.warn_unavailable();
            return None;
        }
        let Some(req) = request.sanitized() else {
            log::warn!(
                "[audio] ignoring tone with invalid frequency {}",
                request.frequency_hz
            );
            return None;
        };
        let key = frequency_key(req.frequency_hz);
        self.stop_key(key);

        let backend = self.backend.as_mut()?;
        let now = backend.current_time();
        let envelope = Envelope::attack_release(
            now,
            req.volume,
            req.attack_sec as f64,
            req.release_sec as f64,
        );
        let stop_at = envelope.end_time() + STOP_TAIL_SEC;
        let spec = VoiceSpec {
            frequency_hz: req.frequency_hz,
            waveform: req.waveform,
            envelope,
            start_at: now,
            stop_at,
        };
        let voice = match backend.start_voice(&spec) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("[audio] could not start tone at {:.2} Hz: {}", req.frequency_hz, e);
                return None;
            }
        };

        let generation = self.next_generation;
        self.next_generation += 1;
        let expiry = self
            .tasks
            .schedule(stop_at, ToneTask::Expire { key, generation });
        self.active.insert(
            key,
            ActiveTone {
                voice,
                generation,
                frequency_hz: req.frequency_hz,
                stop_at,
                expiry,
            },
        );
        log::debug!(
            "[audio] play {:.2} Hz ({}) until {:.3}",
            req.frequency_hz,
            req.waveform.as_str(),
            stop_at
        );
        Some(ToneHandle {
            frequency_hz: req.frequency_hz,
            started_at: now,
            stop_at,
            generation,
        })
    }

    /// Fade out and deregister the tone at `frequency_hz`. Returns `false` when
    /// nothing was sounding there.
    pub fn stop(&mut self, frequency_hz: f32) -> bool {
        self.stop_key(frequency_key(frequency_hz))
    }

    pub fn stop_all(&mut self) {
        let keys: Vec<u32> = self.active.keys().copied().collect();
        for key in keys {
            self.stop_key(key);
        }
    }

    fn stop_key(&mut self, key: u32) -> bool {
        let Some(tone) = self.active.remove(&key) else {
            return false;
        };
        self.tasks.cancel(tone.expiry);
        let Some(backend) = self.backend.as_mut() else {
            return true;
        };
        let now = backend.current_time();
        let mut voice = tone.voice;
        backend.fade_out(&mut voice, now, now + STOP_FADE_SEC);
        let fade_id = self.next_fade_id;
        self.next_fade_id += 1;
        self.fading.insert(fade_id, voice);
        self.tasks
            .schedule(now + STOP_FADE_SEC, ToneTask::Release { fade_id });
        true
    }

    /// Run cleanup that has come due on the backend clock. Returns how many
    /// voices were released.
    pub fn poll(&mut self) -> usize {
        let Some(backend) = self.backend.as_mut() else {
            return 0;
        };
        let now = backend.current_time();
        let mut released = 0;
        while let Some(task) = self.tasks.pop_due(now) {
            match task {
                ToneTask::Expire { key, generation } => {
                    let current = self
                        .active
                        .get(&key)
                        .is_some_and(|t| t.generation == generation);
                    if current {
                        if let Some(tone) = self.active.remove(&key) {
                            backend.release(tone.voice);
                            released += 1;
                        }
                    }
                }
                ToneTask::Release { fade_id } => {
                    if let Some(voice) = self.fading.remove(&fade_id) {
                        backend.release(voice);
                        released += 1;
                    }
                }
            }
        }
        released
    }

    /// Release every voice immediately and drop all pending cleanup. Used on
    /// view teardown; safe to call repeatedly.
    ///
    /// Unlike [`stop_all`](Self::stop_all) there is no fade: voices are cut
    /// at once, fading ones included, so a sounding tone may click.
    pub fn close(&mut self) {
        self.tasks.drain();
        let Some(backend) = self.backend.as_mut() else {
            self.active.clear();
            self.fading.clear();
            return;
        };
        for (_, tone) in self.active.drain() {
            backend.release(tone.voice);
        }
        for (_, voice) in self.fading.drain() {
            backend.release(voice);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        let v = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            DEFAULT_VOLUME
        };
        self.volume = v;
        if let Some(backend) = self.backend.as_mut() {
            backend.set_master_gain(v);
        }
    }

    /// Resume a suspended output. No-op when already running or unavailable.
    pub fn resume(&mut self) -> bool {
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };
        match backend.state() {
            OutputState::Running => true,
            OutputState::Closed => false,
            OutputState::Suspended => match backend.resume() {
                Ok(()) => {
                    log::info!("[audio] output resumed");
                    true
                }
                Err(e) => {
                    log::warn!("[audio] resume failed: {}", e);
                    false
                }
            },
        }
    }

    fn warn_unavailable(&mut self) {
        if !self.warned {
            self.warned = true;
            log::warn!("[audio] audio output unavailable; tone playback disabled");
        }
    }
}

impl<B: AudioBackend> Drop for TonePlayer<B> {
    fn drop(&mut self) {
        self.close();
    }
}
