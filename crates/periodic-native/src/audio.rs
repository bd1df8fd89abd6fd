// ---------------- Native audio (cpal) ----------------
//
// A software mixer behind `AudioBackend`. Voices carry their own envelope and
// are evaluated per sample against the stream's sample clock, which doubles as
// the player's `current_time`.

use std::sync::{Arc, Mutex, MutexGuard};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;
use periodic_core::{AudioBackend, AudioError, Envelope, OutputState, VoiceSpec, Waveform};

struct MixVoice {
    id: u64,
    phase: f32,     // radians
    phase_inc: f32, // radians per sample
    wave: Waveform,
    envelope: Envelope,
    start_at: f64,
    stop_at: f64,
}

struct MixerState {
    sample_rate: f32,
    frames_rendered: u64,
    master_gain: f32,
    voices: Vec<MixVoice>,
}

impl MixerState {
    fn now(&self) -> f64 {
        self.frames_rendered as f64 / self.sample_rate as f64
    }
}

pub struct NativeVoice {
    id: u64,
}

pub struct CpalBackend {
    state: Arc<Mutex<MixerState>>,
    stream: cpal::Stream,
    playing: bool,
    next_id: u64,
}

fn lock(state: &Mutex<MixerState>) -> MutexGuard<'_, MixerState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CpalBackend {
    /// Open the default output device. Fails when there is no device or the
    /// sample format is unsupported.
    pub fn open() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Unavailable("no default output device".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| AudioError::Unavailable(e.to_string()))?;
        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let state = Arc::new(Mutex::new(MixerState {
            sample_rate,
            frames_rendered: 0,
            master_gain: 1.0,
            voices: Vec::new(),
        }));

        let err_fn = |err| log::error!("[audio] stream error: {err}");
        let stream_config: cpal::StreamConfig = config.clone().into();
        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &stream_config, channels, Arc::clone(&state), err_fn)
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &stream_config, channels, Arc::clone(&state), err_fn)
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &stream_config, channels, Arc::clone(&state), err_fn)
            }
            other => {
                return Err(AudioError::Unavailable(format!(
                    "unsupported sample format {other:?}"
                )))
            }
        }
        .map_err(|e| AudioError::Output(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::Output(e.to_string()))?;
        log::info!(
            "[audio] output running at {} Hz, {} channel(s)",
            sample_rate,
            channels
        );
        Ok(Self {
            state,
            stream,
            playing: true,
            next_id: 0,
        })
    }

    /// Pause output; the player's `resume` brings it back.
    pub fn suspend(&mut self) {
        match self.stream.pause() {
            Ok(()) => self.playing = false,
            Err(e) => log::warn!("[audio] pause failed: {e}"),
        }
    }
}

impl AudioBackend for CpalBackend {
    type Voice = NativeVoice;

    fn current_time(&self) -> f64 {
        lock(&self.state).now()
    }

    fn state(&self) -> OutputState {
        if self.playing {
            OutputState::Running
        } else {
            OutputState::Suspended
        }
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::Output(e.to_string()))?;
        self.playing = true;
        Ok(())
    }

    fn set_master_gain(&mut self, gain: f32) {
        lock(&self.state).master_gain = gain;
    }

    fn start_voice(&mut self, spec: &VoiceSpec) -> Result<NativeVoice, AudioError> {
        let id = self.next_id;
        self.next_id += 1;
        let mut guard = lock(&self.state);
        let sr = guard.sample_rate;
        guard.voices.push(MixVoice {
            id,
            phase: 0.0,
            phase_inc: 2.0 * std::f32::consts::PI * spec.frequency_hz / sr,
            wave: spec.waveform,
            envelope: spec.envelope.clone(),
            start_at: spec.start_at,
            stop_at: spec.stop_at,
        });
        Ok(NativeVoice { id })
    }

    fn fade_out(&mut self, voice: &mut NativeVoice, from: f64, until: f64) {
        let mut guard = lock(&self.state);
        if let Some(v) = guard.voices.iter_mut().find(|v| v.id == voice.id) {
            v.envelope.fade_out(from, until - from);
            v.stop_at = v.stop_at.min(until);
        }
    }

    fn release(&mut self, voice: NativeVoice) {
        lock(&self.state).voices.retain(|v| v.id != voice.id);
    }
}

fn render_wave_sample(phase: f32, wave: Waveform) -> f32 {
    let saw = || {
        // Map phase 0..2PI to -1..1
        let t = phase / (2.0 * std::f32::consts::PI);
        2.0 * (t - t.floor()) - 1.0
    };
    match wave {
        Waveform::Sine => phase.sin(),
        Waveform::Square => {
            if phase.sin() >= 0.0 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Sawtooth => saw(),
        Waveform::Triangle => (2.0 / std::f32::consts::PI) * saw().asin(),
    }
}

fn mix_sample(state: &mut MixerState) -> f32 {
    let t = state.now();
    let mut sum = 0.0f32;
    for v in state.voices.iter_mut() {
        if t < v.start_at || t >= v.stop_at {
            continue;
        }
        sum += render_wave_sample(v.phase, v.wave) * v.envelope.gain_at(t);
        v.phase += v.phase_inc;
        if v.phase > 2.0 * std::f32::consts::PI {
            v.phase -= 2.0 * std::f32::consts::PI;
        }
    }
    state.frames_rendered += 1;
    (sum * state.master_gain).tanh()
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    state: Arc<Mutex<MixerState>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let mut guard = lock(&state);
            for frame in data.chunks_mut(channels.max(1)) {
                let value = T::from_sample(mix_sample(&mut guard));
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        },
        err_fn,
        None,
    )
}
