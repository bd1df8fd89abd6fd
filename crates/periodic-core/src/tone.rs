//! Mapping elements to audible pitches.
//!
//! Two strategies are supported:
//! - musical: atomic number folded onto a 12-tone equal-temperament scale
//! - spectral: the element's dominant emission line rescaled into hearing range

use crate::constants::{
    DEFAULT_ATTACK_SEC, DEFAULT_RELEASE_SEC, DEFAULT_VOLUME, SPECTRAL_MAX_HZ, SPECTRAL_MIN_HZ,
};
use crate::element::symbol_for;
use std::str::FromStr;

/// Basic oscillator shape used by the synths in both front-ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Waveform::Sine => Waveform::Square,
            Waveform::Square => Waveform::Sawtooth,
            Waveform::Sawtooth => Waveform::Triangle,
            Waveform::Triangle => Waveform::Sine,
        }
    }
}

impl FromStr for Waveform {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" => Ok(Waveform::Triangle),
            _ => Err(()),
        }
    }
}

/// Frequency-mapping strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SoundMode {
    #[default]
    Musical,
    Spectral,
}

impl SoundMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SoundMode::Musical => "musical",
            SoundMode::Spectral => "spectral",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SoundMode::Musical => SoundMode::Spectral,
            SoundMode::Spectral => SoundMode::Musical,
        }
    }
}

impl FromStr for SoundMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "musical" => Ok(SoundMode::Musical),
            "spectral" => Ok(SoundMode::Spectral),
            _ => Err(()),
        }
    }
}

/// Note names indexed by `atomic_number % 12`.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Semitone offset above the nearest A at or below, indexed like [`NOTE_NAMES`].
pub const SEMITONES_FROM_A: [i32; 12] = [3, 4, 5, 6, 7, 8, 9, 10, 11, 0, 1, 2];

/// Known emission data for a handful of elements.
#[derive(Clone, Copy, Debug)]
pub struct SpectralData {
    pub symbol: &'static str,
    pub dominant_wavelength_nm: f32,
    pub lines_nm: &'static [f32],
}

pub const SPECTRAL_TABLE: &[SpectralData] = &[
    SpectralData {
        symbol: "H",
        dominant_wavelength_nm: 656.3,
        lines_nm: &[656.3, 486.1, 434.0, 410.2],
    },
    SpectralData {
        symbol: "He",
        dominant_wavelength_nm: 587.6,
        lines_nm: &[587.6, 501.6, 492.2, 471.3],
    },
    SpectralData {
        symbol: "Li",
        dominant_wavelength_nm: 670.8,
        lines_nm: &[670.8, 610.4, 460.3],
    },
    SpectralData {
        symbol: "Ne",
        dominant_wavelength_nm: 585.2,
        lines_nm: &[585.2, 540.1, 614.3],
    },
    SpectralData {
        symbol: "Na",
        dominant_wavelength_nm: 589.3,
        lines_nm: &[589.3, 589.0],
    },
];

pub const SPEED_OF_LIGHT_M_PER_S: f64 = 299_792_458.0;
// Optical frequency that lands on A4 after rescaling.
const SPECTRAL_REFERENCE_HZ: f64 = 5e14;

pub fn spectral_data(symbol: &str) -> Option<&'static SpectralData> {
    SPECTRAL_TABLE.iter().find(|d| d.symbol == symbol)
}

/// Convert a MIDI note number to Hertz (A4=440 Hz).
///
/// Monotonic and exhibits octave symmetry: +12 semitones doubles the frequency.
pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * (2.0_f32).powf((midi - 69.0) / 12.0)
}

/// Semitone distance from A4 for the musical mapping.
pub fn semitones_from_a4(atomic_number: u32) -> i32 {
    let idx = (atomic_number % 12) as usize;
    let octave = (atomic_number / 12) as i32;
    SEMITONES_FROM_A[idx] + (octave - 4) * 12
}

/// Note name with octave, e.g. `"A0"` for atomic number 9.
pub fn note_name(atomic_number: u32) -> String {
    let idx = (atomic_number % 12) as usize;
    format!("{}{}", NOTE_NAMES[idx], atomic_number / 12)
}

pub fn musical_frequency(atomic_number: u32) -> f32 {
    midi_to_hz(69.0 + semitones_from_a4(atomic_number) as f32)
}

/// Rescale an emission wavelength into the audible range, clamped to
/// `[SPECTRAL_MIN_HZ, SPECTRAL_MAX_HZ]`.
pub fn wavelength_to_audible_hz(wavelength_nm: f32) -> f32 {
    if wavelength_nm.is_nan() || wavelength_nm <= 0.0 {
        return SPECTRAL_MIN_HZ;
    }
    let optical_hz = SPEED_OF_LIGHT_M_PER_S / (wavelength_nm as f64 * 1e-9);
    let hz = 440.0 * (optical_hz / SPECTRAL_REFERENCE_HZ);
    (hz as f32).clamp(SPECTRAL_MIN_HZ, SPECTRAL_MAX_HZ)
}

pub fn spectral_frequency(atomic_number: u32) -> f32 {
    match symbol_for(atomic_number).and_then(spectral_data) {
        Some(data) => wavelength_to_audible_hz(data.dominant_wavelength_nm),
        None => 220.0 * (2.0_f32).powf((atomic_number % 36) as f32 / 12.0),
    }
}

/// Audible frequency for an element under the given mapping.
pub fn frequency_for_atomic_number(atomic_number: u32, mode: SoundMode) -> f32 {
    match mode {
        SoundMode::Musical => musical_frequency(atomic_number),
        SoundMode::Spectral => spectral_frequency(atomic_number),
    }
}

/// Approximate display color of a wavelength, as hex.
pub fn spectral_color(wavelength_nm: f32) -> &'static str {
    match wavelength_nm {
        w if w < 380.0 => "#8F00FF",
        w if w < 450.0 => "#0000FF",
        w if w < 495.0 => "#00FFFF",
        w if w < 570.0 => "#00FF00",
        w if w < 590.0 => "#FFFF00",
        w if w < 620.0 => "#FF7F00",
        w if w <= 750.0 => "#FF0000",
        _ => "#8B0000",
    }
}

/// A single play action.
///
/// Fields:
/// - `frequency_hz`: pitch, must be > 0
/// - `waveform`: oscillator shape
/// - `volume`: peak envelope gain, 0..1
/// - `attack_sec` / `release_sec`: envelope ramp lengths; the tone lasts their sum
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneRequest {
    pub frequency_hz: f32,
    pub waveform: Waveform,
    pub volume: f32,
    pub attack_sec: f32,
    pub release_sec: f32,
}

impl ToneRequest {
    pub fn new(frequency_hz: f32) -> Self {
        Self {
            frequency_hz,
            waveform: Waveform::Sine,
            volume: DEFAULT_VOLUME,
            attack_sec: DEFAULT_ATTACK_SEC,
            release_sec: DEFAULT_RELEASE_SEC,
        }
    }

    pub fn duration_sec(&self) -> f32 {
        self.attack_sec + self.release_sec
    }

    /// Clamp volume and durations into range. Returns `None` for a
    /// non-positive or non-finite frequency.
    pub fn sanitized(self) -> Option<Self> {
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 {
            return None;
        }
        let finite_or_zero = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Some(Self {
            volume: if self.volume.is_finite() {
                self.volume.clamp(0.0, 1.0)
            } else {
                0.0
            },
            attack_sec: finite_or_zero(self.attack_sec),
            release_sec: finite_or_zero(self.release_sec),
            ..self
        })
    }
}

/// User-facing sound settings; the front-ends mutate this from their controls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneSettings {
    pub mode: SoundMode,
    pub waveform: Waveform,
    pub volume: f32,
    pub attack_sec: f32,
    pub release_sec: f32,
    pub enabled: bool,
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            mode: SoundMode::Musical,
            waveform: Waveform::Sine,
            volume: DEFAULT_VOLUME,
            attack_sec: DEFAULT_ATTACK_SEC,
            release_sec: DEFAULT_RELEASE_SEC,
            enabled: true,
        }
    }
}

impl ToneSettings {
    /// Build the request for an element under these settings.
    pub fn request_for(&self, atomic_number: u32) -> ToneRequest {
        ToneRequest {
            frequency_hz: frequency_for_atomic_number(atomic_number, self.mode),
            waveform: self.waveform,
            volume: self.volume,
            attack_sec: self.attack_sec,
            release_sec: self.release_sec,
        }
    }
}
