//! Piecewise-linear gain envelopes.
//!
//! The WebAudio front-end turns these breakpoints into `AudioParam` ramps; the
//! native synthesizer evaluates [`Envelope::gain_at`] per sample.

use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopePoint {
    pub time: f64,
    pub gain: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Envelope {
    points: SmallVec<[EnvelopePoint; 4]>,
}

impl Envelope {
    /// 0 at `start`, linear to `peak` over `attack`, linear back to 0 over `release`.
    pub fn attack_release(start: f64, peak: f32, attack: f64, release: f64) -> Self {
        let mut points = SmallVec::new();
        points.push(EnvelopePoint {
            time: start,
            gain: 0.0,
        });
        points.push(EnvelopePoint {
            time: start + attack,
            gain: peak,
        });
        points.push(EnvelopePoint {
            time: start + attack + release,
            gain: 0.0,
        });
        Self { points }
    }

    pub fn points(&self) -> &[EnvelopePoint] {
        &self.points
    }

    pub fn start_time(&self) -> f64 {
        self.points.first().map_or(0.0, |p| p.time)
    }

    pub fn end_time(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.time)
    }

    pub fn gain_at(&self, t: f64) -> f32 {
        let Some(first) = self.points.first() else {
            return 0.0;
        };
        match self.points.iter().position(|p| p.time > t) {
            None => self.points[self.points.len() - 1].gain,
            Some(0) => first.gain,
            Some(i) => {
                let a = self.points[i - 1];
                let b = self.points[i];
                let frac = ((t - a.time) / (b.time - a.time)) as f32;
                a.gain + (b.gain - a.gain) * frac
            }
        }
    }

    /// Replace everything after `from` with a linear fade to silence.
    pub fn fade_out(&mut self, from: f64, duration: f64) {
        let gain = self.gain_at(from);
        self.points.retain(|p| p.time <= from);
        self.points.push(EnvelopePoint { time: from, gain });
        self.points.push(EnvelopePoint {
            time: from + duration.max(0.0),
            gain: 0.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_release_shape() {
        let env = Envelope::attack_release(1.0, 0.5, 0.1, 0.4);
        assert_eq!(env.gain_at(0.0), 0.0);
        assert!((env.gain_at(1.05) - 0.25).abs() < 1e-5);
        assert!((env.gain_at(1.1) - 0.5).abs() < 1e-6);
        assert!((env.gain_at(1.3) - 0.25).abs() < 1e-5);
        assert_eq!(env.gain_at(2.0), 0.0);
        assert!((env.end_time() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn zero_attack_jumps_to_peak() {
        let env = Envelope::attack_release(0.0, 0.8, 0.0, 1.0);
        assert!((env.gain_at(0.0) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn fade_out_starts_from_current_gain() {
        let mut env = Envelope::attack_release(0.0, 1.0, 0.1, 1.0);
        env.fade_out(0.6, 0.05);
        let g = env.gain_at(0.6);
        assert!((g - 0.5).abs() < 1e-5);
        assert_eq!(env.gain_at(0.65), 0.0);
        assert!((env.end_time() - 0.65).abs() < 1e-12);
    }
}
