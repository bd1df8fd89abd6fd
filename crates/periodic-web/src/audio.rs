use periodic_core::{AudioBackend, AudioError, Envelope, OutputState, VoiceSpec, Waveform};
use web_sys as web;

/// `AudioContext` with a single master gain feeding the destination.
pub struct WebAudioBackend {
    ctx: web::AudioContext,
    master_gain: web::GainNode,
}

/// One oscillator and its envelope gain.
pub struct WebVoice {
    src: web::OscillatorNode,
    gain: web::GainNode,
}

fn create_gain(ctx: &web::AudioContext, value: f32) -> Result<web::GainNode, AudioError> {
    let g = web::GainNode::new(ctx).map_err(|e| AudioError::NodeCreation {
        kind: "GainNode",
        reason: format!("{:?}", e),
    })?;
    g.gain().set_value(value);
    Ok(g)
}

fn oscillator_type(waveform: Waveform) -> web::OscillatorType {
    match waveform {
        Waveform::Sine => web::OscillatorType::Sine,
        Waveform::Square => web::OscillatorType::Square,
        Waveform::Sawtooth => web::OscillatorType::Sawtooth,
        Waveform::Triangle => web::OscillatorType::Triangle,
    }
}

/// Write envelope breakpoints as `AudioParam` automation.
fn schedule_envelope(param: &web::AudioParam, envelope: &Envelope) {
    let mut points = envelope.points().iter();
    if let Some(first) = points.next() {
        let _ = param.set_value_at_time(first.gain, first.time);
    }
    for p in points {
        let _ = param.linear_ramp_to_value_at_time(p.gain, p.time);
    }
}

impl WebAudioBackend {
    pub fn open() -> Result<Self, AudioError> {
        let ctx = web::AudioContext::new()
            .map_err(|e| AudioError::Unavailable(format!("{:?}", e)))?;
        let master_gain = create_gain(&ctx, 1.0)?;
        master_gain
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| AudioError::Output(format!("{:?}", e)))?;
        log::info!("[audio] AudioContext at {} Hz", ctx.sample_rate());
        Ok(Self { ctx, master_gain })
    }
}

impl Drop for WebAudioBackend {
    fn drop(&mut self) {
        let _ = self.master_gain.disconnect();
        if self.ctx.state() != web::AudioContextState::Closed {
            let _ = self.ctx.close();
        }
    }
}

impl AudioBackend for WebAudioBackend {
    type Voice = WebVoice;

    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn state(&self) -> OutputState {
        match self.ctx.state() {
            web::AudioContextState::Running => OutputState::Running,
            web::AudioContextState::Closed => OutputState::Closed,
            _ => OutputState::Suspended,
        }
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        // The returned promise settles asynchronously; state() reflects it later.
        self.ctx
            .resume()
            .map(|_| ())
            .map_err(|e| AudioError::Output(format!("{:?}", e)))
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.master_gain.gain().set_value(gain);
    }

    fn start_voice(&mut self, spec: &VoiceSpec) -> Result<WebVoice, AudioError> {
        let src = web::OscillatorNode::new(&self.ctx).map_err(|e| AudioError::NodeCreation {
            kind: "OscillatorNode",
            reason: format!("{:?}", e),
        })?;
        src.set_type(oscillator_type(spec.waveform));
        src.frequency().set_value(spec.frequency_hz);

        let gain = create_gain(&self.ctx, 0.0)?;
        schedule_envelope(&gain.gain(), &spec.envelope);

        let wire = |r: Result<web::AudioNode, wasm_bindgen::JsValue>| {
            r.map(|_| ())
                .map_err(|e| AudioError::Output(format!("{:?}", e)))
        };
        wire(src.connect_with_audio_node(&gain))?;
        wire(gain.connect_with_audio_node(&self.master_gain))?;

        let started = src
            .start_with_when(spec.start_at)
            .and_then(|_| src.stop_with_when(spec.stop_at));
        if let Err(e) = started {
            let _ = src.disconnect();
            let _ = gain.disconnect();
            return Err(AudioError::Output(format!("{:?}", e)));
        }
        Ok(WebVoice { src, gain })
    }

    fn fade_out(&mut self, voice: &mut WebVoice, from: f64, until: f64) {
        let param = voice.gain.gain();
        let current = param.value();
        let _ = param.cancel_scheduled_values(from);
        let _ = param.set_value_at_time(current, from);
        let _ = param.linear_ramp_to_value_at_time(0.0, until);
        let _ = voice.src.stop_with_when(until);
    }

    fn release(&mut self, voice: WebVoice) {
        let _ = voice.src.stop();
        let _ = voice.src.disconnect();
        let _ = voice.gain.disconnect();
    }
}
