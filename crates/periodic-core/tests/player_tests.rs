// Host-side tests for the tone player registry and its cleanup schedule.
// A recording backend stands in for the platform audio graph; tests move its
// clock by hand.

use periodic_core::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct Log {
    started: Vec<VoiceSpec>,
    faded: Vec<(u32, f64, f64)>,
    released: Vec<u32>,
    master_gain: Vec<f32>,
    resumes: u32,
}

struct FakeBackend {
    clock: Rc<Cell<f64>>,
    log: Rc<RefCell<Log>>,
    next_id: u32,
    state: OutputState,
    fail_start: bool,
}

struct FakeVoice {
    id: u32,
}

impl AudioBackend for FakeBackend {
    type Voice = FakeVoice;

    fn current_time(&self) -> f64 {
        self.clock.get()
    }

    fn state(&self) -> OutputState {
        self.state
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.log.borrow_mut().resumes += 1;
        self.state = OutputState::Running;
        Ok(())
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.log.borrow_mut().master_gain.push(gain);
    }

    fn start_voice(&mut self, spec: &VoiceSpec) -> Result<FakeVoice, AudioError> {
        if self.fail_start {
            return Err(AudioError::NodeCreation {
                kind: "oscillator",
                reason: "test".into(),
            });
        }
        self.log.borrow_mut().started.push(spec.clone());
        self.next_id += 1;
        Ok(FakeVoice { id: self.next_id })
    }

    fn fade_out(&mut self, voice: &mut FakeVoice, from: f64, until: f64) {
        self.log.borrow_mut().faded.push((voice.id, from, until));
    }

    fn release(&mut self, voice: FakeVoice) {
        self.log.borrow_mut().released.push(voice.id);
    }
}

fn make_player() -> (TonePlayer<FakeBackend>, Rc<Cell<f64>>, Rc<RefCell<Log>>) {
    let clock = Rc::new(Cell::new(0.0));
    let log = Rc::new(RefCell::new(Log::default()));
    let backend = FakeBackend {
        clock: Rc::clone(&clock),
        log: Rc::clone(&log),
        next_id: 0,
        state: OutputState::Running,
        fail_start: false,
    };
    (TonePlayer::new(backend), clock, log)
}

#[test]
fn play_registers_one_tone() {
    let (mut player, _clock, log) = make_player();
    let handle = player.play(ToneRequest::new(440.0)).unwrap();
    assert_eq!(player.active_count(), 1);
    assert!(player.is_active(440.0));
    let expected_stop =
        (DEFAULT_ATTACK_SEC + DEFAULT_RELEASE_SEC) as f64 + STOP_TAIL_SEC;
    assert!((handle.stop_at - expected_stop).abs() < 1e-6);
    assert_eq!(log.borrow().started.len(), 1);
}

#[test]
fn voice_envelope_peaks_at_volume() {
    let (mut player, clock, log) = make_player();
    clock.set(2.0);
    let req = ToneRequest {
        volume: 0.7,
        ..ToneRequest::new(330.0)
    };
    player.play(req);
    let log = log.borrow();
    let spec = &log.started[0];
    assert_eq!(spec.start_at, 2.0);
    assert_eq!(spec.envelope.gain_at(2.0), 0.0);
    let peak_at = 2.0 + DEFAULT_ATTACK_SEC as f64;
    assert!((spec.envelope.gain_at(peak_at) - 0.7).abs() < 1e-5);
    assert!(spec.stop_at > spec.envelope.end_time());
}

#[test]
fn replaying_same_frequency_replaces_old_tone() {
    let (mut player, _clock, log) = make_player();
    player.play(ToneRequest::new(440.0));
    player.play(ToneRequest::new(440.0));
    assert_eq!(player.active_count(), 1);
    assert_eq!(player.active_frequencies(), vec![440.0]);
    // the first voice is fading, the second is live
    let log = log.borrow();
    assert_eq!(log.started.len(), 2);
    assert_eq!(log.faded.len(), 1);
    assert_eq!(log.faded[0].0, 1);
}

#[test]
fn replaced_tone_expiry_does_not_remove_new_tone() {
    let (mut player, clock, _log) = make_player();
    player.play(ToneRequest::new(440.0));
    clock.set(0.3);
    player.play(ToneRequest::new(440.0));
    // original stop time has passed, the replacement's has not
    clock.set(0.7);
    player.poll();
    assert!(player.is_active(440.0));
    clock.set(1.0);
    player.poll();
    assert!(!player.is_active(440.0));
}

#[test]
fn different_frequencies_are_independent() {
    let (mut player, _clock, _log) = make_player();
    player.play(ToneRequest::new(440.0));
    player.play(ToneRequest::new(220.0));
    assert_eq!(player.active_frequencies(), vec![220.0, 440.0]);
    assert!(player.stop(440.0));
    assert!(player.is_active(220.0));
}

#[test]
fn natural_expiry_deregisters_and_releases() {
    let (mut player, clock, log) = make_player();
    let handle = player.play(ToneRequest::new(440.0)).unwrap();
    clock.set(handle.stop_at - 0.01);
    assert_eq!(player.poll(), 0);
    assert!(player.is_active(440.0));
    clock.set(handle.stop_at);
    assert_eq!(player.poll(), 1);
    assert_eq!(player.active_count(), 0);
    assert_eq!(log.borrow().released, vec![1]);
    assert_eq!(player.pending_tasks(), 0);
}

#[test]
fn stop_fades_then_releases() {
    let (mut player, clock, log) = make_player();
    player.play(ToneRequest::new(440.0));
    clock.set(0.2);
    assert!(player.stop(440.0));
    assert!(!player.is_active(440.0));
    assert_eq!(player.fading_count(), 1);
    {
        let log = log.borrow();
        let (id, from, until) = log.faded[0];
        assert_eq!(id, 1);
        assert!((from - 0.2).abs() < 1e-9);
        assert!((until - from - STOP_FADE_SEC).abs() < 1e-9);
        assert!(log.released.is_empty());
    }
    clock.set(0.2 + STOP_FADE_SEC);
    assert_eq!(player.poll(), 1);
    assert_eq!(log.borrow().released, vec![1]);
    assert_eq!(player.fading_count(), 0);
    assert_eq!(player.pending_tasks(), 0);
}

#[test]
fn stop_twice_is_a_no_op() {
    let (mut player, clock, log) = make_player();
    player.play(ToneRequest::new(440.0));
    assert!(player.stop(440.0));
    assert!(!player.stop(440.0));
    assert!(!player.stop(123.0));
    clock.set(10.0);
    player.poll();
    assert_eq!(log.borrow().released, vec![1]);
}

#[test]
fn stop_all_empties_registry() {
    let (mut player, clock, log) = make_player();
    for f in [110.0, 220.0, 330.0, 440.0] {
        player.play(ToneRequest::new(f));
    }
    player.stop_all();
    assert_eq!(player.active_count(), 0);
    player.stop_all();
    clock.set(1.0);
    player.poll();
    assert_eq!(log.borrow().released.len(), 4);
    assert_eq!(player.pending_tasks(), 0);
}

#[test]
fn close_releases_everything_immediately() {
    let (mut player, _clock, log) = make_player();
    player.play(ToneRequest::new(110.0));
    player.play(ToneRequest::new(220.0));
    player.stop(220.0);
    player.close();
    assert_eq!(player.active_count(), 0);
    assert_eq!(player.fading_count(), 0);
    assert_eq!(player.pending_tasks(), 0);
    let mut released = log.borrow().released.clone();
    released.sort();
    assert_eq!(released, vec![1, 2]);
    player.close();
    assert_eq!(log.borrow().released.len(), 2);
}

#[test]
fn dropping_player_releases_voices() {
    let (mut player, _clock, log) = make_player();
    player.play(ToneRequest::new(440.0));
    drop(player);
    assert_eq!(log.borrow().released, vec![1]);
}

#[test]
fn invalid_frequency_is_ignored() {
    let (mut player, _clock, log) = make_player();
    assert!(player.play(ToneRequest::new(0.0)).is_none());
    assert!(player.play(ToneRequest::new(f32::NAN)).is_none());
    assert_eq!(player.active_count(), 0);
    assert!(log.borrow().started.is_empty());
}

#[test]
fn backend_failure_leaves_registry_clean() {
    let (mut player, _clock, _log) = make_player();
    if let Some(backend) = player.backend_mut() {
        backend.fail_start = true;
    }
    assert!(player.play(ToneRequest::new(440.0)).is_none());
    assert_eq!(player.active_count(), 0);
    assert_eq!(player.pending_tasks(), 0);
}

#[test]
fn unavailable_player_is_a_no_op() {
    let mut player: TonePlayer<FakeBackend> = TonePlayer::unavailable();
    assert!(!player.is_available());
    for _ in 0..3 {
        assert!(player.play(ToneRequest::new(440.0)).is_none());
    }
    player.stop_all();
    assert!(!player.stop(440.0));
    assert_eq!(player.poll(), 0);
    assert!(!player.resume());
    player.set_volume(0.2);
    assert_eq!(player.volume(), 0.2);
}

#[test]
fn failed_backend_construction_degrades() {
    let mut player: TonePlayer<FakeBackend> =
        TonePlayer::from_backend(Err(AudioError::Unavailable("no device".into())));
    assert!(!player.is_available());
    assert!(player.play(ToneRequest::new(440.0)).is_none());
}

#[test]
fn set_volume_clamps_and_reaches_master_gain() {
    let (mut player, _clock, log) = make_player();
    player.set_volume(1.7);
    player.set_volume(-1.0);
    player.set_volume(0.25);
    assert_eq!(player.volume(), 0.25);
    let gains = log.borrow().master_gain.clone();
    assert_eq!(gains, vec![DEFAULT_VOLUME, 1.0, 0.0, 0.25]);
}

#[test]
fn resume_is_idempotent() {
    let (mut player, _clock, log) = make_player();
    assert!(player.resume());
    assert_eq!(log.borrow().resumes, 0);
    if let Some(backend) = player.backend_mut() {
        backend.state = OutputState::Suspended;
    }
    assert!(player.resume());
    assert!(player.resume());
    assert_eq!(log.borrow().resumes, 1);
}

#[test]
fn master_volume_leaves_tone_peak_alone() {
    let (mut player, _clock, log) = make_player();
    let settings = ToneSettings::default();
    player.set_volume(0.9);
    player.play(settings.request_for(26));
    let log = log.borrow();
    assert_eq!(log.master_gain.last().copied(), Some(0.9));
    let spec = &log.started[0];
    let peak = spec.envelope.gain_at(spec.start_at + settings.attack_sec as f64);
    assert!((peak - settings.volume).abs() < 1e-5);
}

#[test]
fn close_cuts_active_voices_without_fading() {
    let (mut player, _clock, log) = make_player();
    player.play(ToneRequest::new(110.0));
    player.play(ToneRequest::new(220.0));
    player.close();
    let log = log.borrow();
    assert!(log.faded.is_empty());
    assert_eq!(log.released.len(), 2);
    assert_eq!(player.active_count(), 0);
}
