use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadePhase {
    Idle,
    PhaseOneRunning,
    PhaseTwoRunning,
    Complete,
}

impl FadePhase {
    pub const fn is_running(self) -> bool {
        matches!(self, Self::PhaseOneRunning | Self::PhaseTwoRunning)
    }

    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl Default for FadePhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Identifies one run of the sequence; runs started before the last reset carry a stale token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceToken(u32);

/// Interpolated outputs of the sequencer at one instant.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FadeFrame {
    pub phase: FadePhase,
    /// Weight of the cover marker drawn on cells that were never revealed.
    pub covered_weight: f64,
    /// Weight of the dot drawn on revealed cells.
    pub revealed_weight: f64,
    pub background_opacity: f64,
    pub audio_gain: f64,
    pub audio_playing: bool,
}

impl FadeFrame {
    pub const INITIAL: Self = Self {
        phase: FadePhase::Idle,
        covered_weight: 1.0,
        revealed_weight: 1.0,
        background_opacity: 0.0,
        audio_gain: 0.0,
        audio_playing: false,
    };

    pub const FINAL: Self = Self {
        phase: FadePhase::Complete,
        covered_weight: 0.0,
        revealed_weight: 0.0,
        background_opacity: 1.0,
        audio_gain: 1.0,
        audio_playing: true,
    };
}

impl Default for FadeFrame {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Two-phase timed transition: the cover art fades to half weight while the audio swells to half
/// volume, then everything left of the cover dissolves into the background at full volume.
///
/// Time only moves through [`FadeSequencer::advance`], so the host decides what a tick is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FadeSequencer {
    phase_one_ms: u32,
    phase_two_ms: u32,
    ease: Ease,
    policy: FadePolicy,
    phase: FadePhase,
    phase_elapsed_ms: f64,
    generation: u32,
}

impl FadeSequencer {
    pub fn new(phase_one_ms: u32, phase_two_ms: u32, ease: Ease, policy: FadePolicy) -> Self {
        Self {
            phase_one_ms,
            phase_two_ms,
            ease,
            policy,
            phase: Default::default(),
            phase_elapsed_ms: 0.0,
            generation: 0,
        }
    }

    pub fn from_config(config: &CardConfig) -> Self {
        Self::new(
            config.phase_one_ms,
            config.phase_two_ms,
            config.ease,
            config.fade_policy,
        )
    }

    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    pub fn policy(&self) -> FadePolicy {
        self.policy
    }

    /// Token of the run in progress, if any.
    pub fn token(&self) -> Option<SequenceToken> {
        self.phase
            .is_running()
            .then_some(SequenceToken(self.generation))
    }

    /// Starts phase one; does nothing unless idle.
    pub fn start(&mut self) -> Option<SequenceToken> {
        if self.phase != FadePhase::Idle {
            log::debug!("sequence already started ({:?}), ignoring", self.phase);
            return None;
        }
        self.phase = FadePhase::PhaseOneRunning;
        self.phase_elapsed_ms = 0.0;
        log::debug!("phase one started");
        self.token()
    }

    /// Moves the running sequence forward by `delta_ms`.
    ///
    /// Time left over when phase one ends is carried into phase two. Stale tokens and calls while
    /// not running are ignored.
    pub fn advance(&mut self, token: SequenceToken, delta_ms: f64) -> Signals {
        let mut signals = Signals::empty();
        if token.0 != self.generation || !self.phase.is_running() {
            return signals;
        }

        let delta_ms = if delta_ms.is_finite() {
            delta_ms.max(0.0)
        } else {
            0.0
        };
        self.phase_elapsed_ms += delta_ms;

        if self.phase == FadePhase::PhaseOneRunning {
            let duration = f64::from(self.phase_one_ms);
            if self.phase_elapsed_ms < duration {
                return signals;
            }
            self.phase_elapsed_ms -= duration;
            self.phase = FadePhase::PhaseTwoRunning;
            signals |= Signals::PHASE_ONE_COMPLETE;
            log::debug!("phase one complete");
        }

        if self.phase_elapsed_ms >= f64::from(self.phase_two_ms) {
            self.phase_elapsed_ms = 0.0;
            self.phase = FadePhase::Complete;
            signals |= Signals::SEQUENCE_COMPLETE;
            log::debug!("sequence complete");
        }

        signals
    }

    /// Aborts any run and returns every output to its initial value.
    pub fn reset(&mut self) {
        self.phase = FadePhase::Idle;
        self.phase_elapsed_ms = 0.0;
        self.generation = self.generation.wrapping_add(1);
        log::debug!("sequencer reset, generation {}", self.generation);
    }

    pub fn frame(&self) -> FadeFrame {
        match self.phase {
            FadePhase::Idle => FadeFrame::INITIAL,
            FadePhase::PhaseOneRunning => {
                let f1 = self.eased(self.phase_one_ms);
                let covered_weight = 1.0 - f1 / 2.0;
                FadeFrame {
                    phase: self.phase,
                    covered_weight,
                    revealed_weight: match self.policy {
                        FadePolicy::Uniform => covered_weight,
                        FadePolicy::CoveredOnly => 1.0,
                    },
                    background_opacity: 0.0,
                    audio_gain: f1 / 2.0,
                    audio_playing: true,
                }
            }
            FadePhase::PhaseTwoRunning => {
                let f2 = self.eased(self.phase_two_ms);
                let revealed_start = match self.policy {
                    FadePolicy::Uniform => 0.5,
                    FadePolicy::CoveredOnly => 1.0,
                };
                FadeFrame {
                    phase: self.phase,
                    covered_weight: (1.0 - f2) / 2.0,
                    revealed_weight: revealed_start * (1.0 - f2),
                    background_opacity: f2,
                    audio_gain: 0.5 + f2 / 2.0,
                    audio_playing: true,
                }
            }
            FadePhase::Complete => FadeFrame::FINAL,
        }
    }

    fn eased(&self, duration_ms: u32) -> f64 {
        let t = if duration_ms == 0 {
            1.0
        } else {
            self.phase_elapsed_ms / f64::from(duration_ms)
        };
        self.ease.apply(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequencer(policy: FadePolicy) -> FadeSequencer {
        FadeSequencer::new(2500, 2500, Ease::OutCubic, policy)
    }

    #[test]
    fn idle_until_started() {
        let mut seq = sequencer(FadePolicy::Uniform);
        assert_eq!(seq.frame(), FadeFrame::INITIAL);
        assert_eq!(seq.token(), None);

        let token = seq.start().unwrap();
        assert_eq!(seq.phase(), FadePhase::PhaseOneRunning);
        assert_eq!(seq.token(), Some(token));
    }

    #[test]
    fn second_start_is_ignored() {
        let mut seq = sequencer(FadePolicy::Uniform);
        let token = seq.start().unwrap();
        seq.advance(token, 1000.0);

        assert_eq!(seq.start(), None);
        assert_eq!(seq.phase(), FadePhase::PhaseOneRunning);
        assert_eq!(seq.phase_elapsed_ms, 1000.0);
    }

    #[test]
    fn completes_after_both_durations() {
        let mut seq = sequencer(FadePolicy::Uniform);
        let token = seq.start().unwrap();
        let mut prev = seq.frame();
        let mut total = 0.0;
        let mut phase_one_done_at = None;

        while !seq.phase().is_complete() {
            let signals = seq.advance(token, 16.0);
            total += 16.0;
            if signals.contains(Signals::PHASE_ONE_COMPLETE) {
                phase_one_done_at = Some(total);
            }

            let frame = seq.frame();
            assert!(frame.background_opacity >= prev.background_opacity);
            assert!(frame.audio_gain >= prev.audio_gain);
            assert!(frame.covered_weight <= prev.covered_weight);
            assert_eq!(
                seq.phase().is_complete(),
                total >= 5000.0,
                "at {total} ms"
            );
            prev = frame;
        }

        assert_eq!(phase_one_done_at, Some(2512.0));
        assert_eq!(seq.frame(), FadeFrame::FINAL);
        assert_eq!(seq.token(), None);
    }

    #[test]
    fn phase_one_reaches_half_volume() {
        let mut seq = sequencer(FadePolicy::Uniform);
        let token = seq.start().unwrap();

        seq.advance(token, 1250.0);
        let frame = seq.frame();
        assert_eq!(frame.audio_gain, 0.4375);
        assert_eq!(frame.covered_weight, 0.5625);
        assert_eq!(frame.background_opacity, 0.0);

        let signals = seq.advance(token, 1250.0);
        assert_eq!(signals, Signals::PHASE_ONE_COMPLETE);
        let frame = seq.frame();
        assert_eq!(frame.phase, FadePhase::PhaseTwoRunning);
        assert_eq!(frame.audio_gain, 0.5);
        assert_eq!(frame.covered_weight, 0.5);
    }

    #[test]
    fn leftover_time_carries_into_phase_two() {
        let mut seq = sequencer(FadePolicy::Uniform);
        let token = seq.start().unwrap();

        seq.advance(token, 3750.0);
        let frame = seq.frame();
        assert_eq!(frame.phase, FadePhase::PhaseTwoRunning);
        assert_eq!(frame.background_opacity, 0.875);
        assert_eq!(frame.audio_gain, 0.9375);
    }

    #[test]
    fn one_long_tick_raises_both_signals() {
        let mut seq = sequencer(FadePolicy::Uniform);
        let token = seq.start().unwrap();

        let signals = seq.advance(token, 10_000.0);
        assert_eq!(
            signals,
            Signals::PHASE_ONE_COMPLETE | Signals::SEQUENCE_COMPLETE
        );
        assert!(seq.advance(token, 16.0).is_empty());
    }

    #[test]
    fn zero_durations_complete_on_first_tick() {
        let mut seq = FadeSequencer::new(0, 0, Ease::Linear, FadePolicy::Uniform);
        let token = seq.start().unwrap();

        let signals = seq.advance(token, 0.0);
        assert!(signals.contains(Signals::SEQUENCE_COMPLETE));
        assert_eq!(seq.frame(), FadeFrame::FINAL);
    }

    #[test]
    fn policy_decides_revealed_dot_fade() {
        let mut uniform = sequencer(FadePolicy::Uniform);
        let mut covered_only = sequencer(FadePolicy::CoveredOnly);
        let uniform_token = uniform.start().unwrap();
        let covered_only_token = covered_only.start().unwrap();

        uniform.advance(uniform_token, 2499.0);
        covered_only.advance(covered_only_token, 2499.0);
        assert!(uniform.frame().revealed_weight < 0.51);
        assert_eq!(covered_only.frame().revealed_weight, 1.0);

        uniform.advance(uniform_token, 1251.0);
        covered_only.advance(covered_only_token, 1251.0);
        assert_eq!(uniform.frame().revealed_weight, 0.0625);
        assert_eq!(covered_only.frame().revealed_weight, 0.125);
    }

    #[test]
    fn reset_mid_phase_restores_initial_outputs() {
        let mut seq = sequencer(FadePolicy::Uniform);
        let token = seq.start().unwrap();
        seq.advance(token, 3000.0);

        seq.reset();

        assert_eq!(seq.phase(), FadePhase::Idle);
        assert_eq!(seq.frame(), FadeFrame::INITIAL);
        assert_eq!(seq.token(), None);
    }

    #[test]
    fn stale_token_cannot_write_after_reset() {
        let mut seq = sequencer(FadePolicy::Uniform);
        let stale = seq.start().unwrap();
        seq.reset();
        let fresh = seq.start().unwrap();
        assert_ne!(stale, fresh);

        assert!(seq.advance(stale, 10_000.0).is_empty());
        assert_eq!(seq.phase(), FadePhase::PhaseOneRunning);
        assert_eq!(seq.phase_elapsed_ms, 0.0);

        seq.advance(fresh, 100.0);
        assert_eq!(seq.phase_elapsed_ms, 100.0);
    }

    #[test]
    fn bad_deltas_do_not_move_time() {
        let mut seq = sequencer(FadePolicy::Uniform);
        let token = seq.start().unwrap();

        seq.advance(token, -50.0);
        seq.advance(token, f64::NAN);
        assert_eq!(seq.phase_elapsed_ms, 0.0);
    }
}
