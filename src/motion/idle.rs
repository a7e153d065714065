//! Randomised idle-behaviour scheduling.
//!
//! Each sub-motion (and the expression controller) owns an [`IdleScheduler`]
//! that injects autonomous commands while automatic mode is enabled.  A
//! trigger timestamp of 0 means "needs (re)scheduling": the scheduler arms
//! itself on one cycle and fires on a later one, so a fresh trigger is
//! always re-armed on the cycle after a fire.
//!
//! The scheduler is decoupled from the controllers the same way the event
//! system is decoupled elsewhere: it only *produces* `(degree, duration)`
//! suggestions; the owning controller decides how to apply them.

use rand::Rng;
use rand::rngs::SmallRng;

/// How the random idle magnitude is drawn.
#[derive(Debug, Clone, Copy)]
pub enum IdleMagnitude {
    /// Uniform over the full signed span `[min, max]`.
    Uniform { min: i16, max: i16 },
    /// Random sign, magnitude uniform over `[low, high]` — keeps the motion
    /// away from centre so idle gestures stay visible.
    SignedBand { low: i16, high: i16 },
}

impl IdleMagnitude {
    fn draw(self, rng: &mut SmallRng) -> f64 {
        match self {
            Self::Uniform { min, max } => f64::from(rng.gen_range(min..=max)),
            Self::SignedBand { low, high } => {
                let magnitude = f64::from(rng.gen_range(low..=high));
                if rng.gen_range(0..2) == 0 { -magnitude } else { magnitude }
            }
        }
    }
}

/// Timing and range constants for one idle scheduler.
#[derive(Debug, Clone, Copy)]
pub struct IdleProfile {
    /// Fixed delay added in front of every scheduled trigger (ms).
    pub base_delay_ms: u64,
    /// Random interval drawn as `gen_range(interval_lo..=interval_hi) * unit_ms`.
    pub interval_lo: u64,
    pub interval_hi: u64,
    pub unit_ms: u64,
    /// Magnitude of the generated command, in user-facing degrees.
    pub magnitude: IdleMagnitude,
    /// Random move duration drawn as `gen_range(duration_lo..=duration_hi) * 1000` ms.
    /// Zero on both ends yields immediate moves.
    pub duration_lo: u64,
    pub duration_hi: u64,
}

/// A randomly generated idle command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleCommand {
    pub degree: f64,
    pub duration_ms: u64,
}

/// Per-sub-motion idle trigger.
#[derive(Debug)]
pub struct IdleScheduler {
    profile: IdleProfile,
    /// Absolute trigger time in ms; 0 = needs (re)scheduling.
    trigger_at: u64,
}

impl IdleScheduler {
    pub fn new(profile: IdleProfile) -> Self {
        Self {
            profile,
            trigger_at: 0,
        }
    }

    /// Advance the scheduler.  Call once per control cycle while automatic
    /// mode is enabled.  Returns a command when the trigger has expired.
    pub fn poll(&mut self, now_ms: u64, rng: &mut SmallRng) -> Option<IdleCommand> {
        let p = &self.profile;

        if self.trigger_at == 0 {
            let interval = rng.gen_range(p.interval_lo..=p.interval_hi) * p.unit_ms;
            self.trigger_at = now_ms + p.base_delay_ms + interval;
            return None;
        }

        if now_ms > self.trigger_at {
            self.trigger_at = 0;
            let degree = p.magnitude.draw(rng);
            let duration_ms = if p.duration_hi == 0 {
                0
            } else {
                rng.gen_range(p.duration_lo..=p.duration_hi) * 1000
            };
            return Some(IdleCommand {
                degree,
                duration_ms,
            });
        }

        None
    }

    /// Drop any pending trigger so the next `poll` re-arms from `now`.
    /// Called when a manual command should postpone autonomous motion.
    pub fn reset(&mut self) {
        self.trigger_at = 0;
    }
}
