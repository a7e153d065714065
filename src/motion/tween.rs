//! Time-based interpolation for continuous actuators.
//!
//! A [`Tween`] owns a bounded value that eases from a start position to a
//! commanded target over a duration.  Every continuous actuator in the
//! system (neck servos, body servos, the accessory retractor) owns exactly
//! one.  The tween is purely computational — it never touches hardware.
//! The caller forwards the value returned by [`Tween::tick`] to the servo
//! port.
//!
//! The easing curve is quadratic ease-in-out.  Redirecting a tween mid-flight
//! restarts the curve from the value *at the moment of the call*, so a new
//! command never produces a jump.

/// Quadratic ease-in-out over `t ∈ [0, 1]`.
fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 { 2.0 * t * t } else { t * (4.0 - 2.0 * t) - 1.0 }
}

/// Compute the eased position between `start` and `target` at `pct` of the
/// tween's duration.
///
/// The direction test deliberately uses `current` (the value just before
/// this tick) rather than `start`: after a mid-flight redirection the curve
/// still converges monotonically onto the new target.
fn ease(start: f64, current: f64, target: f64, pct: f64) -> f64 {
    let pct = pct.min(1.0);

    if current == target {
        return target;
    }

    let q = ease_in_out_quad(pct);
    if current < target {
        let result = start + (target - start) * q;
        if result > target { target } else { result }
    } else {
        let result = start - (start - target) * q;
        if result < target { target } else { result }
    }
}

/// A bounded, eased value with millisecond timing.
///
/// Invariants: `min ≤ current, target ≤ max` at all times, and
/// `duration_ms == 0` exactly when no tween is active (then
/// `current == target`).
#[derive(Debug, Clone)]
pub struct Tween {
    min: f64,
    max: f64,
    current: f64,
    target: f64,
    ease_start: f64,
    duration_ms: f64,
    started_at: u64,
}

impl Tween {
    /// Create a tween resting at `start`, clamped to `[min, max]`.
    pub fn new(min: f64, max: f64, start: f64) -> Self {
        let start = start.clamp(min, max);
        Self {
            min,
            max,
            current: start,
            target: start,
            ease_start: start,
            duration_ms: 0.0,
            started_at: 0,
        }
    }

    /// The value currently emitted to the actuator.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// The commanded target.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// True while a tween is in flight.
    pub fn is_active(&self) -> bool {
        self.duration_ms > 0.0
    }

    /// Jump to `value` immediately, cancelling any in-flight tween.
    /// Out-of-range values clamp silently.
    pub fn set_immediate(&mut self, value: f64) -> f64 {
        let value = value.clamp(self.min, self.max);
        self.current = value;
        self.target = value;
        self.duration_ms = 0.0;
        self.started_at = 0;
        value
    }

    /// Begin easing toward `value` over `duration_ms`, starting at `now_ms`.
    ///
    /// The ease origin is the current value at the moment of the call, which
    /// may itself be mid-tween — reissuing a command always redirects
    /// smoothly.  `duration_ms == 0` degenerates to [`Tween::set_immediate`].
    pub fn move_to(&mut self, value: f64, duration_ms: u64, now_ms: u64) {
        if duration_ms == 0 {
            self.set_immediate(value);
            return;
        }
        self.target = value.clamp(self.min, self.max);
        self.ease_start = self.current;
        self.duration_ms = duration_ms as f64;
        self.started_at = now_ms;
    }

    /// Advance the tween to `now_ms`.
    ///
    /// Returns `Some(value)` when the actuator should be driven (any tick of
    /// an active tween, including the completion tick), `None` when idle.
    /// A decreasing `now_ms` (clock rollover) resets the elapsed baseline
    /// instead of computing a negative duration.
    pub fn tick(&mut self, now_ms: u64) -> Option<f64> {
        if self.duration_ms == 0.0 {
            return None;
        }

        if now_ms < self.started_at {
            self.started_at = now_ms;
        }

        let elapsed = (now_ms - self.started_at) as f64;
        let pct = elapsed / self.duration_ms;

        if pct >= 1.0 {
            self.current = self.target;
            self.duration_ms = 0.0;
        } else {
            self.current = ease(self.ease_start, self.current, self.target, pct);
        }
        Some(self.current)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ease_monotonic_upward(start in 0.0f64..90.0, target in 91.0f64..180.0) {
            let mut prev = start;
            for i in 0..=100 {
                let pct = f64::from(i) / 100.0;
                let v = ease(start, prev, target, pct);
                prop_assert!(v >= prev - 1e-9, "regressed at pct={pct}: {prev} -> {v}");
                prop_assert!(v <= target + 1e-9);
                prev = v;
            }
            prop_assert!((prev - target).abs() < 1e-9);
        }

        #[test]
        fn ease_monotonic_downward(start in 91.0f64..180.0, target in 0.0f64..90.0) {
            let mut prev = start;
            for i in 0..=100 {
                let pct = f64::from(i) / 100.0;
                let v = ease(start, prev, target, pct);
                prop_assert!(v <= prev + 1e-9);
                prop_assert!(v >= target - 1e-9);
                prev = v;
            }
            prop_assert!((prev - target).abs() < 1e-9);
        }

        #[test]
        fn bounds_hold_under_arbitrary_commands(
            cmds in proptest::collection::vec((-200.0f64..400.0, 0u64..3000), 1..50)
        ) {
            let mut t = Tween::new(0.0, 180.0, 90.0);
            let mut now = 0u64;
            for (deg, dur) in cmds {
                t.move_to(deg, dur, now);
                for _ in 0..10 {
                    now += 100;
                    let _ = t.tick(now);
                    prop_assert!((0.0..=180.0).contains(&t.current()));
                    prop_assert!((0.0..=180.0).contains(&t.target()));
                }
            }
        }
    }
}
