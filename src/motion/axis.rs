//! Calibrated, idle-scheduled axis controllers.
//!
//! One generic [`AxisController`] covers every body part: it accepts a
//! signed user-facing angle, adds the sub-motion's calibration offset, maps
//! it into actuator space, and drives one servo or an antagonist pair
//! through a [`Tween`].  Per-part behaviour (easing durations, idle timing,
//! antagonist pairing) lives entirely in the constructor profiles, so Neck,
//! Body, and Accessory are three instances of the same machine rather than
//! three copies of it.
//!
//! ```text
//!  user degree (−90..+90) ──(+90 offset, +calibration, clamp)──▶ 0..180
//!                                                  │
//!                            Tween ──▶ ServoPort::write_degrees(channel,..)
//!                                          └─▶ mirror channel: 180 − value
//! ```

use log::debug;
use rand::rngs::SmallRng;

use crate::app::ports::ServoPort;

use super::idle::{IdleMagnitude, IdleProfile, IdleScheduler};
use super::tween::Tween;

/// Actuator-space range shared by every servo in the droid.
pub const SERVO_RANGE_MIN: f64 = 0.0;
pub const SERVO_RANGE_MAX: f64 = 180.0;

// PWM channel assignments on the servo bus.
const CH_HEAD_ACCESSORY: u8 = 4;
const CH_HEAD_TILT_SIDEWAYS: u8 = 5;
const CH_HEAD_ROTATE: u8 = 8;
const CH_HEAD_TILT_FORWARD: u8 = 9;
const CH_BODY_ROTATE: u8 = 11;
const CH_BODY_FORWARD_LEFT: u8 = 12;
const CH_BODY_FORWARD_RIGHT: u8 = 13;
const CH_BODY_SIDEWAY_LEFT: u8 = 14;
const CH_BODY_SIDEWAY_RIGHT: u8 = 15;

/// Physical binding of a sub-motion to the servo bus.
#[derive(Debug, Clone, Copy)]
pub enum ServoOutput {
    /// One servo.
    Single { channel: u8 },
    /// Antagonist pair: `mirror` receives `RANGE_MAX − value` so one logical
    /// command produces mechanically opposed motion.
    Antagonist { channel: u8, mirror: u8 },
}

/// The three logical sub-motions an axis can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubMotionId {
    Rotate,
    TiltForward,
    TiltSideways,
}

/// One logical degree of freedom: tween + calibration + idle trigger.
pub struct SubMotion {
    tween: Tween,
    output: ServoOutput,
    /// Offset from the signed user range into actuator space (90 for
    /// −90..+90 axes, 0 for the raw-range accessory).
    user_offset: f64,
    /// Signed calibration bias, applied at command time.
    calibration: i16,
    /// Last commanded degree in user space, for status read-back.
    user_target: f64,
    idle: Option<IdleScheduler>,
}

impl SubMotion {
    fn new(output: ServoOutput, user_offset: f64, start: f64, idle: Option<IdleProfile>) -> Self {
        Self {
            tween: Tween::new(SERVO_RANGE_MIN, SERVO_RANGE_MAX, start),
            output,
            user_offset,
            calibration: 0,
            user_target: start - user_offset,
            idle: idle.map(IdleScheduler::new),
        }
    }

    fn emit<S: ServoPort>(&self, value: f64, servos: &mut S) {
        match self.output {
            ServoOutput::Single { channel } => servos.write_degrees(channel, value),
            ServoOutput::Antagonist { channel, mirror } => {
                servos.write_degrees(channel, value);
                servos.write_degrees(mirror, SERVO_RANGE_MAX - value);
            }
        }
    }

    /// The command path: user degree → calibrated actuator degree → tween.
    /// Duration 0 applies immediately and writes the servo in the same call.
    fn command<S: ServoPort>(&mut self, degree: f64, duration_ms: u64, now_ms: u64, servos: &mut S) {
        self.user_target = degree.clamp(
            SERVO_RANGE_MIN - self.user_offset,
            SERVO_RANGE_MAX - self.user_offset,
        );
        let mapped = (degree + self.user_offset + f64::from(self.calibration))
            .clamp(SERVO_RANGE_MIN, SERVO_RANGE_MAX);
        if duration_ms == 0 {
            let value = self.tween.set_immediate(mapped);
            self.emit(value, servos);
        } else {
            self.tween.move_to(mapped, duration_ms, now_ms);
        }
    }
}

/// A calibrated, idle-scheduled body-part axis.
pub struct AxisController {
    name: &'static str,
    sub_motions: [Option<SubMotion>; 3],
    /// Shared across all sub-motions of the axis.
    automatic: bool,
    /// Default easing duration for manual commands without one.
    default_duration_ms: u64,
}

impl AxisController {
    /// Neck: three eased single servos, full-range idle wander.
    /// `default_duration_ms` paces manual commands without an explicit one.
    pub fn neck(default_duration_ms: u64) -> Self {
        let idle = |base, lo, hi, unit, dur_lo, dur_hi| IdleProfile {
            base_delay_ms: base,
            interval_lo: lo,
            interval_hi: hi,
            unit_ms: unit,
            magnitude: IdleMagnitude::Uniform { min: -90, max: 90 },
            duration_lo: dur_lo,
            duration_hi: dur_hi,
        };
        Self {
            name: "neck",
            sub_motions: [
                Some(SubMotion::new(
                    ServoOutput::Single {
                        channel: CH_HEAD_ROTATE,
                    },
                    90.0,
                    90.0,
                    Some(idle(2000, 5, 10, 1000, 2, 5)),
                )),
                Some(SubMotion::new(
                    ServoOutput::Single {
                        channel: CH_HEAD_TILT_FORWARD,
                    },
                    90.0,
                    90.0,
                    Some(idle(2500, 6, 12, 1050, 3, 6)),
                )),
                Some(SubMotion::new(
                    ServoOutput::Single {
                        channel: CH_HEAD_TILT_SIDEWAYS,
                    },
                    90.0,
                    90.0,
                    Some(idle(3000, 5, 10, 1100, 2, 5)),
                )),
            ],
            automatic: true,
            default_duration_ms,
        }
    }

    /// Body: rotate plus two antagonist tilt pairs; moves apply immediately
    /// and idle gestures keep a 10–80° magnitude band.
    pub fn body() -> Self {
        let idle = |base, lo, hi, unit| IdleProfile {
            base_delay_ms: base,
            interval_lo: lo,
            interval_hi: hi,
            unit_ms: unit,
            magnitude: IdleMagnitude::SignedBand { low: 10, high: 80 },
            duration_lo: 0,
            duration_hi: 0,
        };
        Self {
            name: "body",
            sub_motions: [
                Some(SubMotion::new(
                    ServoOutput::Single {
                        channel: CH_BODY_ROTATE,
                    },
                    90.0,
                    90.0,
                    Some(idle(2000, 6, 12, 1000)),
                )),
                Some(SubMotion::new(
                    ServoOutput::Antagonist {
                        channel: CH_BODY_FORWARD_LEFT,
                        mirror: CH_BODY_FORWARD_RIGHT,
                    },
                    90.0,
                    90.0,
                    Some(idle(2500, 6, 12, 1050)),
                )),
                Some(SubMotion::new(
                    ServoOutput::Antagonist {
                        channel: CH_BODY_SIDEWAY_LEFT,
                        mirror: CH_BODY_SIDEWAY_RIGHT,
                    },
                    90.0,
                    90.0,
                    Some(idle(3000, 5, 10, 1100)),
                )),
            ],
            automatic: true,
            default_duration_ms: 0,
        }
    }

    /// Accessory retractor: one eased servo in the raw 0–180 range, no idle
    /// behaviour, parked retracted.
    pub fn accessory(default_duration_ms: u64) -> Self {
        Self {
            name: "accessory",
            sub_motions: [
                Some(SubMotion::new(
                    ServoOutput::Single {
                        channel: CH_HEAD_ACCESSORY,
                    },
                    0.0,
                    0.0,
                    None,
                )),
                None,
                None,
            ],
            automatic: true,
            default_duration_ms,
        }
    }

    fn slot(id: SubMotionId) -> usize {
        match id {
            SubMotionId::Rotate => 0,
            SubMotionId::TiltForward => 1,
            SubMotionId::TiltSideways => 2,
        }
    }

    fn sub(&mut self, id: SubMotionId) -> Option<&mut SubMotion> {
        self.sub_motions[Self::slot(id)].as_mut()
    }

    /// Issue a manual command on one sub-motion.  `duration_ms = None` uses
    /// the axis default.  Inputs outside the valid range clamp silently;
    /// the call always succeeds.
    pub fn command<S: ServoPort>(
        &mut self,
        id: SubMotionId,
        degree: f64,
        duration_ms: Option<u64>,
        now_ms: u64,
        servos: &mut S,
    ) {
        let default = self.default_duration_ms;
        let name = self.name;
        if let Some(sub) = self.sub(id) {
            let duration = duration_ms.unwrap_or(default);
            debug!("{name}: {id:?} -> {degree:.1}° over {duration}ms");
            sub.command(degree, duration, now_ms, servos);
        }
    }

    /// Pose the whole axis in one call: all three sub-motions retarget in
    /// the same control cycle, sharing one duration.
    pub fn command_target<S: ServoPort>(
        &mut self,
        rotate: f64,
        tilt_forward: f64,
        tilt_sideways: f64,
        duration_ms: Option<u64>,
        now_ms: u64,
        servos: &mut S,
    ) {
        self.command(SubMotionId::Rotate, rotate, duration_ms, now_ms, servos);
        self.command(SubMotionId::TiltForward, tilt_forward, duration_ms, now_ms, servos);
        self.command(SubMotionId::TiltSideways, tilt_sideways, duration_ms, now_ms, servos);
    }

    /// Set the calibration offset for one sub-motion.  Picked up by the next
    /// command; in-flight tweens are not retargeted.
    pub fn set_calibration(&mut self, id: SubMotionId, offset: i16) {
        if let Some(sub) = self.sub(id) {
            sub.calibration = offset;
        }
    }

    pub fn calibration(&self, id: SubMotionId) -> i16 {
        self.sub_motions[Self::slot(id)]
            .as_ref()
            .map_or(0, |s| s.calibration)
    }

    /// Current actuator-space position of one sub-motion (the primary servo
    /// of an antagonist pair).
    pub fn position(&self, id: SubMotionId) -> f64 {
        self.sub_motions[Self::slot(id)]
            .as_ref()
            .map_or(0.0, |s| s.tween.current())
    }

    /// Last commanded degree in signed user space, regardless of how far
    /// the tween has travelled towards it.
    pub fn user_target(&self, id: SubMotionId) -> f64 {
        self.sub_motions[Self::slot(id)]
            .as_ref()
            .map_or(0.0, |s| s.user_target)
    }

    pub fn set_automatic(&mut self, enabled: bool) {
        self.automatic = enabled;
    }

    pub fn automatic(&self) -> bool {
        self.automatic
    }

    /// Centre every sub-motion, one at a time: sideways, settle, forward,
    /// settle, rotate.  Deliberately synchronous — later servos must not
    /// start until earlier ones have fully settled, so this blocks the whole
    /// controller during setup.  `settle` performs the pause.
    pub fn center_all<S: ServoPort>(
        &mut self,
        servos: &mut S,
        settle_ms: u32,
        settle: &mut impl FnMut(u32),
    ) {
        let order = [
            SubMotionId::TiltSideways,
            SubMotionId::TiltForward,
            SubMotionId::Rotate,
        ];
        for (i, id) in order.into_iter().enumerate() {
            if let Some(sub) = self.sub(id) {
                sub.command(0.0, 0, 0, servos);
                if i < order.len() - 1 {
                    settle(settle_ms);
                }
            }
        }
    }

    /// One control cycle: advance every tween, then run the idle schedulers
    /// when automatic mode is enabled.
    pub fn tick<S: ServoPort>(&mut self, now_ms: u64, rng: &mut SmallRng, servos: &mut S) {
        for sub in self.sub_motions.iter_mut().flatten() {
            if let Some(value) = sub.tween.tick(now_ms) {
                sub.emit(value, servos);
            }
        }

        if !self.automatic {
            return;
        }

        for sub in self.sub_motions.iter_mut().flatten() {
            let fired = sub
                .idle
                .as_mut()
                .and_then(|idle| idle.poll(now_ms, rng));
            if let Some(cmd) = fired {
                debug!(
                    "{}: idle gesture {:.0}° over {}ms",
                    self.name, cmd.degree, cmd.duration_ms
                );
                sub.command(cmd.degree, cmd.duration_ms, now_ms, servos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingServos {
        last: HashMap<u8, f64>,
        writes: Vec<(u8, f64)>,
    }

    impl ServoPort for RecordingServos {
        fn write_degrees(&mut self, channel: u8, degrees: f64) {
            self.last.insert(channel, degrees);
            self.writes.push((channel, degrees));
        }
    }

    #[test]
    fn neck_maps_signed_degrees_into_actuator_space() {
        let mut neck = AxisController::neck(1000);
        neck.set_automatic(false);
        let mut servos = RecordingServos::default();

        neck.command(SubMotionId::Rotate, 45.0, Some(1000), 0, &mut servos);
        // Tween still at centre immediately after the command.
        assert_eq!(neck.position(SubMotionId::Rotate), 90.0);

        neck.tick(2000, &mut SmallRng::seed_from_u64(1), &mut servos);
        assert_eq!(neck.position(SubMotionId::Rotate), 135.0);
        assert_eq!(servos.last[&CH_HEAD_ROTATE], 135.0);
    }

    #[test]
    fn calibration_applies_at_command_time() {
        let mut neck = AxisController::neck(1000);
        neck.set_automatic(false);
        let mut servos = RecordingServos::default();

        neck.set_calibration(SubMotionId::Rotate, -10);
        neck.command(SubMotionId::Rotate, 0.0, Some(0), 0, &mut servos);
        assert_eq!(servos.last[&CH_HEAD_ROTATE], 80.0);

        // A later calibration change does not retarget the resting servo.
        neck.set_calibration(SubMotionId::Rotate, 20);
        assert_eq!(neck.position(SubMotionId::Rotate), 80.0);
    }

    #[test]
    fn out_of_range_input_clamps_silently() {
        let mut neck = AxisController::neck(1000);
        neck.set_automatic(false);
        let mut servos = RecordingServos::default();

        neck.command(SubMotionId::Rotate, 500.0, Some(0), 0, &mut servos);
        assert_eq!(servos.last[&CH_HEAD_ROTATE], 180.0);
        neck.command(SubMotionId::Rotate, -500.0, Some(0), 0, &mut servos);
        assert_eq!(servos.last[&CH_HEAD_ROTATE], 0.0);
    }

    #[test]
    fn command_target_retargets_all_three_sub_motions_at_once() {
        let mut neck = AxisController::neck(1000);
        neck.set_automatic(false);
        let mut servos = RecordingServos::default();

        neck.command_target(45.0, -30.0, 10.0, Some(0), 0, &mut servos);
        assert_eq!(servos.last[&CH_HEAD_ROTATE], 135.0);
        assert_eq!(servos.last[&CH_HEAD_TILT_FORWARD], 60.0);
        assert_eq!(servos.last[&CH_HEAD_TILT_SIDEWAYS], 100.0);
    }

    #[test]
    fn user_target_reports_the_signed_command_not_tween_progress() {
        let mut neck = AxisController::neck(1000);
        neck.set_automatic(false);
        let mut servos = RecordingServos::default();

        neck.command(SubMotionId::Rotate, 45.0, Some(1000), 0, &mut servos);
        neck.tick(200, &mut SmallRng::seed_from_u64(1), &mut servos);
        // Mid-flight: actuator position lags, the reported target does not.
        assert!(neck.position(SubMotionId::Rotate) < 135.0);
        assert_eq!(neck.user_target(SubMotionId::Rotate), 45.0);

        // Calibration shifts the servo, not the user-facing value.
        neck.set_calibration(SubMotionId::TiltForward, 12);
        neck.command(SubMotionId::TiltForward, -20.0, Some(0), 1000, &mut servos);
        assert_eq!(neck.user_target(SubMotionId::TiltForward), -20.0);
        assert_eq!(servos.last[&CH_HEAD_TILT_FORWARD], 82.0);
    }

    #[test]
    fn body_tilt_drives_antagonist_pair_with_complement() {
        let mut body = AxisController::body();
        body.set_automatic(false);
        let mut servos = RecordingServos::default();

        body.command(SubMotionId::TiltSideways, 30.0, None, 0, &mut servos);
        assert_eq!(servos.last[&CH_BODY_SIDEWAY_LEFT], 120.0);
        assert_eq!(servos.last[&CH_BODY_SIDEWAY_RIGHT], 60.0);
    }

    #[test]
    fn body_commands_apply_immediately_by_default() {
        let mut body = AxisController::body();
        body.set_automatic(false);
        let mut servos = RecordingServos::default();

        body.command(SubMotionId::Rotate, -30.0, None, 0, &mut servos);
        assert_eq!(body.position(SubMotionId::Rotate), 60.0);
        assert_eq!(servos.last[&CH_BODY_ROTATE], 60.0);
    }

    #[test]
    fn accessory_uses_raw_range() {
        let mut acc = AxisController::accessory(500);
        let mut servos = RecordingServos::default();

        acc.command(SubMotionId::Rotate, 120.0, Some(0), 0, &mut servos);
        assert_eq!(servos.last[&CH_HEAD_ACCESSORY], 120.0);
        // Only one sub-motion exists.
        acc.command(SubMotionId::TiltForward, 50.0, Some(0), 0, &mut servos);
        assert!(!servos.last.contains_key(&CH_HEAD_TILT_FORWARD));
    }

    #[test]
    fn center_all_runs_sideways_forward_rotate_with_settles() {
        let mut body = AxisController::body();
        body.set_automatic(false);
        let mut servos = RecordingServos::default();
        let mut settles = Vec::new();

        body.center_all(&mut servos, 500, &mut |ms| settles.push(ms));

        assert_eq!(settles, vec![500, 500]);
        let channels: Vec<u8> = servos.writes.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            channels,
            vec![
                CH_BODY_SIDEWAY_LEFT,
                CH_BODY_SIDEWAY_RIGHT,
                CH_BODY_FORWARD_LEFT,
                CH_BODY_FORWARD_RIGHT,
                CH_BODY_ROTATE,
            ]
        );
        assert!(servos.writes.iter().all(|(_, d)| *d == 90.0));
    }

    #[test]
    fn idle_wander_only_in_automatic_mode() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut neck = AxisController::neck(1000);
        let mut servos = RecordingServos::default();

        neck.set_automatic(false);
        for now in (0..60_000).step_by(20) {
            neck.tick(now, &mut rng, &mut servos);
        }
        assert!(servos.writes.is_empty(), "manual mode must stay still");

        neck.set_automatic(true);
        for now in (60_000..120_000).step_by(20) {
            neck.tick(now, &mut rng, &mut servos);
        }
        assert!(!servos.writes.is_empty(), "automatic mode must wander");
        assert!(servos.writes.iter().all(|(_, d)| (0.0..=180.0).contains(d)));
    }
}
