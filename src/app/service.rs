//! Droid service — the hexagonal core.
//!
//! [`DroidService`] owns the three axis controllers, the expression
//! controller, the light controller, and the calibration snapshot.  It
//! exposes a clean, hardware-agnostic API.  All I/O flows through port
//! traits injected at call sites, making the entire service testable with
//! mock adapters.
//!
//! ```text
//!  CommandQueue ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                   │         DroidService          │
//!    ServoPort ◀────│  Neck · Body · Accessory      │
//!  DisplayPort ◀────│  Face · Lights · Calibration  │
//!    LightPort ◀────└──────────────────────────────┘
//! ```

use log::{info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::calibration::CalibrationData;
use crate::config::DroidConfig;
use crate::error::Result;
use crate::face::{ExpressionController, EyeExpression, EyeSide};
use crate::lights::{LightController, LightMode};
use crate::motion::{AxisController, SubMotionId};

use super::commands::{CalTarget, CommandConsumer, DroidCommand};
use super::events::{AppEvent, StateSnapshot};
use super::ports::{CalibrationStore, DisplayPort, EventSink, LightPort, ServoPort};

// ───────────────────────────────────────────────────────────────
// DroidService
// ───────────────────────────────────────────────────────────────

/// The droid service orchestrates all domain logic.
pub struct DroidService {
    neck: AxisController,
    body: AxisController,
    accessory: AxisController,
    face: ExpressionController,
    lights: LightController,
    calibration: CalibrationData,
    automatic: bool,
    center_settle_ms: u32,
    tick_count: u64,
    rng: SmallRng,
}

impl DroidService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch hardware — call [`start`](Self::start) next to
    /// load calibration and centre the servos.
    pub fn new(config: &DroidConfig, seed: u64) -> Self {
        Self {
            neck: AxisController::neck(config.neck_default_duration_ms),
            body: AxisController::body(),
            accessory: AxisController::accessory(config.accessory_default_duration_ms),
            face: ExpressionController::new(
                config.eye_color,
                config.sweep_step_ms,
                SmallRng::seed_from_u64(seed ^ 0x9e37_79b9),
            ),
            lights: LightController::new(),
            calibration: CalibrationData::default(),
            automatic: true,
            center_settle_ms: config.center_settle_ms,
            tick_count: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot sequence: load the calibration snapshot, apply its trims, and
    /// run the staged centering pass.  `settle` performs the pause between
    /// centering stages; later servos must not start before earlier ones
    /// have mechanically settled.
    pub fn start<S, C, E>(
        &mut self,
        store: &mut C,
        servos: &mut S,
        settle: &mut impl FnMut(u32),
        sink: &mut E,
    ) -> Result<()>
    where
        S: ServoPort,
        C: CalibrationStore,
        E: EventSink,
    {
        self.calibration = CalibrationData::load_or_default(store)?;
        self.apply_trims();
        info!(
            "droid \"{}\" booting, movement speed {}",
            self.calibration.settings.name, self.calibration.settings.movement_speed
        );

        self.center_all(servos, settle);
        sink.emit(&AppEvent::Started);
        Ok(())
    }

    /// Centre neck then body, one sub-motion at a time with settle pauses.
    pub fn center_all<S: ServoPort>(&mut self, servos: &mut S, settle: &mut impl FnMut(u32)) {
        info!("centering all axes");
        self.neck.center_all(servos, self.center_settle_ms, settle);
        self.body.center_all(servos, self.center_settle_ms, settle);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: advance tweens and idle schedulers,
    /// advance eye animations and the blink cadence, refresh the lights.
    pub fn tick<HW, E>(&mut self, now_ms: u64, hw: &mut HW, sink: &mut E)
    where
        HW: ServoPort + DisplayPort + LightPort,
        E: EventSink,
    {
        self.tick_count += 1;
        self.neck.tick(now_ms, &mut self.rng, hw);
        self.body.tick(now_ms, &mut self.rng, hw);
        self.accessory.tick(now_ms, &mut self.rng, hw);
        self.face.tick(now_ms, hw, sink);
        self.lights.tick(now_ms, hw);
    }

    /// Drain every pending gateway command.  Single consumer; runs at the
    /// top of each control cycle.
    pub fn drain_commands<HW, C, E>(
        &mut self,
        consumer: &mut CommandConsumer<'_>,
        now_ms: u64,
        hw: &mut HW,
        store: &mut C,
        settle: &mut impl FnMut(u32),
        sink: &mut E,
    ) where
        HW: ServoPort + DisplayPort + LightPort,
        C: CalibrationStore,
        E: EventSink,
    {
        while let Some(cmd) = consumer.dequeue() {
            self.handle_command(cmd, now_ms, hw, store, settle, sink);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process one external command.  Invalid inputs degrade, never fail:
    /// out-of-range degrees clamp, unknown codes map to safe defaults, and
    /// store errors are logged without disturbing motion state.
    pub fn handle_command<HW, C, E>(
        &mut self,
        cmd: DroidCommand,
        now_ms: u64,
        hw: &mut HW,
        store: &mut C,
        settle: &mut impl FnMut(u32),
        sink: &mut E,
    ) where
        HW: ServoPort + DisplayPort + LightPort,
        C: CalibrationStore,
        E: EventSink,
    {
        match cmd {
            DroidCommand::Neck {
                rotate,
                tilt_forward,
                tilt_sideways,
                duration_ms,
            } => self
                .neck
                .command_target(rotate, tilt_forward, tilt_sideways, duration_ms, now_ms, hw),
            DroidCommand::Body {
                rotate,
                tilt_forward,
                tilt_sideways,
                duration_ms,
            } => self
                .body
                .command_target(rotate, tilt_forward, tilt_sideways, duration_ms, now_ms, hw),
            DroidCommand::Accessory { degree, duration_ms } => self
                .accessory
                .command(SubMotionId::Rotate, degree, duration_ms, now_ms, hw),
            DroidCommand::Eyes { scope, code } => {
                self.face
                    .set_eyes(scope, EyeExpression::from_code(code), now_ms);
            }
            DroidCommand::Lights { code } => {
                let mode = LightMode::from_code(code);
                if mode != self.lights.mode() {
                    sink.emit(&AppEvent::LightModeChanged(mode));
                }
                self.lights.set_mode(mode, now_ms);
            }
            DroidCommand::SetAutomatic(enabled) => {
                if enabled != self.automatic {
                    info!("automatic mode {}", if enabled { "on" } else { "off" });
                    sink.emit(&AppEvent::AutomaticChanged(enabled));
                }
                self.automatic = enabled;
                self.neck.set_automatic(enabled);
                self.body.set_automatic(enabled);
                self.accessory.set_automatic(enabled);
                self.face.set_automatic(enabled);
            }
            DroidCommand::CenterAll => self.center_all(hw, settle),
            DroidCommand::SetCalibration { target, offset } => {
                self.set_calibration(target, offset);
            }
            DroidCommand::SaveCalibration => match store.save(&self.calibration) {
                Ok(()) => sink.emit(&AppEvent::CalibrationSaved),
                Err(e) => warn!("calibration save failed: {e}"),
            },
            DroidCommand::ResetCalibration => {
                self.calibration.reset();
                self.apply_trims();
                if let Err(e) = store.save(&self.calibration) {
                    warn!("calibration reset save failed: {e}");
                }
                sink.emit(&AppEvent::CalibrationReset);
            }
            DroidCommand::UpdateSettings(settings) => {
                info!(
                    "settings: name \"{}\", movement speed {}",
                    settings.name, settings.movement_speed
                );
                self.calibration.settings = settings.clone();
                sink.emit(&AppEvent::SettingsUpdated(settings));
            }
        }
    }

    fn set_calibration(&mut self, target: CalTarget, offset: i16) {
        match target {
            CalTarget::Neck(id) => {
                self.calibration.neck.set(id, offset);
                self.neck.set_calibration(id, offset);
            }
            CalTarget::Body(id) => {
                self.calibration.body.set(id, offset);
                self.body.set_calibration(id, offset);
            }
            CalTarget::Accessory => {
                self.calibration.accessory = offset;
                self.accessory.set_calibration(SubMotionId::Rotate, offset);
            }
        }
    }

    /// Push the snapshot's trims into the live controllers.
    fn apply_trims(&mut self) {
        for id in [
            SubMotionId::Rotate,
            SubMotionId::TiltForward,
            SubMotionId::TiltSideways,
        ] {
            self.neck.set_calibration(id, self.calibration.neck.get(id));
            self.body.set_calibration(id, self.calibration.body.get(id));
        }
        self.accessory
            .set_calibration(SubMotionId::Rotate, self.calibration.accessory);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a state snapshot for gateway read-back.  Axis fields are the
    /// last user-facing targets (signed degrees, raw for the accessory),
    /// alongside the full calibration block.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            automatic: self.automatic,
            neck_rotate: self.neck.user_target(SubMotionId::Rotate),
            neck_tilt_forward: self.neck.user_target(SubMotionId::TiltForward),
            neck_tilt_sideways: self.neck.user_target(SubMotionId::TiltSideways),
            body_rotate: self.body.user_target(SubMotionId::Rotate),
            body_tilt_forward: self.body.user_target(SubMotionId::TiltForward),
            body_tilt_sideways: self.body.user_target(SubMotionId::TiltSideways),
            accessory: self.accessory.user_target(SubMotionId::Rotate),
            eye_left: self.face.current(EyeSide::Left),
            eye_right: self.face.current(EyeSide::Right),
            light_mode: self.lights.mode(),
            calibration: self.calibration.clone(),
        }
    }

    /// Whether autonomous behaviour is enabled.
    pub fn automatic(&self) -> bool {
        self.automatic
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Clone of the live calibration snapshot (for read-back or tests).
    pub fn calibration(&self) -> CalibrationData {
        self.calibration.clone()
    }
}
