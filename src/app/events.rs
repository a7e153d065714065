//! Outbound application events.
//!
//! The [`DroidService`](super::service::DroidService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, push to the gateway,
//! or record for tests.

use serde::Serialize;

use crate::calibration::{CalibrationData, DroidSettings};
use crate::face::{EyeExpression, EyeScope};
use crate::lights::LightMode;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service finished booting (calibration loaded, servos centered).
    Started,

    /// Autonomous behaviour was enabled or disabled.
    AutomaticChanged(bool),

    /// An eye transition animation began.
    EyeTransition {
        scope: EyeScope,
        state: EyeExpression,
    },

    /// The idle scheduler picked a new expression for both eyes.
    IdleExpression(EyeExpression),

    /// The chest light pattern changed.
    LightModeChanged(LightMode),

    /// Calibration was persisted to the store.
    CalibrationSaved,

    /// Calibration and settings were restored to factory defaults.
    CalibrationReset,

    /// Operator settings were replaced.
    SettingsUpdated(DroidSettings),
}

/// A point-in-time state snapshot, serializable for gateway read-back.
///
/// Axis fields carry the last user-facing targets in signed degrees (raw
/// degrees for the accessory), not actuator positions: a gateway that sent
/// `rotate = 45` reads `45` back even while the tween is still travelling.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub automatic: bool,
    pub neck_rotate: f64,
    pub neck_tilt_forward: f64,
    pub neck_tilt_sideways: f64,
    pub body_rotate: f64,
    pub body_tilt_forward: f64,
    pub body_tilt_sideways: f64,
    pub accessory: f64,
    pub eye_left: EyeExpression,
    pub eye_right: EyeExpression,
    pub light_mode: LightMode,
    pub calibration: CalibrationData,
}
