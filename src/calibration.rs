//! Persisted calibration and settings snapshot.
//!
//! Offsets are mechanical trim values in servo degrees, added after the
//! +90 user-offset shift and clamped with the rest of the command path.
//! The whole snapshot serializes as one JSON document through the
//! `CalibrationStore` port.

use serde::{Deserialize, Serialize};

use crate::app::ports::{CalibrationStore, StoreError};
use crate::motion::SubMotionId;

pub const DEFAULT_DROID_NAME: &str = "Droid";
pub const DEFAULT_MOVEMENT_SPEED: u8 = 100;

/// Trim offsets for one three-axis controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisTrim {
    pub rotate: i16,
    pub tilt_forward: i16,
    pub tilt_sideways: i16,
}

impl AxisTrim {
    pub fn get(&self, id: SubMotionId) -> i16 {
        match id {
            SubMotionId::Rotate => self.rotate,
            SubMotionId::TiltForward => self.tilt_forward,
            SubMotionId::TiltSideways => self.tilt_sideways,
        }
    }

    pub fn set(&mut self, id: SubMotionId, value: i16) {
        match id {
            SubMotionId::Rotate => self.rotate = value,
            SubMotionId::TiltForward => self.tilt_forward = value,
            SubMotionId::TiltSideways => self.tilt_sideways = value,
        }
    }
}

/// Operator-tunable settings carried alongside the trims.
///
/// `movement_speed` is stored and reported for the remote UI; the motion
/// core itself derives its pacing from explicit durations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroidSettings {
    pub name: heapless::String<32>,
    pub movement_speed: u8,
}

impl Default for DroidSettings {
    fn default() -> Self {
        let mut name = heapless::String::new();
        let _ = name.push_str(DEFAULT_DROID_NAME);
        Self {
            name,
            movement_speed: DEFAULT_MOVEMENT_SPEED,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationData {
    pub neck: AxisTrim,
    pub body: AxisTrim,
    pub accessory: i16,
    #[serde(default)]
    pub settings: DroidSettings,
}

impl CalibrationData {
    /// Load from the store, falling back to defaults when nothing has been
    /// persisted yet.  A corrupted snapshot is also replaced by defaults;
    /// the caller logs the condition.
    pub fn load_or_default<S: CalibrationStore>(store: &mut S) -> Result<Self, StoreError> {
        match store.load() {
            Ok(data) => Ok(data),
            Err(StoreError::NotFound | StoreError::Corrupted) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
