//! Port traits — the hexagonal boundary between the control core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DroidService (domain)
//! ```
//!
//! Driven adapters (servo bus, eye displays, status lights, calibration
//! storage, event sinks) implement these traits.  The
//! [`DroidService`](super::service::DroidService) consumes them via
//! generics, so the control core never touches hardware directly and every
//! controller is testable with mock adapters.

use crate::calibration::CalibrationData;
use crate::face::EyeSide;

// ───────────────────────────────────────────────────────────────
// Servo port (domain → PWM hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the servo bus.
///
/// `degrees` is always in actuator space (0–180); the adapter owns the
/// degree→pulse mapping and the physical write.  Calls are fire-and-forget:
/// the core has no rejection path for actuator output (clamping happens
/// before this boundary).
pub trait ServoPort {
    fn write_degrees(&mut self, channel: u8, degrees: f64);
}

// ───────────────────────────────────────────────────────────────
// Display port (domain → eye displays)
// ───────────────────────────────────────────────────────────────

/// Draw-side port for the two eye displays.
///
/// Coordinates are pixels on the addressed eye's panel.  The core only uses
/// the handful of primitives the expression renderer needs; adapters map
/// them onto whatever graphics stack drives the panels.
pub trait DisplayPort {
    fn width(&self) -> u16;
    fn height(&self) -> u16;

    /// Fill the whole panel of one eye.
    fn fill(&mut self, eye: EyeSide, color: u16);

    /// Fast horizontal line (one scan row) on one eye.
    fn hline(&mut self, eye: EyeSide, x: i32, y: i32, w: i32, color: u16);

    /// Filled circle (pupil).
    fn fill_circle(&mut self, eye: EyeSide, cx: i32, cy: i32, r: i32, color: u16);

    /// Circle outline (focus ring).
    fn draw_circle(&mut self, eye: EyeSide, cx: i32, cy: i32, r: i32, color: u16);

    /// Straight line (eyebrow).
    fn line(&mut self, eye: EyeSide, x0: i32, y0: i32, x1: i32, y1: i32, color: u16);
}

// ───────────────────────────────────────────────────────────────
// Light port (domain → status-light array)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the chest status lights.
pub trait LightPort {
    /// Set every pixel in the array to one colour.
    fn set_all(&mut self, r: u8, g: u8, b: u8);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s through
/// this port.  Adapters decide where they go (serial log, gateway push,
/// telemetry buffer, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Calibration store port (domain ↔ persistent snapshot)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the calibration snapshot.
///
/// The core never initiates persistence itself: the gateway calls `save`
/// on explicit user command, and `load` runs once at boot before the first
/// centering pass.  A missing or corrupt snapshot falls back to
/// [`CalibrationData::default()`].
pub trait CalibrationStore {
    fn load(&self) -> Result<CalibrationData, StoreError>;
    fn save(&self, data: &CalibrationData) -> Result<(), StoreError>;
}

/// Errors from [`CalibrationStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// No snapshot found in storage (first boot).
    NotFound,
    /// Stored snapshot failed deserialization.
    Corrupted,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "calibration not found"),
            Self::Corrupted => write!(f, "calibration corrupted"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
