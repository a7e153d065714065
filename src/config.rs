//! System configuration parameters
//!
//! All tunable parameters for the droid motion and expression core.
//! Values are compiled-in defaults; the host binary can override them
//! from a JSON file next to the calibration snapshot.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

/// Core timing and appearance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroidConfig {
    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Settle pause between centering stages (milliseconds)
    pub center_settle_ms: u32,
    /// Default eased-move duration for neck commands (milliseconds)
    pub neck_default_duration_ms: u64,
    /// Default eased-move duration for the head accessory (milliseconds)
    pub accessory_default_duration_ms: u64,

    // --- Eyes ---
    /// RGB565 iris colour
    pub eye_color: u16,
    /// Delay between animation rows (milliseconds)
    pub sweep_step_ms: u64,
}

impl Default for DroidConfig {
    fn default() -> Self {
        Self {
            // Timing
            control_loop_interval_ms: 20, // 50 Hz
            center_settle_ms: 500,
            neck_default_duration_ms: 1000,
            accessory_default_duration_ms: 500,

            // Eyes
            eye_color: 0x07E0, // green
            sweep_step_ms: 2,
        }
    }
}

impl DroidConfig {
    /// Read an override file, falling back to the compiled-in defaults when
    /// it is absent.  A file that exists but does not parse is ignored with
    /// a warning rather than aborting the boot.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    warn!("config override {} unreadable: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
