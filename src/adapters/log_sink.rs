//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger.  A gateway push adapter would implement the same trait.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | boot complete"),
            AppEvent::AutomaticChanged(on) => {
                info!("AUTO  | {}", if *on { "enabled" } else { "disabled" });
            }
            AppEvent::EyeTransition { scope, state } => {
                info!("EYES  | {scope:?} -> {state:?}");
            }
            AppEvent::IdleExpression(state) => info!("EYES  | idle pick {state:?}"),
            AppEvent::LightModeChanged(mode) => info!("LIGHT | {mode:?}"),
            AppEvent::CalibrationSaved => info!("CALIB | saved"),
            AppEvent::CalibrationReset => info!("CALIB | reset to defaults"),
            AppEvent::SettingsUpdated(s) => {
                info!("SETUP | name=\"{}\" speed={}", s.name, s.movement_speed);
            }
        }
    }
}
