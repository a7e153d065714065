//! Chest light patterns.
//!
//! A small stateless-per-tick pattern generator: the controller holds the
//! active mode and a phase origin, and every cycle recomputes the RGB frame
//! from elapsed time.  Frames are only pushed to the port when they change,
//! so a static mode costs one write.

use log::info;
use serde::Serialize;

use crate::app::ports::LightPort;

/// Wire-addressable light modes; serializes by name into the state
/// snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u16)]
pub enum LightMode {
    Off = 0,
    StaticBlue = 1,
    WarningBlink = 2,
    ProcessingFade = 3,
    Mode1 = 4,
    Mode2 = 5,
}

impl LightMode {
    /// Total mapping from a gateway integer code; unknown codes turn the
    /// lights off.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::StaticBlue,
            2 => Self::WarningBlink,
            3 => Self::ProcessingFade,
            4 => Self::Mode1,
            5 => Self::Mode2,
            _ => Self::Off,
        }
    }
}

const WARNING_PHASE_MS: u64 = 500;
const FADE_PERIOD_MS: u64 = 2000;

pub struct LightController {
    mode: LightMode,
    phase_origin_ms: u64,
    last_frame: Option<(u8, u8, u8)>,
}

impl LightController {
    pub fn new() -> Self {
        Self {
            mode: LightMode::Off,
            phase_origin_ms: 0,
            last_frame: None,
        }
    }

    pub fn mode(&self) -> LightMode {
        self.mode
    }

    /// Switch patterns.  Resets the phase so blink and fade always start
    /// from the beginning of their cycle.
    pub fn set_mode(&mut self, mode: LightMode, now_ms: u64) {
        if self.mode != mode {
            info!("lights: {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        self.phase_origin_ms = now_ms;
        self.last_frame = None;
    }

    pub fn tick<P: LightPort>(&mut self, now_ms: u64, lights: &mut P) {
        let phase = now_ms.wrapping_sub(self.phase_origin_ms);
        let frame = Self::generate(self.mode, phase);
        if self.last_frame != Some(frame) {
            let (r, g, b) = frame;
            lights.set_all(r, g, b);
            self.last_frame = Some(frame);
        }
    }

    fn generate(mode: LightMode, phase_ms: u64) -> (u8, u8, u8) {
        match mode {
            LightMode::Off => (0, 0, 0),
            LightMode::StaticBlue => (0, 0, 255),
            LightMode::WarningBlink => {
                // 500ms red, 500ms blue.
                if phase_ms % (2 * WARNING_PHASE_MS) < WARNING_PHASE_MS {
                    (255, 0, 0)
                } else {
                    (0, 0, 255)
                }
            }
            LightMode::ProcessingFade => {
                let level = Self::triangle_brightness(phase_ms, FADE_PERIOD_MS);
                (0, level, level)
            }
            LightMode::Mode1 => (255, 128, 0),
            LightMode::Mode2 => (128, 0, 255),
        }
    }

    /// Triangular ramp 0→255→0 over `period_ms`.  Close enough to a sine
    /// for an indicator fade and needs no float math.
    fn triangle_brightness(phase_ms: u64, period_ms: u64) -> u8 {
        let pos = phase_ms % period_ms;
        let half = period_ms / 2;
        if pos < half {
            ((pos * 255) / half) as u8
        } else {
            (((period_ms - pos) * 255) / half) as u8
        }
    }
}

impl Default for LightController {
    fn default() -> Self {
        Self::new()
    }
}
