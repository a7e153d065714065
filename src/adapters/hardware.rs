//! Simulated hardware adapter.
//!
//! Implements all three output ports against in-memory recorders, backing
//! the host-side simulation binary and every integration test.  A firmware
//! build swaps in adapters that drive the PCA9685 servo bus and the eye
//! panels instead; the core never notices the difference.

use std::collections::HashMap;

use crate::app::ports::{DisplayPort, LightPort, ServoPort};
use crate::face::EyeSide;

/// Panel geometry of the round eye displays.
const PANEL_WIDTH: u16 = 240;
const PANEL_HEIGHT: u16 = 240;

/// One recorded display primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOp {
    Fill,
    Hline,
    FillCircle,
    DrawCircle,
    Line,
}

/// Recording implementation of every output port.
pub struct SimulatedHardware {
    servo_last: HashMap<u8, f64>,
    servo_writes: Vec<(u8, f64)>,
    display_log: Vec<(EyeSide, DisplayOp)>,
    light_frames: Vec<(u8, u8, u8)>,
}

impl Default for SimulatedHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedHardware {
    pub fn new() -> Self {
        Self {
            servo_last: HashMap::new(),
            servo_writes: Vec::new(),
            display_log: Vec::new(),
            light_frames: Vec::new(),
        }
    }

    /// Last commanded position of one servo channel.
    pub fn servo_position(&self, channel: u8) -> Option<f64> {
        self.servo_last.get(&channel).copied()
    }

    /// Every servo write in order.
    pub fn servo_writes(&self) -> &[(u8, f64)] {
        &self.servo_writes
    }

    /// Total number of display primitives drawn.
    pub fn display_ops(&self) -> usize {
        self.display_log.len()
    }

    /// Number of display primitives drawn on one eye.
    pub fn display_ops_for(&self, eye: EyeSide) -> usize {
        self.display_log.iter().filter(|(e, _)| *e == eye).count()
    }

    /// Every light frame pushed, in order.
    pub fn light_frames(&self) -> &[(u8, u8, u8)] {
        &self.light_frames
    }
}

impl ServoPort for SimulatedHardware {
    fn write_degrees(&mut self, channel: u8, degrees: f64) {
        self.servo_last.insert(channel, degrees);
        self.servo_writes.push((channel, degrees));
    }
}

impl DisplayPort for SimulatedHardware {
    fn width(&self) -> u16 {
        PANEL_WIDTH
    }

    fn height(&self) -> u16 {
        PANEL_HEIGHT
    }

    fn fill(&mut self, eye: EyeSide, _color: u16) {
        self.display_log.push((eye, DisplayOp::Fill));
    }

    fn hline(&mut self, eye: EyeSide, _x: i32, _y: i32, _w: i32, _color: u16) {
        self.display_log.push((eye, DisplayOp::Hline));
    }

    fn fill_circle(&mut self, eye: EyeSide, _cx: i32, _cy: i32, _r: i32, _color: u16) {
        self.display_log.push((eye, DisplayOp::FillCircle));
    }

    fn draw_circle(&mut self, eye: EyeSide, _cx: i32, _cy: i32, _r: i32, _color: u16) {
        self.display_log.push((eye, DisplayOp::DrawCircle));
    }

    fn line(&mut self, eye: EyeSide, _x0: i32, _y0: i32, _x1: i32, _y1: i32, _color: u16) {
        self.display_log.push((eye, DisplayOp::Line));
    }
}

impl LightPort for SimulatedHardware {
    fn set_all(&mut self, r: u8, g: u8, b: u8) {
        self.light_frames.push((r, g, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_per_eye_operations() {
        let mut hw = SimulatedHardware::new();
        hw.fill(EyeSide::Left, 0);
        hw.hline(EyeSide::Left, 0, 0, 10, 0);
        hw.fill(EyeSide::Right, 0);
        assert_eq!(hw.display_ops(), 3);
        assert_eq!(hw.display_ops_for(EyeSide::Left), 2);
        assert_eq!(hw.display_ops_for(EyeSide::Right), 1);
    }

    #[test]
    fn tracks_last_servo_position() {
        let mut hw = SimulatedHardware::new();
        hw.write_degrees(8, 45.0);
        hw.write_degrees(8, 135.0);
        assert_eq!(hw.servo_position(8), Some(135.0));
        assert_eq!(hw.servo_writes().len(), 2);
    }
}
