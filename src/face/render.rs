//! Deterministic draw routines for each expression.
//!
//! Every expression maps to exactly one routine.  Open/Closed/Focus have a
//! dual-eye variant and a single-eye variant that differ only in which
//! panel(s) they address; Sad/Angry take an eyebrow orientation flag,
//! mirrored left vs. right, so the rendered face is asymmetric.

use crate::app::ports::DisplayPort;

use super::EyeSide;

pub const COLOR_BLACK: u16 = 0x0000;
pub const COLOR_WHITE: u16 = 0xFFFF;

/// Open eye: full iris fill with a centred pupil.
pub fn draw_open<D: DisplayPort>(d: &mut D, eye: EyeSide, color: u16) {
    let (w, h) = (i32::from(d.width()), i32::from(d.height()));
    d.fill(eye, color);
    d.fill_circle(eye, w / 2, h / 2, w / 4, COLOR_BLACK);
}

/// Closed eye: lid fully down.
pub fn draw_closed<D: DisplayPort>(d: &mut D, eye: EyeSide) {
    d.fill(eye, COLOR_BLACK);
}

/// Focused eye: narrowed pupil with a highlight ring.
pub fn draw_focus<D: DisplayPort>(d: &mut D, eye: EyeSide, color: u16) {
    let (w, h) = (i32::from(d.width()), i32::from(d.height()));
    d.fill(eye, color);
    d.fill_circle(eye, w / 2, h / 2, w / 5, COLOR_BLACK);
    d.draw_circle(eye, w / 2, h / 2, w / 4, COLOR_WHITE);
}

/// Sad eye: drooping eyebrow.  `inner` selects which end of the brow sits
/// high; the caller mirrors it between the two eyes.
pub fn draw_sad<D: DisplayPort>(d: &mut D, eye: EyeSide, inner: bool, color: u16) {
    let (w, h) = (i32::from(d.width()), i32::from(d.height()));
    d.fill(eye, color);
    d.fill_circle(eye, w / 2, h / 2, w / 4, COLOR_BLACK);
    let y = h / 4;
    if inner {
        d.line(eye, w / 4, y, w * 3 / 4, y + 10, COLOR_WHITE);
    } else {
        d.line(eye, w / 4, y + 10, w * 3 / 4, y, COLOR_WHITE);
    }
}

/// Angry eye: slanted eyebrow, the mirror image of [`draw_sad`].
pub fn draw_angry<D: DisplayPort>(d: &mut D, eye: EyeSide, inner: bool, color: u16) {
    let (w, h) = (i32::from(d.width()), i32::from(d.height()));
    d.fill(eye, color);
    d.fill_circle(eye, w / 2, h / 2, w / 4, COLOR_BLACK);
    let y = h / 4;
    if inner {
        d.line(eye, w / 4, y + 10, w * 3 / 4, y, COLOR_WHITE);
    } else {
        d.line(eye, w / 4, y, w * 3 / 4, y + 10, COLOR_WHITE);
    }
}

/// Eyebrow orientation for the asymmetric expressions: sad brows point
/// inward on the left eye, angry brows inward on the right.
pub fn sad_brow_inner(eye: EyeSide) -> bool {
    matches!(eye, EyeSide::Left)
}

pub fn angry_brow_inner(eye: EyeSide) -> bool {
    matches!(eye, EyeSide::Right)
}
