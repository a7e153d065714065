//! Tick-driven scan-line transition animations.
//!
//! The expression transitions (open, close, focus, sad, angry) sweep
//! horizontal rows across the eye panels.  Each [`Sweep`] stores its own
//! step index and next-step deadline and is advanced once per control
//! cycle; a cycle that arrives late catches up by drawing every step that
//! has come due, so the animation keeps wall-clock pace without ever
//! blocking the loop.

use crate::app::ports::DisplayPort;

use super::render::{self, COLOR_BLACK};
use super::{EyeExpression, EyeSide};

/// Which transition family the sweep animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    Open,
    Close,
    Focus,
    Sad,
    Angry,
}

impl SweepKind {
    /// Expression committed to the eye(s) when the sweep completes.
    pub fn finish_state(self) -> EyeExpression {
        match self {
            Self::Open => EyeExpression::Open,
            Self::Close => EyeExpression::Closed,
            Self::Focus => EyeExpression::Focus,
            Self::Sad => EyeExpression::Sad,
            Self::Angry => EyeExpression::Angry,
        }
    }
}

/// Panels addressed by the sweep: the synchronized dual-eye animation or an
/// independent single-eye one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepScope {
    Both,
    Single(EyeSide),
}

impl SweepScope {
    pub fn covers(self, eye: EyeSide) -> bool {
        match self {
            Self::Both => true,
            Self::Single(side) => side == eye,
        }
    }

    fn eyes(self) -> [Option<EyeSide>; 2] {
        match self {
            Self::Both => [Some(EyeSide::Left), Some(EyeSide::Right)],
            Self::Single(side) => [Some(side), None],
        }
    }
}

/// One in-flight transition animation.
#[derive(Debug)]
pub struct Sweep {
    kind: SweepKind,
    scope: SweepScope,
    color: u16,
    step: u16,
    steps: u16,
    next_step_at: u64,
    step_interval_ms: u64,
}

impl Sweep {
    /// Start a sweep at `now_ms`.  Step counts follow the panel height:
    /// open/close/sad/angry cover the half-height, focus stops at 4/6 of it
    /// (the lids stay partly lowered).
    pub fn start<D: DisplayPort>(
        kind: SweepKind,
        scope: SweepScope,
        color: u16,
        step_interval_ms: u64,
        now_ms: u64,
        display: &D,
    ) -> Self {
        let half = display.height() / 2;
        let steps = match kind {
            SweepKind::Focus => half / 6 * 4,
            _ => half,
        };
        Self {
            kind,
            scope,
            color,
            step: 0,
            steps,
            next_step_at: now_ms,
            step_interval_ms,
        }
    }

    pub fn kind(&self) -> SweepKind {
        self.kind
    }

    pub fn scope(&self) -> SweepScope {
        self.scope
    }

    /// Advance to `now_ms`, drawing every step that has come due.
    /// Returns `true` once the sweep has finished and the final face has
    /// been drawn.
    pub fn tick<D: DisplayPort>(&mut self, now_ms: u64, display: &mut D) -> bool {
        while self.step <= self.steps && now_ms >= self.next_step_at {
            self.draw_step(display);
            self.step += 1;
            self.next_step_at += self.step_interval_ms;
        }

        if self.step > self.steps {
            self.draw_final(display);
            return true;
        }
        false
    }

    fn draw_step<D: DisplayPort>(&self, display: &mut D) {
        let w = i32::from(display.width());
        let h = i32::from(display.height());
        let step = i32::from(self.step);

        // Open reveals from the centre outwards; everything else lowers the
        // lids from the edges inwards.
        let (row, color) = match self.kind {
            SweepKind::Open => (i32::from(self.steps) - step, self.color),
            SweepKind::Close => (step, COLOR_BLACK),
            SweepKind::Focus | SweepKind::Sad | SweepKind::Angry => (step, self.color),
        };

        for eye in self.scope.eyes().into_iter().flatten() {
            display.hline(eye, 0, row, w, color);
            display.hline(eye, 0, h - 1 - row, w, color);
        }
    }

    fn draw_final<D: DisplayPort>(&self, display: &mut D) {
        for eye in self.scope.eyes().into_iter().flatten() {
            match self.kind {
                SweepKind::Open => render::draw_open(display, eye, self.color),
                SweepKind::Close => render::draw_closed(display, eye),
                SweepKind::Focus => render::draw_focus(display, eye, self.color),
                SweepKind::Sad => {
                    render::draw_sad(display, eye, render::sad_brow_inner(eye), self.color);
                }
                SweepKind::Angry => {
                    render::draw_angry(display, eye, render::angry_brow_inner(eye), self.color);
                }
            }
        }
    }
}
