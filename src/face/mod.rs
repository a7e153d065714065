//! Discrete-state expression control for the eye pair.
//!
//! The controller mirrors the axis-controller pattern over an enumerated
//! state space: each eye tracks `current`, `target`, and `last_manual`; an
//! idle scheduler injects random expressions while automatic mode is
//! enabled; and a per-cycle reconciliation decides between the synchronized
//! dual-eye transition and independent single-eye ones.
//!
//! Exactly one authority renders an eye per cycle:
//!
//! 1. an in-flight [`Sweep`] covering the eye,
//! 2. else the blink cadence, while the eye's target is [`EyeExpression::Blink`],
//! 3. else the per-family reconciler.
//!
//! Blink never uses the easing engine: it toggles the eye between open and
//! closed with immediate draws, alternating a long open interval with a
//! short forced-closed one.

pub mod render;
pub mod sweep;

use log::{debug, info};
use rand::Rng;
use rand::rngs::SmallRng;
use serde::Serialize;

use crate::app::events::AppEvent;
use crate::app::ports::{DisplayPort, EventSink};

use sweep::{Sweep, SweepKind, SweepScope};

// ---------------------------------------------------------------------------
// State enumeration
// ---------------------------------------------------------------------------

/// Expression states for one eye.  Wire codes match the gateway protocol;
/// serializes by name into the state snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u16)]
pub enum EyeExpression {
    None = 0,
    Open = 1,
    Closed = 2,
    Blink = 3,
    Focus = 4,
    Sad = 5,
    Angry = 6,
}

impl EyeExpression {
    /// Total mapping from a gateway integer code.  Unrecognized codes fall
    /// back to the inert [`EyeExpression::None`] rather than failing.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::Open,
            2 => Self::Closed,
            3 => Self::Blink,
            4 => Self::Focus,
            5 => Self::Sad,
            6 => Self::Angry,
            _ => Self::None,
        }
    }

    /// The sweep family for this target, if the generic reconciliation
    /// handles it.  Blink has a dedicated cadence; None renders nothing.
    fn family(self) -> Option<SweepKind> {
        match self {
            Self::Open => Some(SweepKind::Open),
            Self::Closed => Some(SweepKind::Close),
            Self::Focus => Some(SweepKind::Focus),
            Self::Sad => Some(SweepKind::Sad),
            Self::Angry => Some(SweepKind::Angry),
            Self::Blink | Self::None => None,
        }
    }
}

/// Physical eye identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeSide {
    Left,
    Right,
}

/// Addressing for expression commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeScope {
    Both,
    Left,
    Right,
}

impl EyeScope {
    fn covers(self, side: EyeSide) -> bool {
        match self {
            Self::Both => true,
            Self::Left => side == EyeSide::Left,
            Self::Right => side == EyeSide::Right,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct EyeChannel {
    current: EyeExpression,
    target: EyeExpression,
    last_manual: EyeExpression,
}

impl EyeChannel {
    fn new() -> Self {
        Self {
            current: EyeExpression::Open,
            target: EyeExpression::Open,
            last_manual: EyeExpression::Open,
        }
    }
}

/// Timing constants for the blink cadence and the idle scheduler.
const BLINK_CLOSED_MS: u64 = 100;
const BLINK_OPEN_MIN_MS: u64 = 3000;
const BLINK_OPEN_MAX_MS: u64 = 7000;
const IDLE_MIN_SECS: u64 = 5;
const IDLE_MAX_SECS: u64 = 10;

/// The expression controller for the eye pair.
pub struct ExpressionController {
    left: EyeChannel,
    right: EyeChannel,
    automatic: bool,

    /// Idle trigger: duration 0 = needs (re)scheduling.
    idle_armed_at: u64,
    idle_duration_ms: u64,

    /// Shared blink cadence.
    blink_engaged: bool,
    blink_last_toggle: u64,
    blink_interval_ms: u64,
    blink_closed: bool,

    /// At most one sweep per eye; a dual sweep occupies both.
    dual: Option<Sweep>,
    left_sweep: Option<Sweep>,
    right_sweep: Option<Sweep>,

    eye_color: u16,
    sweep_step_ms: u64,
    rng: SmallRng,
}

impl ExpressionController {
    pub fn new(eye_color: u16, sweep_step_ms: u64, rng: SmallRng) -> Self {
        Self {
            left: EyeChannel::new(),
            right: EyeChannel::new(),
            automatic: true,
            idle_armed_at: 0,
            idle_duration_ms: 0,
            blink_engaged: false,
            blink_last_toggle: 0,
            blink_interval_ms: BLINK_OPEN_MAX_MS,
            blink_closed: false,
            dual: None,
            left_sweep: None,
            right_sweep: None,
            eye_color,
            sweep_step_ms,
            rng,
        }
    }

    // ── Commands ──────────────────────────────────────────────

    /// Manual expression command.  Updates `target` *and* `last_manual` for
    /// the addressed eye(s) and postpones the next automatic change.
    pub fn set_eyes(&mut self, scope: EyeScope, state: EyeExpression, now_ms: u64) {
        let mut changed = false;
        for side in [EyeSide::Left, EyeSide::Right] {
            if !scope.covers(side) {
                continue;
            }
            let eye = self.channel_mut(side);
            if eye.target != state {
                eye.target = state;
                changed = true;
            }
            eye.last_manual = state;
        }
        if changed {
            info!("face: manual {scope:?} -> {state:?}");
        }
        // Manual commands always push the idle trigger out, even when the
        // target did not change.
        self.idle_armed_at = now_ms;
        self.idle_duration_ms = 0;
    }

    /// Enable or disable autonomous expression changes.  Disabling restores
    /// each eye's target to the last manually selected state.
    pub fn set_automatic(&mut self, enabled: bool) {
        self.automatic = enabled;
        if !enabled {
            self.left.target = self.left.last_manual;
            self.right.target = self.right.last_manual;
            info!(
                "face: automatic off, restoring {:?}/{:?}",
                self.left.target, self.right.target
            );
        }
    }

    pub fn automatic(&self) -> bool {
        self.automatic
    }

    pub fn current(&self, side: EyeSide) -> EyeExpression {
        self.channel(side).current
    }

    pub fn target(&self, side: EyeSide) -> EyeExpression {
        self.channel(side).target
    }

    // ── Per-cycle advance ─────────────────────────────────────

    pub fn tick<D: DisplayPort, E: EventSink>(
        &mut self,
        now_ms: u64,
        display: &mut D,
        sink: &mut E,
    ) {
        if self.automatic {
            self.run_idle(now_ms, sink);
        }

        self.advance_sweeps(now_ms, display);
        self.run_blink(now_ms, display);
        self.reconcile(now_ms, display, sink);
    }

    /// Idle scheduler: on interval expiry pick a random non-None state and
    /// apply it to both eyes through the target path.  `last_manual` is left
    /// alone so disabling automatic mode restores the operator's choice.
    fn run_idle<E: EventSink>(&mut self, now_ms: u64, sink: &mut E) {
        if self.idle_duration_ms == 0 {
            self.idle_armed_at = now_ms;
            self.idle_duration_ms = self.rng.gen_range(IDLE_MIN_SECS..=IDLE_MAX_SECS) * 1000;
            return;
        }
        if now_ms > self.idle_armed_at + self.idle_duration_ms {
            self.idle_armed_at = now_ms;
            self.idle_duration_ms = self.rng.gen_range(IDLE_MIN_SECS..=IDLE_MAX_SECS) * 1000;

            let state = EyeExpression::from_code(self.rng.gen_range(1..=6));
            debug!("face: idle expression {state:?}");
            self.left.target = state;
            self.right.target = state;
            sink.emit(&AppEvent::IdleExpression(state));
        }
    }

    fn advance_sweeps<D: DisplayPort>(&mut self, now_ms: u64, display: &mut D) {
        if let Some(sweep) = self.dual.as_mut() {
            if sweep.tick(now_ms, display) {
                let state = sweep.kind().finish_state();
                self.left.current = state;
                self.right.current = state;
                self.dual = None;
            }
        }
        if let Some(sweep) = self.left_sweep.as_mut() {
            if sweep.tick(now_ms, display) {
                self.left.current = sweep.kind().finish_state();
                self.left_sweep = None;
            }
        }
        if let Some(sweep) = self.right_sweep.as_mut() {
            if sweep.tick(now_ms, display) {
                self.right.current = sweep.kind().finish_state();
                self.right_sweep = None;
            }
        }
    }

    /// Blink cadence: owns every eye whose target is Blink and which no
    /// sweep covers.  Toggles between a long open phase and a 100ms forced
    /// closed pulse with immediate draws.
    fn run_blink<D: DisplayPort>(&mut self, now_ms: u64, display: &mut D) {
        let owned: Vec<EyeSide> = [EyeSide::Left, EyeSide::Right]
            .into_iter()
            .filter(|&side| {
                self.channel(side).target == EyeExpression::Blink && !self.sweep_covers(side)
            })
            .collect();
        if owned.is_empty() {
            self.blink_engaged = false;
            return;
        }

        // A fresh Blink target reopens the eye right away; the long open
        // phase runs from there instead of inheriting a stale toggle time.
        if !self.blink_engaged {
            self.blink_engaged = true;
            self.blink_closed = false;
            self.blink_last_toggle = now_ms;
            self.blink_interval_ms = self.rng.gen_range(BLINK_OPEN_MIN_MS..=BLINK_OPEN_MAX_MS);
            for side in owned {
                render::draw_open(display, side, self.eye_color);
                self.channel_mut(side).current = EyeExpression::Open;
            }
            return;
        }

        if now_ms.saturating_sub(self.blink_last_toggle) <= self.blink_interval_ms {
            return;
        }
        self.blink_last_toggle = now_ms;
        self.blink_closed = !self.blink_closed;
        self.blink_interval_ms = if self.blink_closed {
            BLINK_CLOSED_MS
        } else {
            self.rng.gen_range(BLINK_OPEN_MIN_MS..=BLINK_OPEN_MAX_MS)
        };

        for side in owned {
            if self.blink_closed {
                render::draw_closed(display, side);
                self.channel_mut(side).current = EyeExpression::Closed;
            } else {
                render::draw_open(display, side, self.eye_color);
                self.channel_mut(side).current = EyeExpression::Open;
            }
        }
    }

    /// Per-family reconciliation: an eye needs a transition when its target
    /// is in the family and its current state is not.  Both eyes needing it
    /// in the same cycle run the synchronized dual animation; otherwise each
    /// runs independently.
    fn reconcile<D: DisplayPort, E: EventSink>(
        &mut self,
        now_ms: u64,
        display: &mut D,
        sink: &mut E,
    ) {
        for kind in [
            SweepKind::Open,
            SweepKind::Close,
            SweepKind::Focus,
            SweepKind::Sad,
            SweepKind::Angry,
        ] {
            let state = kind.finish_state();
            let need_left = self.needs_transition(EyeSide::Left, state);
            let need_right = self.needs_transition(EyeSide::Right, state);

            if need_left && need_right {
                self.dual = Some(Sweep::start(
                    kind,
                    SweepScope::Both,
                    self.eye_color,
                    self.sweep_step_ms,
                    now_ms,
                    display,
                ));
                sink.emit(&AppEvent::EyeTransition {
                    scope: EyeScope::Both,
                    state,
                });
            } else {
                if need_left {
                    self.left_sweep = Some(Sweep::start(
                        kind,
                        SweepScope::Single(EyeSide::Left),
                        self.eye_color,
                        self.sweep_step_ms,
                        now_ms,
                        display,
                    ));
                    sink.emit(&AppEvent::EyeTransition {
                        scope: EyeScope::Left,
                        state,
                    });
                }
                if need_right {
                    self.right_sweep = Some(Sweep::start(
                        kind,
                        SweepScope::Single(EyeSide::Right),
                        self.eye_color,
                        self.sweep_step_ms,
                        now_ms,
                        display,
                    ));
                    sink.emit(&AppEvent::EyeTransition {
                        scope: EyeScope::Right,
                        state,
                    });
                }
            }
        }
    }

    fn needs_transition(&self, side: EyeSide, state: EyeExpression) -> bool {
        let eye = self.channel(side);
        eye.target == state && eye.current != state && !self.sweep_covers(side)
    }

    fn sweep_covers(&self, side: EyeSide) -> bool {
        let single = match side {
            EyeSide::Left => self.left_sweep.is_some(),
            EyeSide::Right => self.right_sweep.is_some(),
        };
        single || self.dual.as_ref().is_some_and(|s| s.scope().covers(side))
    }

    fn channel(&self, side: EyeSide) -> &EyeChannel {
        match side {
            EyeSide::Left => &self.left,
            EyeSide::Right => &self.right,
        }
    }

    fn channel_mut(&mut self, side: EyeSide) -> &mut EyeChannel {
        match side {
            EyeSide::Left => &mut self.left,
            EyeSide::Right => &mut self.right,
        }
    }
}
