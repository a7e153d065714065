//! Inbound commands to the droid service.
//!
//! These represent actions requested by the outside world (remote gateway,
//! serial console, test harness) that the
//! [`DroidService`](super::service::DroidService) interprets and acts upon.
//! Producers push commands into a lock-free SPSC queue; the control loop is
//! the single consumer and drains it once per cycle, so motion state is
//! never touched from two contexts at once.

use crate::calibration::DroidSettings;
use crate::error::CommandError;
use crate::face::EyeScope;
use crate::motion::SubMotionId;

/// Maximum number of pending commands.  A gateway burst beyond this is
/// dropped with a warning; the queue is drained every control cycle so the
/// depth only needs to absorb one network round-trip's worth.
pub const COMMAND_QUEUE_DEPTH: usize = 16;

pub type CommandQueue = heapless::spsc::Queue<DroidCommand, COMMAND_QUEUE_DEPTH>;
pub type CommandProducer<'a> = heapless::spsc::Producer<'a, DroidCommand, COMMAND_QUEUE_DEPTH>;
pub type CommandConsumer<'a> = heapless::spsc::Consumer<'a, DroidCommand, COMMAND_QUEUE_DEPTH>;

/// Producer-side handle that turns a rejected enqueue into a typed error
/// instead of handing the command back.
pub struct CommandSender<'a> {
    producer: CommandProducer<'a>,
}

impl<'a> CommandSender<'a> {
    pub fn new(producer: CommandProducer<'a>) -> Self {
        Self { producer }
    }

    /// Enqueue a command, or report [`CommandError::QueueFull`] when the
    /// consumer has fallen a full queue depth behind.
    pub fn send(&mut self, command: DroidCommand) -> crate::error::Result<()> {
        self.producer
            .enqueue(command)
            .map_err(|_| CommandError::QueueFull.into())
    }
}

/// Which calibration offset a [`DroidCommand::SetCalibration`] addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalTarget {
    Neck(SubMotionId),
    Body(SubMotionId),
    Accessory,
}

/// Commands that external adapters can send into the control core.
///
/// Axis targets travel as one command per axis: all three sub-motion
/// degrees ride in a single queue item, so a composite pose can never be
/// torn across control cycles by a drain landing between enqueues.
#[derive(Debug, Clone)]
pub enum DroidCommand {
    /// Pose the whole neck with signed user degrees (−90..+90).
    /// `duration_ms = None` uses the neck's default easing duration.
    Neck {
        rotate: f64,
        tilt_forward: f64,
        tilt_sideways: f64,
        duration_ms: Option<u64>,
    },

    /// Pose the whole body.  Applies immediately unless a duration is
    /// given.
    Body {
        rotate: f64,
        tilt_forward: f64,
        tilt_sideways: f64,
        duration_ms: Option<u64>,
    },

    /// Drive the head accessory retractor in its raw 0–180 range.
    Accessory { degree: f64, duration_ms: Option<u64> },

    /// Select an eye expression by gateway code (unknown codes map to None).
    Eyes { scope: EyeScope, code: u16 },

    /// Select a chest light pattern by gateway code.
    Lights { code: u16 },

    /// Enable or disable all autonomous behaviour (idle gestures and
    /// expression changes).
    SetAutomatic(bool),

    /// Re-run the staged centering sequence on neck and body.
    CenterAll,

    /// Update one calibration offset (live; persisted on SaveCalibration).
    SetCalibration { target: CalTarget, offset: i16 },

    /// Persist the current calibration snapshot.
    SaveCalibration,

    /// Restore factory calibration and settings, and persist them.
    ResetCalibration,

    /// Replace the operator settings (name, movement speed).
    UpdateSettings(DroidSettings),
}
