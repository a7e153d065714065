//! Continuous-motion control: the easing engine, the generic calibrated
//! axis controller, and the shared idle-behaviour scheduler.

pub mod axis;
pub mod idle;
pub mod tween;

pub use axis::{AxisController, SubMotionId};
pub use tween::Tween;
