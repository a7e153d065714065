//! Peripheral drivers for the droid's actuator hardware.

pub mod pca9685;
