//! PCA9685 16-channel PWM expander driver.
//!
//! Drives the servo bus over I2C through the `embedded-hal` 1.0 [`I2c`]
//! trait, so the same driver works against any bus implementation.  The
//! droid runs the expander at 50 Hz; servo positions map linearly from
//! degrees onto the 12-bit counter window below.

use embedded_hal::i2c::I2c;
use log::info;

use crate::error::{ActuatorError, Error, Result};

/// Default 7-bit bus address (all address pins low).
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Servo refresh rate in Hz.
pub const SERVO_FREQ_HZ: u32 = 50;

/// Counter value for a 0° pulse at 50 Hz (~0.59 ms).
const PULSE_MIN_COUNTS: f64 = 150.0;
/// Counter value for a 180° pulse at 50 Hz (~2.4 ms).
const PULSE_MAX_COUNTS: f64 = 595.0;

/// Internal oscillator frequency per the datasheet.
const OSC_CLOCK_HZ: u32 = 25_000_000;

// Register map.
const REG_MODE1: u8 = 0x00;
const REG_PRESCALE: u8 = 0xFE;
const REG_LED0_ON_L: u8 = 0x06;

// MODE1 bits.
const MODE1_RESTART: u8 = 0x80;
const MODE1_AUTO_INC: u8 = 0x20;
const MODE1_SLEEP: u8 = 0x10;

pub struct Pca9685<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Pca9685<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Configure the expander for servo output: program the prescaler for
    /// [`SERVO_FREQ_HZ`] (which requires sleep mode), then wake with
    /// auto-increment enabled so each channel update is one 5-byte write.
    pub fn init(&mut self) -> Result<()> {
        let prescale = Self::prescale_for(SERVO_FREQ_HZ);
        self.write_reg(REG_MODE1, MODE1_SLEEP)?;
        self.write_reg(REG_PRESCALE, prescale)?;
        self.write_reg(REG_MODE1, MODE1_RESTART | MODE1_AUTO_INC)?;
        info!("pca9685@0x{:02x}: {SERVO_FREQ_HZ} Hz, prescale {prescale}", self.address);
        Ok(())
    }

    /// Set the raw on/off counts for one channel (0–15).
    pub fn set_pwm(&mut self, channel: u8, on: u16, off: u16) -> Result<()> {
        if channel > 15 {
            return Err(ActuatorError::InvalidChannel(channel).into());
        }
        let base = REG_LED0_ON_L + 4 * channel;
        let buf = [
            base,
            (on & 0xFF) as u8,
            (on >> 8) as u8,
            (off & 0xFF) as u8,
            (off >> 8) as u8,
        ];
        self.i2c
            .write(self.address, &buf)
            .map_err(|_| Error::from(ActuatorError::I2cWriteFailed))
    }

    /// Position a servo channel in degrees (0–180, clamped).
    pub fn set_degrees(&mut self, channel: u8, degrees: f64) -> Result<()> {
        self.set_pwm(channel, 0, Self::degrees_to_counts(degrees))
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| Error::from(ActuatorError::I2cWriteFailed))
    }

    fn prescale_for(freq_hz: u32) -> u8 {
        // round(osc / (4096 * freq)) - 1, per the datasheet.
        let counts = (f64::from(OSC_CLOCK_HZ) / (4096.0 * f64::from(freq_hz))).round();
        (counts - 1.0) as u8
    }

    fn degrees_to_counts(degrees: f64) -> u16 {
        let d = degrees.clamp(0.0, 180.0);
        (PULSE_MIN_COUNTS + d / 180.0 * (PULSE_MAX_COUNTS - PULSE_MIN_COUNTS)).round() as u16
    }
}
