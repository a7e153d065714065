//! Droid motion and expression control core.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection.  All hardware access flows through the port traits in
//! [`app::ports`]; the binary wires adapters to them.

#![deny(unused_must_use)]

pub mod app;
pub mod calibration;
pub mod config;
pub mod error;
pub mod face;
pub mod lights;
pub mod motion;

pub mod adapters;
pub mod drivers;
