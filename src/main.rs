//! Droid control core — host simulation entry point.
//!
//! Hexagonal architecture with a fixed-rate control loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  SimulatedHardware      LogEventSink     JsonFileStore   │
//! │  (Servo+Display+Light)  (EventSink)      (Calibration)   │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ───────────────     │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │           DroidService (pure logic)            │      │
//! │  │  Neck · Body · Accessory · Face · Lights       │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The simulation drives the service through the same SPSC command queue
//! a gateway adapter would use, replaying a short scripted session so the
//! log shows every subsystem working.

#![deny(unused_must_use)]

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use log::{info, warn};

use droidcore::adapters::hardware::SimulatedHardware;
use droidcore::adapters::log_sink::LogEventSink;
use droidcore::adapters::storage::JsonFileStore;
use droidcore::adapters::time::MonotonicClock;
use droidcore::app::commands::{CommandQueue, CommandSender, DroidCommand};
use droidcore::app::service::DroidService;
use droidcore::config::DroidConfig;
use droidcore::face::EyeScope;

/// Scripted gateway session: (time since boot, command).
fn demo_script() -> Vec<(u64, DroidCommand)> {
    vec![
        (
            2_000,
            DroidCommand::Eyes {
                scope: EyeScope::Both,
                code: 6, // angry
            },
        ),
        (3_000, DroidCommand::Lights { code: 2 }), // warning blink
        (
            5_000,
            DroidCommand::Neck {
                rotate: 45.0,
                tilt_forward: -15.0,
                tilt_sideways: 0.0,
                duration_ms: Some(1500),
            },
        ),
        (
            7_000,
            DroidCommand::Body {
                rotate: 0.0,
                tilt_forward: 0.0,
                tilt_sideways: -30.0,
                duration_ms: None,
            },
        ),
        (
            9_000,
            DroidCommand::Accessory {
                degree: 120.0,
                duration_ms: None,
            },
        ),
        (
            11_000,
            DroidCommand::Eyes {
                scope: EyeScope::Both,
                code: 3, // blink
            },
        ),
        (13_000, DroidCommand::Lights { code: 3 }), // processing fade
        (15_000, DroidCommand::SetAutomatic(true)),
        (40_000, DroidCommand::CenterAll),
        (41_000, DroidCommand::SaveCalibration),
    ]
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    info!("droidcore v{} (host simulation)", env!("CARGO_PKG_VERSION"));

    let config = DroidConfig::load_or_default("droidconfig.json");
    let clock = MonotonicClock::new();
    let mut hw = SimulatedHardware::new();
    let mut store = JsonFileStore::new("calibrations.json");
    let mut sink = LogEventSink::new();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64);
    let mut service = DroidService::new(&config, seed);

    // One producer (the scripted "gateway"), one consumer (the loop).
    let mut queue = CommandQueue::new();
    let (producer, mut consumer) = queue.split();
    let mut gateway = CommandSender::new(producer);

    let mut settle = |ms: u32| std::thread::sleep(Duration::from_millis(u64::from(ms)));
    service.start(&mut store, &mut hw, &mut settle, &mut sink)?;

    let mut script = demo_script().into_iter().peekable();
    let run_for_ms: u64 = 45_000;

    loop {
        let now_ms = clock.now_ms();
        if now_ms >= run_for_ms {
            break;
        }

        while let Some((_, cmd)) = script.next_if(|(at, _)| *at <= now_ms) {
            if let Err(e) = gateway.send(cmd) {
                warn!("dropping command: {e}");
            }
        }

        service.drain_commands(&mut consumer, now_ms, &mut hw, &mut store, &mut settle, &mut sink);
        service.tick(now_ms, &mut hw, &mut sink);

        std::thread::sleep(Duration::from_millis(u64::from(
            config.control_loop_interval_ms,
        )));
    }

    let snap = service.snapshot();
    info!(
        "simulation done after {} ticks: eyes {:?}/{:?}, lights {:?}, neck rotate {:.0}°",
        service.tick_count(),
        snap.eye_left,
        snap.eye_right,
        snap.light_mode,
        snap.neck_rotate
    );
    Ok(())
}
