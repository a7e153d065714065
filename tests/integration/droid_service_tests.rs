//! End-to-end service tests: commands flow through the SPSC queue into the
//! control loop, and effects come back out through the mock ports.

use droidcore::adapters::hardware::SimulatedHardware;
use droidcore::adapters::storage::MemoryStore;
use droidcore::app::commands::{CommandQueue, DroidCommand};
use droidcore::app::events::AppEvent;
use droidcore::app::service::DroidService;
use droidcore::config::DroidConfig;
use droidcore::face::{EyeExpression, EyeScope};
use droidcore::lights::LightMode;

use crate::recording_sink::RecordingSink;

const CH_HEAD_TILT_SIDEWAYS: u8 = 5;
const CH_HEAD_ROTATE: u8 = 8;
const CH_HEAD_TILT_FORWARD: u8 = 9;
const CH_BODY_SIDEWAY_LEFT: u8 = 14;
const CH_BODY_SIDEWAY_RIGHT: u8 = 15;

struct Rig {
    service: DroidService,
    hw: SimulatedHardware,
    store: MemoryStore,
    sink: RecordingSink,
}

impl Rig {
    fn boot() -> Self {
        let mut rig = Self {
            service: DroidService::new(&DroidConfig::default(), 42),
            hw: SimulatedHardware::new(),
            store: MemoryStore::new(),
            sink: RecordingSink::new(),
        };
        rig.service
            .start(&mut rig.store, &mut rig.hw, &mut |_| {}, &mut rig.sink)
            .unwrap();
        rig
    }

    fn handle(&mut self, cmd: DroidCommand, now_ms: u64) {
        self.service.handle_command(
            cmd,
            now_ms,
            &mut self.hw,
            &mut self.store,
            &mut |_| {},
            &mut self.sink,
        );
    }

    fn run(&mut self, from_ms: u64, to_ms: u64) {
        for now in (from_ms..to_ms).step_by(20) {
            self.service.tick(now, &mut self.hw, &mut self.sink);
        }
    }
}

#[test]
fn boot_emits_started_and_centers_every_axis() {
    let rig = Rig::boot();
    assert!(rig.sink.contains(|e| *e == AppEvent::Started));
    assert_eq!(rig.hw.servo_position(CH_HEAD_ROTATE), Some(90.0));
    assert_eq!(rig.hw.servo_position(CH_BODY_SIDEWAY_LEFT), Some(90.0));
    assert_eq!(rig.hw.servo_position(CH_BODY_SIDEWAY_RIGHT), Some(90.0));
}

#[test]
fn queued_commands_drain_in_fifo_order() {
    let mut rig = Rig::boot();
    rig.handle(DroidCommand::SetAutomatic(false), 0);

    let mut queue = CommandQueue::new();
    let (mut producer, mut consumer) = queue.split();
    producer
        .enqueue(DroidCommand::Lights { code: 1 })
        .unwrap();
    producer
        .enqueue(DroidCommand::Lights { code: 4 })
        .unwrap();
    producer
        .enqueue(DroidCommand::Neck {
            rotate: 30.0,
            tilt_forward: 0.0,
            tilt_sideways: 0.0,
            duration_ms: Some(0),
        })
        .unwrap();

    rig.service.drain_commands(
        &mut consumer,
        0,
        &mut rig.hw,
        &mut rig.store,
        &mut |_| {},
        &mut rig.sink,
    );

    // The later light command wins; the neck command landed too.
    assert_eq!(rig.service.snapshot().light_mode, LightMode::Mode1);
    assert_eq!(rig.hw.servo_position(CH_HEAD_ROTATE), Some(120.0));
    assert!(consumer.dequeue().is_none());
}

#[test]
fn one_queued_neck_command_poses_all_three_sub_motions_in_one_drain() {
    let mut rig = Rig::boot();
    rig.handle(DroidCommand::SetAutomatic(false), 0);

    let mut queue = CommandQueue::new();
    let (mut producer, mut consumer) = queue.split();
    producer
        .enqueue(DroidCommand::Neck {
            rotate: 45.0,
            tilt_forward: -30.0,
            tilt_sideways: 10.0,
            duration_ms: Some(0),
        })
        .unwrap();

    rig.service.drain_commands(
        &mut consumer,
        0,
        &mut rig.hw,
        &mut rig.store,
        &mut |_| {},
        &mut rig.sink,
    );

    // The whole pose lands in the same control cycle; no sub-motion is
    // left behind to catch up on a later drain.
    assert_eq!(rig.hw.servo_position(CH_HEAD_ROTATE), Some(135.0));
    assert_eq!(rig.hw.servo_position(CH_HEAD_TILT_FORWARD), Some(60.0));
    assert_eq!(rig.hw.servo_position(CH_HEAD_TILT_SIDEWAYS), Some(100.0));
}

#[test]
fn eased_neck_move_reaches_target_through_ticks() {
    let mut rig = Rig::boot();
    rig.handle(DroidCommand::SetAutomatic(false), 0);
    rig.handle(
        DroidCommand::Neck {
            rotate: 45.0,
            tilt_forward: 0.0,
            tilt_sideways: 0.0,
            duration_ms: Some(1000),
        },
        0,
    );

    rig.run(0, 500);
    let mid = rig.hw.servo_position(CH_HEAD_ROTATE).unwrap();
    assert!(mid > 90.0 && mid < 135.0, "mid-move position {mid}");
    // Read-back reports the commanded target even while the servo travels.
    assert_eq!(rig.service.snapshot().neck_rotate, 45.0);

    rig.run(500, 1200);
    assert_eq!(rig.hw.servo_position(CH_HEAD_ROTATE), Some(135.0));
}

#[test]
fn both_eyes_changing_fires_one_synchronized_transition() {
    let mut rig = Rig::boot();
    rig.handle(DroidCommand::SetAutomatic(false), 0);
    rig.handle(
        DroidCommand::Eyes {
            scope: EyeScope::Both,
            code: 6,
        },
        0,
    );
    rig.run(0, 5000);

    let transitions = rig
        .sink
        .count(|e| matches!(e, AppEvent::EyeTransition { .. }));
    assert_eq!(transitions, 1);
    assert!(rig.sink.contains(|e| {
        matches!(
            e,
            AppEvent::EyeTransition {
                scope: EyeScope::Both,
                state: EyeExpression::Angry,
            }
        )
    }));
    let snap = rig.service.snapshot();
    assert_eq!(snap.eye_left, EyeExpression::Angry);
    assert_eq!(snap.eye_right, EyeExpression::Angry);
}

#[test]
fn unknown_gateway_codes_degrade_to_safe_defaults() {
    let mut rig = Rig::boot();
    rig.handle(DroidCommand::SetAutomatic(false), 0);
    rig.handle(DroidCommand::Lights { code: 99 }, 0);
    rig.handle(
        DroidCommand::Eyes {
            scope: EyeScope::Both,
            code: 250,
        },
        0,
    );
    rig.run(0, 2000);

    let snap = rig.service.snapshot();
    assert_eq!(snap.light_mode, LightMode::Off);
    // None is inert: the eyes keep their last rendered state.
    assert_eq!(snap.eye_left, EyeExpression::Open);
}

#[test]
fn disabling_automatic_freezes_motion_and_restores_manual_eyes() {
    let mut rig = Rig::boot();
    rig.handle(DroidCommand::SetAutomatic(false), 0);
    rig.handle(
        DroidCommand::Eyes {
            scope: EyeScope::Both,
            code: 5, // sad
        },
        0,
    );
    rig.run(0, 5000);
    assert_eq!(rig.service.snapshot().eye_left, EyeExpression::Sad);

    rig.handle(DroidCommand::SetAutomatic(true), 5000);
    rig.run(5000, 180_000);
    assert!(
        rig.sink.contains(|e| matches!(e, AppEvent::IdleExpression(_))),
        "three minutes of automatic mode must produce idle activity"
    );

    // Freeze again: servo writes stop and the manual expression returns.
    rig.handle(DroidCommand::SetAutomatic(false), 180_000);
    rig.run(180_000, 200_000);
    let writes_frozen = rig.hw.servo_writes().len();
    rig.run(200_000, 230_000);
    assert_eq!(rig.hw.servo_writes().len(), writes_frozen);
    let snap = rig.service.snapshot();
    assert_eq!(snap.eye_left, EyeExpression::Sad);
    assert_eq!(snap.eye_right, EyeExpression::Sad);
}

#[test]
fn idle_wander_never_leaves_actuator_range() {
    let mut rig = Rig::boot();
    rig.run(0, 300_000);
    assert!(
        rig.hw
            .servo_writes()
            .iter()
            .all(|(_, d)| (0.0..=180.0).contains(d)),
        "every servo write must stay in 0..=180"
    );
}

#[test]
fn center_all_command_repeats_the_staged_sequence() {
    let mut rig = Rig::boot();
    rig.handle(DroidCommand::SetAutomatic(false), 0);
    rig.handle(
        DroidCommand::Neck {
            rotate: 60.0,
            tilt_forward: 0.0,
            tilt_sideways: 0.0,
            duration_ms: Some(0),
        },
        0,
    );
    assert_eq!(rig.hw.servo_position(CH_HEAD_ROTATE), Some(150.0));

    let mut settles = Vec::new();
    rig.service.handle_command(
        DroidCommand::CenterAll,
        0,
        &mut rig.hw,
        &mut rig.store,
        &mut |ms| settles.push(ms),
        &mut rig.sink,
    );
    assert_eq!(settles, vec![500, 500, 500, 500]);
    assert_eq!(rig.hw.servo_position(CH_HEAD_ROTATE), Some(90.0));
}
