//! Calibration persistence flows: trim updates, save, reload on reboot,
//! factory reset, and corrupted-snapshot recovery.

use droidcore::adapters::hardware::SimulatedHardware;
use droidcore::adapters::storage::MemoryStore;
use droidcore::app::commands::{CalTarget, DroidCommand};
use droidcore::app::events::AppEvent;
use droidcore::app::ports::{CalibrationStore, StoreError};
use droidcore::app::service::DroidService;
use droidcore::calibration::{CalibrationData, DroidSettings};
use droidcore::config::DroidConfig;
use droidcore::error::Error;
use droidcore::motion::SubMotionId;

use crate::recording_sink::RecordingSink;

const CH_HEAD_ROTATE: u8 = 8;

fn boot(store: &mut impl CalibrationStore) -> (DroidService, SimulatedHardware, RecordingSink) {
    let mut service = DroidService::new(&DroidConfig::default(), 7);
    let mut hw = SimulatedHardware::new();
    let mut sink = RecordingSink::new();
    service
        .start(store, &mut hw, &mut |_| {}, &mut sink)
        .unwrap();
    (service, hw, sink)
}

#[test]
fn saved_trims_survive_a_reboot() {
    let mut store = MemoryStore::new();
    {
        let (mut service, mut hw, mut sink) = boot(&mut store);
        service.handle_command(
            DroidCommand::SetCalibration {
                target: CalTarget::Neck(SubMotionId::Rotate),
                offset: 12,
            },
            0,
            &mut hw,
            &mut store,
            &mut |_| {},
            &mut sink,
        );
        service.handle_command(
            DroidCommand::SaveCalibration,
            0,
            &mut hw,
            &mut store,
            &mut |_| {},
            &mut sink,
        );
        assert!(sink.contains(|e| *e == AppEvent::CalibrationSaved));
    }

    // Second boot loads the trim and centers with it applied.
    let (service, hw, _) = boot(&mut store);
    assert_eq!(service.calibration().neck.get(SubMotionId::Rotate), 12);
    assert_eq!(hw.servo_position(CH_HEAD_ROTATE), Some(102.0));
}

#[test]
fn factory_reset_clears_trims_and_persists() {
    let mut data = CalibrationData::default();
    data.body.set(SubMotionId::TiltForward, -20);
    let mut settings = DroidSettings::default();
    settings.movement_speed = 60;
    data.settings = settings;
    let mut store = MemoryStore::with_snapshot(data);

    let (mut service, mut hw, mut sink) = boot(&mut store);
    assert_eq!(service.calibration().body.get(SubMotionId::TiltForward), -20);

    service.handle_command(
        DroidCommand::ResetCalibration,
        0,
        &mut hw,
        &mut store,
        &mut |_| {},
        &mut sink,
    );
    assert!(sink.contains(|e| *e == AppEvent::CalibrationReset));
    assert_eq!(service.calibration(), CalibrationData::default());
    // The store now holds the defaults too.
    assert_eq!(store.load().unwrap(), CalibrationData::default());
}

#[test]
fn corrupted_snapshot_boots_with_defaults() {
    struct CorruptStore;
    impl CalibrationStore for CorruptStore {
        fn load(&self) -> Result<CalibrationData, StoreError> {
            Err(StoreError::Corrupted)
        }
        fn save(&self, _data: &CalibrationData) -> Result<(), StoreError> {
            Ok(())
        }
    }

    let (service, _, sink) = boot(&mut CorruptStore);
    assert_eq!(service.calibration(), CalibrationData::default());
    assert!(sink.contains(|e| *e == AppEvent::Started));
}

#[test]
fn io_failure_at_boot_is_an_error() {
    struct BrokenStore;
    impl CalibrationStore for BrokenStore {
        fn load(&self) -> Result<CalibrationData, StoreError> {
            Err(StoreError::IoError)
        }
        fn save(&self, _data: &CalibrationData) -> Result<(), StoreError> {
            Err(StoreError::IoError)
        }
    }

    let mut service = DroidService::new(&DroidConfig::default(), 7);
    let mut hw = SimulatedHardware::new();
    let mut sink = RecordingSink::new();
    let err = service
        .start(&mut BrokenStore, &mut hw, &mut |_| {}, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Store(StoreError::IoError));
}

#[test]
fn settings_update_round_trips_through_save() {
    let mut store = MemoryStore::new();
    let (mut service, mut hw, mut sink) = boot(&mut store);

    let mut settings = DroidSettings::default();
    settings.name.clear();
    settings.name.push_str("D-4X").unwrap();
    settings.movement_speed = 80;

    service.handle_command(
        DroidCommand::UpdateSettings(settings.clone()),
        0,
        &mut hw,
        &mut store,
        &mut |_| {},
        &mut sink,
    );
    service.handle_command(
        DroidCommand::SaveCalibration,
        0,
        &mut hw,
        &mut store,
        &mut |_| {},
        &mut sink,
    );

    assert!(sink.contains(|e| matches!(e, AppEvent::SettingsUpdated(_))));
    let stored = store.load().unwrap();
    assert_eq!(stored.settings.name.as_str(), "D-4X");
    assert_eq!(stored.settings.movement_speed, 80);

    let snap = service.snapshot();
    assert_eq!(snap.calibration.settings, settings);
}
