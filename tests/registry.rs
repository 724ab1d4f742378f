use pretty_assertions::assert_eq;
use sensorlines::records::{Battery, Position, Wifi};
use sensorlines::registry::{self, FolderError};
use sensorlines::{ParseError, Record, RecordKind, Sample};
use temp_dir::TempDir;

use shared::{setup_tracing, store_in, write_raw, SampleGen};

#[test]
fn whole_folder_is_collected() {
    setup_tracing();
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    let mut gen = SampleGen::from_seed(11);

    let battery = store.save::<Battery>(&gen.battery()).unwrap();
    let position = store.save::<Position>(&gen.fix()).unwrap();
    let wifi = store.save::<Wifi>(&gen.scan()).unwrap();
    let later = store.save::<Battery>(&gen.battery()).unwrap();

    let collected = registry::parse_folder(store.root().path()).unwrap();
    assert_eq!(collected, store.parse_all().unwrap());
    assert_eq!(collected.len(), 4);
    assert_eq!(collected.batteries, vec![battery.clone(), later.clone()]);

    let kinds: Vec<_> = collected.samples().iter().map(Sample::kind).collect();
    assert_eq!(
        kinds,
        vec![
            RecordKind::Battery,
            RecordKind::Position,
            RecordKind::Wifi,
            RecordKind::Battery
        ]
    );
    assert_eq!(
        collected.samples(),
        vec![
            Sample::from(battery),
            Sample::from(position),
            Sample::from(wifi),
            Sample::from(later)
        ]
    );
}

#[test]
fn files_match_registry() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    let mut gen = SampleGen::from_seed(12);
    store.save::<Wifi>(&gen.scan()).unwrap();
    store.save::<Battery>(&gen.battery()).unwrap();

    let kinds: Vec<_> = store
        .files()
        .unwrap()
        .iter()
        .map(|path| {
            let name = path.file_name().unwrap().to_str().unwrap();
            RecordKind::from_file_name(name).unwrap()
        })
        .collect();
    assert_eq!(kinds, vec![RecordKind::Battery, RecordKind::Wifi]);
    assert_eq!(RecordKind::Battery.file_name(), Battery::FILE_NAME);
}

#[test]
fn malformed_kind_is_named() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    write_raw(&store, "batt", b"1\x0050\n");
    write_raw(&store, "loc", b"1\0north\x002.0\0gps\n");

    let err = store.parse_all().unwrap_err();
    let FolderError { kind, error } = err;
    assert_eq!(kind, RecordKind::Position);
    assert!(matches!(error, ParseError::Malformed { entry: 0, .. }));
}

#[test]
fn kinds_never_fairly_equal_each_other() {
    let mut gen = SampleGen::from_seed(13);
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    let battery = Sample::from(store.save::<Battery>(&gen.battery()).unwrap());
    let position = Sample::from(store.save::<Position>(&gen.fix()).unwrap());

    assert!(battery.fairly_eq(&battery));
    assert!(!battery.fairly_eq(&position));
}
