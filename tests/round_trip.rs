use pretty_assertions::assert_eq;
use rstest::rstest;
use sensorlines::records::{Battery, Position, Wifi};
use sensorlines::Record;
use temp_dir::TempDir;

use shared::{setup_tracing, small_buffer_store_in, store_in, SampleGen};

#[rstest]
#[case(0)]
#[case(1)]
#[case(42)]
#[case(0xdead_beef)]
fn saved_samples_parse_back(#[case] seed: u64) {
    setup_tracing();
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    let mut gen = SampleGen::from_seed(seed);

    let mut batteries = Vec::new();
    let mut positions = Vec::new();
    let mut wifis = Vec::new();
    for _ in 0..50 {
        batteries.push(store.save::<Battery>(&gen.battery()).unwrap());
        positions.push(store.save::<Position>(&gen.fix()).unwrap());
        wifis.push(store.save::<Wifi>(&gen.scan()).unwrap());
    }

    assert_eq!(store.parse::<Battery>().unwrap(), batteries);
    assert_eq!(store.parse::<Position>().unwrap(), positions);
    assert_eq!(store.parse::<Wifi>().unwrap(), wifis);
}

#[rstest]
#[case(3)]
#[case(7)]
fn read_buffer_size_does_not_matter(#[case] seed: u64) {
    let test_dir = TempDir::new().unwrap();
    let store = small_buffer_store_in(&test_dir);
    let mut gen = SampleGen::from_seed(seed);

    let scans: Vec<Wifi> = (0..20)
        .map(|_| store.save::<Wifi>(&gen.scan()).unwrap())
        .collect();
    assert_eq!(store.parse::<Wifi>().unwrap(), scans);
}

#[test]
fn saved_values_match_source() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    let mut gen = SampleGen::from_seed(9);

    let fix = gen.fix();
    let position = store.save::<Position>(&fix).unwrap();
    assert_eq!(position.time(), fix.time);
    assert_eq!(position.latitude(), fix.latitude);
    assert_eq!(position.longitude(), fix.longitude);
    assert_eq!(position.provider(), fix.provider);

    let scan = gen.scan();
    let wifi = store.save::<Wifi>(&scan).unwrap();
    assert_eq!(wifi.networks().len(), scan.results.len());
    for (network, result) in wifi.networks().iter().zip(&scan.results) {
        assert_eq!(network.ssid(), result.ssid);
        assert_eq!(network.bssid(), result.bssid);
        assert_eq!(network.frequency(), result.frequency);
        assert_eq!(network.level(), result.level);
    }
}

#[test]
fn string_form_survives_parsing() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    let mut gen = SampleGen::from_seed(5);
    let wifi = store.save::<Wifi>(&gen.scan()).unwrap();

    let kept = wifi.string_form();
    let restored = Wifi::from_string_form(&kept).unwrap();
    assert!(restored.fairly_eq(&wifi));
    assert_eq!(restored.time(), wifi.time());
}
