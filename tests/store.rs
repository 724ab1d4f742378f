use std::fs;

use pretty_assertions::assert_eq;
use sensorlines::archive;
use sensorlines::records::{Battery, BatteryReading, Position, ScanResult, Wifi, WifiScan};
use sensorlines::encode::EncodeError;
use sensorlines::{AppendError, Arity, ExportError, FieldValue, SaveError, Store};
use temp_dir::TempDir;

use shared::{
    config_in, setup_tracing, store_in, CopyArchiver, FailingArchiver, UnavailableDevice, DEVICE,
};

#[test]
fn entries_come_back_in_append_order() {
    setup_tracing();
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);

    store
        .append_scalars("batt", &[b"2000".to_vec(), b"10".to_vec()])
        .unwrap();
    store
        .append_scalars("batt", &[b"1000".to_vec(), b"90".to_vec()])
        .unwrap();

    let times: Vec<_> = store
        .parse::<Battery>()
        .unwrap()
        .iter()
        .map(Battery::time)
        .collect();
    assert_eq!(times, vec![2000, 1000]);
}

#[test]
fn battery_entry_bytes() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    store
        .save::<Battery>(&BatteryReading {
            time: 1000,
            level: 87,
        })
        .unwrap();

    let bytes = fs::read(store.root().path().join("batt")).unwrap();
    assert_eq!(bytes, [0x31u8, 0x30, 0x30, 0x30, 0x00, 0x38, 0x37, 0x0A]);
}

#[test]
fn wifi_entry_through_generic_append() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    let layout = [
        Arity::Scalar,
        Arity::List,
        Arity::List,
        Arity::List,
        Arity::List,
    ];
    let list = |items: &[&str]| {
        FieldValue::List(items.iter().map(|i| i.as_bytes().to_vec()).collect())
    };
    store
        .append(
            "wifi",
            &layout,
            &[
                FieldValue::Scalar(b"77".to_vec()),
                list(&["home", "work"]),
                list(&["aa:aa", "bb:bb"]),
                list(&["2412", "5180"]),
                list(&["-40", "-71"]),
            ],
        )
        .unwrap();

    let wifis = store.parse::<Wifi>().unwrap();
    assert_eq!(wifis.len(), 1);
    let networks = wifis[0].networks();
    assert_eq!(networks[0].ssid(), "home");
    assert_eq!(networks[0].bssid(), "aa:aa");
    assert_eq!(networks[1].ssid(), "work");
    assert_eq!(networks[1].level(), -71);
}

#[test]
fn empty_scan_is_stored() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    let empty = WifiScan {
        time: 5,
        results: Vec::new(),
    };
    store.save::<Wifi>(&empty).unwrap();

    assert_eq!(
        fs::read(store.root().path().join("wifi")).unwrap(),
        b"5\0\0\0\0\n"
    );
    let wifis = store.parse::<Wifi>().unwrap();
    assert_eq!(wifis.len(), 1);
    assert!(wifis[0].networks().is_empty());
}

#[test]
fn nothing_collected_yet() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);

    assert!(store.parse::<Battery>().unwrap().is_empty());
    assert!(store.parse::<Position>().unwrap().is_empty());
    assert!(store.parse::<Wifi>().unwrap().is_empty());
    assert!(!store.has_data().unwrap());
}

#[test]
fn newline_in_payload_is_rejected() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    let scan = WifiScan {
        time: 1,
        results: vec![ScanResult {
            ssid: "two\nlines".to_owned(),
            bssid: "aa:aa".to_owned(),
            frequency: 2412,
            level: -50,
        }],
    };

    let err = store.save::<Wifi>(&scan).unwrap_err();
    assert!(matches!(
        err,
        SaveError::Append(AppendError::Encode(_))
    ));
    assert!(!store.root().path().join("wifi").exists());
}

fn one_network(ssid: &str) -> WifiScan {
    WifiScan {
        time: 8,
        results: vec![ScanResult {
            ssid: ssid.to_owned(),
            bssid: "aa:aa".to_owned(),
            frequency: 2412,
            level: -60,
        }],
    }
}

#[test]
fn lone_hidden_network_is_rejected() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    let home = store.save::<Wifi>(&one_network("home")).unwrap();
    let before = fs::read(store.root().path().join("wifi")).unwrap();

    let err = store.save::<Wifi>(&one_network("")).unwrap_err();
    assert!(matches!(
        err,
        SaveError::Append(AppendError::Encode(EncodeError::LoneEmptyItem { field: 1 }))
    ));
    assert_eq!(fs::read(store.root().path().join("wifi")).unwrap(), before);
    assert_eq!(store.parse::<Wifi>().unwrap(), vec![home]);
}

#[test]
fn hidden_network_among_others_round_trips() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    let mut scan = one_network("");
    scan.results.push(ScanResult {
        ssid: "home".to_owned(),
        bssid: "bb:bb".to_owned(),
        frequency: 5180,
        level: -70,
    });

    let saved = store.save::<Wifi>(&scan).unwrap();
    assert_eq!(saved.networks()[0].ssid(), "");
    assert_eq!(store.parse::<Wifi>().unwrap(), vec![saved]);
}

#[test]
fn unknown_device_uses_fallback_folder() {
    let test_dir = TempDir::new().unwrap();
    let store = Store::open(&config_in(&test_dir), &UnavailableDevice).unwrap();
    assert_eq!(store.root().name(), "NO_IMEI");

    store
        .save::<Battery>(&BatteryReading { time: 1, level: 3 })
        .unwrap();
    assert_eq!(
        store.files().unwrap(),
        vec![test_dir.child("NO_IMEI").join("batt")]
    );
}

#[test]
fn export_names_archive_after_device() {
    setup_tracing();
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    store
        .save::<Battery>(&BatteryReading::now(50))
        .unwrap();

    let archiver = CopyArchiver::default();
    let before = jiff::Timestamp::now().as_millisecond();
    let exported = store.export(&archiver).unwrap();
    let after = jiff::Timestamp::now().as_millisecond();

    assert_eq!(exported.parent(), Some(test_dir.path()));
    let name = exported.file_name().unwrap().to_str().unwrap();
    assert_eq!(archive::device_id(name), DEVICE);
    let (_, millis) = name.rsplit_once('_').unwrap();
    let millis: i64 = millis.parse().unwrap();
    assert!((before..=after).contains(&millis));

    assert!(exported.join("batt").is_file());
    assert_eq!(archiver.calls.lock().unwrap().len(), 1);
}

#[test]
fn export_without_data() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    let err = store.export(&CopyArchiver::default()).unwrap_err();
    assert!(matches!(err, ExportError::NoData));
}

#[test]
fn failing_archiver_is_reported() {
    let test_dir = TempDir::new().unwrap();
    let store = store_in(&test_dir);
    store
        .save::<Battery>(&BatteryReading { time: 1, level: 3 })
        .unwrap();
    let err = store.export(&FailingArchiver).unwrap_err();
    assert!(matches!(err, ExportError::Archive(_)));
}
