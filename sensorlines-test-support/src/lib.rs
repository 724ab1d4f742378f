use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro128StarStar;
use sensorlines::records::{BatteryReading, Fix, ScanResult, WifiScan};
use sensorlines::{DeviceIdError, DeviceIdentifier};

pub fn setup_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("sensorlines=debug,warn"));
        let fmt = fmt::layer()
            .pretty()
            .with_line_number(true)
            .with_test_writer();

        let _ignore_err = tracing_subscriber::registry()
            .with(filter)
            .with(fmt)
            .with(tracing_error::ErrorLayer::default())
            .try_init();
        let _ignore_err = color_eyre::install();
    });
}

/// Always reports the same identifier.
#[derive(Debug, Clone)]
pub struct FixedDevice(pub &'static str);

impl DeviceIdentifier for FixedDevice {
    fn device_id(&self) -> Result<String, DeviceIdError> {
        Ok(self.0.to_owned())
    }
}

/// Like a phone without telephony permission.
#[derive(Debug, Clone)]
pub struct UnavailableDevice;

impl DeviceIdentifier for UnavailableDevice {
    fn device_id(&self) -> Result<String, DeviceIdError> {
        Err(DeviceIdError("permission denied".to_owned()))
    }
}

/// Copies the folder instead of packing it and records every call.
#[derive(Debug, Default)]
pub struct CopyArchiver {
    pub calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl sensorlines::archive::Archiver for CopyArchiver {
    fn archive(&self, folder: &Path, destination: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(destination)?;
        for entry in fs::read_dir(folder)? {
            let entry = entry?;
            fs::copy(entry.path(), destination.join(entry.file_name()))?;
        }
        self.calls
            .lock()
            .expect("no test panics while holding this")
            .push((folder.to_owned(), destination.to_owned()));
        Ok(destination.to_owned())
    }
}

#[derive(Debug)]
pub struct FailingArchiver;

impl sensorlines::archive::Archiver for FailingArchiver {
    fn archive(&self, _: &Path, _: &Path) -> io::Result<PathBuf> {
        Err(io::Error::other("disk full"))
    }
}

/// Seeded generator of realistic samples with increasing timestamps.
#[derive(Debug, Clone)]
pub struct SampleGen {
    rng: Xoshiro128StarStar,
    time: i64,
}

const PROVIDERS: [&str; 3] = ["gps", "network", "fused"];

impl SampleGen {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro128StarStar::seed_from_u64(seed),
            time: 1_385_000_000_000,
        }
    }

    fn next_time(&mut self) -> i64 {
        self.time += self.rng.random_range(1_000..600_000);
        self.time
    }

    pub fn battery(&mut self) -> BatteryReading {
        BatteryReading {
            time: self.next_time(),
            level: self.rng.random_range(-1..=100),
        }
    }

    pub fn fix(&mut self) -> Fix {
        Fix {
            time: self.next_time(),
            latitude: self.rng.random_range(-90.0..=90.0),
            longitude: self.rng.random_range(-180.0..=180.0),
            provider: PROVIDERS[self.rng.random_range(0..PROVIDERS.len())].to_owned(),
        }
    }

    /// Every result has a non empty ssid free of separator bytes.
    pub fn scan(&mut self) -> WifiScan {
        let n = self.rng.random_range(0..8);
        let results = (0..n).map(|_| self.scan_result()).collect();
        WifiScan {
            time: self.next_time(),
            results,
        }
    }

    fn scan_result(&mut self) -> ScanResult {
        let len = self.rng.random_range(1..16);
        let ssid = (0..len)
            .map(|_| {
                let c = self.rng.random_range(0..62u8);
                match c {
                    0..26 => (b'a' + c) as char,
                    26..52 => (b'A' + c - 26) as char,
                    52..62 => (b'0' + c - 52) as char,
                    62u8.. => unreachable!(),
                }
            })
            .collect();
        let octets: Vec<String> = (0..6)
            .map(|_| format!("{:02x}", self.rng.random::<u8>()))
            .collect();
        ScanResult {
            ssid,
            bssid: octets.join(":"),
            frequency: if self.rng.random_bool(0.5) {
                self.rng.random_range(2412..=2484)
            } else {
                self.rng.random_range(5180..=5825)
            },
            level: self.rng.random_range(-95..=-30),
        }
    }
}
