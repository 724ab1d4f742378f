pub mod battery;
pub mod position;
pub mod wifi;

pub use battery::{Battery, BatteryReading};
pub use position::{Fix, Position};
pub use wifi::{Network, ScanResult, Wifi, WifiScan};
