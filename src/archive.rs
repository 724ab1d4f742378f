//! Packaging a root folder for upload, and recovering the device from the
//! name of an uploaded archive.

use std::io;
use std::path::{Path, PathBuf};

const NAME_SEP: char = '_';

/// Packs a folder into a single file, e.g. a zip.
pub trait Archiver {
    /// Pack `folder` into a file at (or derived from) `destination` and
    /// return the path of the file created.
    fn archive(&self, folder: &Path, destination: &Path) -> io::Result<PathBuf>;
}

/// `<device id>_<unix millis>`
pub fn archive_name(device_id: &str, unix_millis: i64) -> String {
    format!("{device_id}{NAME_SEP}{unix_millis}")
}

/// The device id an archive was made on, given just its file name. Splits
/// at the last separator so ids holding one (like `NO_IMEI`) survive.
pub fn device_id(file_name: &str) -> &str {
    match file_name.rsplit_once(NAME_SEP) {
        Some((id, _millis)) => id,
        None => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trip() {
        let name = archive_name("356938035643809", 1_385_000_000_000);
        assert_eq!(name, "356938035643809_1385000000000");
        assert_eq!(device_id(&name), "356938035643809");
    }

    #[test]
    fn extension_is_ignored() {
        assert_eq!(device_id("NO_IMEI_12.zip"), "NO_IMEI");
        assert_eq!(device_id("plain"), "plain");
    }
}
