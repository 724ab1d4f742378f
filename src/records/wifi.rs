use core::fmt;
use std::sync::LazyLock;

use itertools::Itertools;

use crate::record::{
    display_time, labeled, parse_number, Lines, Record, TextFormError, IS,
};
use crate::schema::{BuildError, Field, FieldError, Schema};
use crate::util;

/// One access point as seen during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub ssid: String,
    pub bssid: String,
    /// MHz
    pub frequency: i32,
    /// dBm
    pub level: i32,
}

/// The results of one Wi-Fi scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiScan {
    /// unix time in milliseconds
    pub time: i64,
    pub results: Vec<ScanResult>,
}

impl WifiScan {
    /// A scan stamped with the current time.
    pub fn now(results: Vec<ScanResult>) -> Self {
        Self {
            time: jiff::Timestamp::now().as_millisecond(),
            results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    ssid: String,
    bssid: String,
    frequency: i32,
    level: i32,
}

impl Network {
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn bssid(&self) -> &str {
        &self.bssid
    }

    pub fn frequency(&self) -> i32 {
        self.frequency
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Same ssid and bssid.
    pub fn fairly_eq(&self, other: &Network) -> bool {
        self.ssid == other.ssid && self.bssid == other.bssid
    }
}

const SEP: &str = ", ";

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ssid{IS}{}{SEP}Bssid{IS}{}{SEP}Frequency{IS}{}{SEP}Level{IS}{}",
            self.ssid, self.bssid, self.frequency, self.level
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wifi {
    time: i64,
    networks: Vec<Network>,
}

#[derive(Debug, Default)]
struct NetworkBuilder {
    ssid: Option<String>,
    bssid: Option<String>,
    frequency: Option<i32>,
    level: Option<i32>,
}

#[derive(Debug, Default)]
pub struct WifiBuilder {
    time: Option<i64>,
    /// sized by the first list field applied, together with its name
    networks: Option<(&'static str, Vec<NetworkBuilder>)>,
}

impl WifiBuilder {
    /// Hands every item of a list field to the network at its index. The
    /// first list field decides how many networks there are, every later one
    /// must have exactly as many items.
    fn per_network<T>(
        &mut self,
        field: &'static str,
        items: &[Vec<u8>],
        decode: impl Fn(&[u8]) -> Result<T, FieldError>,
        set: impl Fn(&mut NetworkBuilder, T),
    ) -> Result<(), FieldError> {
        let (first, networks) = self.networks.get_or_insert_with(|| {
            let networks = items.iter().map(|_| NetworkBuilder::default()).collect();
            (field, networks)
        });
        let first = *first;

        if items.len() > networks.len() {
            return Err(FieldError::ExtraItems {
                extra: field,
                missing: first,
            });
        }
        if items.len() < networks.len() {
            return Err(FieldError::ExtraItems {
                extra: first,
                missing: field,
            });
        }

        for (network, item) in networks.iter_mut().zip(items) {
            set(network, decode(item)?);
        }
        Ok(())
    }
}

type F = Field<Wifi>;

static SCHEMA: LazyLock<Schema<Wifi>> = LazyLock::new(|| {
    Schema::new(vec![
        F::scalar(
            "TIME",
            |scan| util::number_bytes(scan.time),
            |bytes, b| {
                b.time = Some(util::integer(bytes)?);
                Ok(())
            },
        ),
        // separator bytes in an ssid are written as is, see `framing`
        F::list(
            "SSID",
            |scan| {
                scan.results
                    .iter()
                    .map(|r| r.ssid.as_bytes().to_vec())
                    .collect()
            },
            |items, b| b.per_network("SSID", items, util::text, |n, v| n.ssid = Some(v)),
        ),
        F::list(
            "BSSID",
            |scan| {
                scan.results
                    .iter()
                    .map(|r| r.bssid.as_bytes().to_vec())
                    .collect()
            },
            |items, b| b.per_network("BSSID", items, util::text, |n, v| n.bssid = Some(v)),
        ),
        F::list(
            "FREQUENCY",
            |scan| {
                scan.results
                    .iter()
                    .map(|r| util::number_bytes(r.frequency))
                    .collect()
            },
            |items, b| {
                b.per_network("FREQUENCY", items, util::integer::<i32>, |n, v| {
                    n.frequency = Some(v)
                })
            },
        ),
        F::list(
            "LEVEL",
            |scan| {
                scan.results
                    .iter()
                    .map(|r| util::number_bytes(r.level))
                    .collect()
            },
            |items, b| b.per_network("LEVEL", items, util::integer::<i32>, |n, v| n.level = Some(v)),
        ),
    ])
});

impl Wifi {
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }
}

impl Record for Wifi {
    type Source = WifiScan;
    type Builder = WifiBuilder;

    const FILE_NAME: &'static str = "wifi";

    fn schema() -> &'static Schema<Self> {
        &SCHEMA
    }

    fn finish(b: WifiBuilder) -> Result<Self, BuildError> {
        let time = b.time.ok_or_else(|| BuildError::missing("TIME"))?;
        let networks = match b.networks {
            None => Vec::new(),
            Some((_, networks)) => networks
                .into_iter()
                .map(|n| -> Result<Network, BuildError> {
                    Ok(Network {
                        ssid: n.ssid.ok_or_else(|| BuildError::missing("SSID"))?,
                        bssid: n.bssid.ok_or_else(|| BuildError::missing("BSSID"))?,
                        frequency: n
                            .frequency
                            .ok_or_else(|| BuildError::missing("FREQUENCY"))?,
                        level: n.level.ok_or_else(|| BuildError::missing("LEVEL"))?,
                    })
                })
                .collect::<Result<_, _>>()?,
        };
        Ok(Wifi { time, networks })
    }

    /// Same number of networks and each of ours has a fairly equal one
    /// in `other`.
    fn fairly_eq(&self, other: &Self) -> bool {
        self.networks.len() == other.networks.len()
            && self
                .networks
                .iter()
                .all(|net| other.networks.iter().any(|o| o.fairly_eq(net)))
    }

    fn string_form(&self) -> String {
        let mut form = self.time.to_string();
        for network in &self.networks {
            form.push('\n');
            form.push_str(&network.to_string());
        }
        form
    }

    fn from_string_form(s: &str) -> Result<Self, TextFormError> {
        let mut lines = Lines::new(s)?;
        let time = lines.time()?;
        let networks = lines
            .rest()
            .map(network_from_line)
            .collect::<Result<_, _>>()?;
        Ok(Wifi { time, networks })
    }
}

fn network_from_line(line: &str) -> Result<Network, TextFormError> {
    let mut parts = line.split(SEP);
    let mut next = |label| {
        let part = parts.next().ok_or(TextFormError::MissingLine(label))?;
        labeled(part, label)
    };
    Ok(Network {
        ssid: next("Ssid")?.to_owned(),
        bssid: next("Bssid")?.to_owned(),
        frequency: parse_number(next("Frequency")?)?,
        level: parse_number(next("Level")?)?,
    })
}

impl fmt::Display for Wifi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Time{IS}{}", display_time(self.time))?;
        if !self.networks.is_empty() {
            write!(f, "\n{}", self.networks.iter().join("\n"))?;
        }
        Ok(())
    }
}
