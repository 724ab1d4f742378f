//! Every record type known to the crate, so a whole folder can be parsed
//! without knowing up front which files it holds.

use core::fmt;
use std::path::Path;

use tracing::instrument;

use crate::decode::DEFAULT_READ_BUFFER;
use crate::record::{parse_file, ParseError, Record};
use crate::records::{Battery, Position, Wifi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Battery,
    Position,
    Wifi,
}

/// A parsed record of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Battery(Battery),
    Position(Position),
    Wifi(Wifi),
}

impl Sample {
    pub fn kind(&self) -> RecordKind {
        match self {
            Sample::Battery(_) => RecordKind::Battery,
            Sample::Position(_) => RecordKind::Position,
            Sample::Wifi(_) => RecordKind::Wifi,
        }
    }

    pub fn time(&self) -> i64 {
        match self {
            Sample::Battery(b) => b.time(),
            Sample::Position(p) => p.time(),
            Sample::Wifi(w) => w.time(),
        }
    }

    /// Samples of different kinds are never fairly equal.
    pub fn fairly_eq(&self, other: &Sample) -> bool {
        match (self, other) {
            (Sample::Battery(a), Sample::Battery(b)) => a.fairly_eq(b),
            (Sample::Position(a), Sample::Position(b)) => a.fairly_eq(b),
            (Sample::Wifi(a), Sample::Wifi(b)) => a.fairly_eq(b),
            _ => false,
        }
    }

    pub fn string_form(&self) -> String {
        match self {
            Sample::Battery(b) => b.string_form(),
            Sample::Position(p) => p.string_form(),
            Sample::Wifi(w) => w.string_form(),
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sample::Battery(b) => b.fmt(f),
            Sample::Position(p) => p.fmt(f),
            Sample::Wifi(w) => w.fmt(f),
        }
    }
}

impl From<Battery> for Sample {
    fn from(b: Battery) -> Self {
        Sample::Battery(b)
    }
}

impl From<Position> for Sample {
    fn from(p: Position) -> Self {
        Sample::Position(p)
    }
}

impl From<Wifi> for Sample {
    fn from(w: Wifi) -> Self {
        Sample::Wifi(w)
    }
}

pub type ParseFn = fn(&Path, usize) -> Result<Vec<Sample>, ParseError>;

/// What the registry knows about one record kind.
#[derive(Debug, Clone, Copy)]
pub struct Registered {
    pub kind: RecordKind,
    pub file_name: &'static str,
    pub parse: ParseFn,
}

fn parse_as<R>(path: &Path, read_buffer: usize) -> Result<Vec<Sample>, ParseError>
where
    R: Record + Into<Sample>,
{
    let records = parse_file::<R>(path, read_buffer)?;
    Ok(records.into_iter().map(Into::into).collect())
}

const fn register<R>(kind: RecordKind) -> Registered
where
    R: Record + Into<Sample>,
{
    Registered {
        kind,
        file_name: R::FILE_NAME,
        parse: parse_as::<R>,
    }
}

pub static KINDS: [Registered; 3] = [
    register::<Battery>(RecordKind::Battery),
    register::<Position>(RecordKind::Position),
    register::<Wifi>(RecordKind::Wifi),
];

impl RecordKind {
    pub fn registered(self) -> &'static Registered {
        KINDS
            .iter()
            .find(|r| r.kind == self)
            .expect("every kind is registered")
    }

    pub fn file_name(self) -> &'static str {
        self.registered().file_name
    }

    /// The kind stored in a file with this name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        KINDS.iter().find(|r| r.file_name == name).map(|r| r.kind)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Could not parse {kind:?} data: {error}")]
pub struct FolderError {
    pub kind: RecordKind,
    #[source]
    pub error: ParseError,
}

/// Everything collected in one root folder, per kind in file order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Collected {
    pub batteries: Vec<Battery>,
    pub positions: Vec<Position>,
    pub wifis: Vec<Wifi>,
}

impl Collected {
    pub fn is_empty(&self) -> bool {
        self.batteries.is_empty() && self.positions.is_empty() && self.wifis.is_empty()
    }

    pub fn len(&self) -> usize {
        self.batteries.len() + self.positions.len() + self.wifis.len()
    }

    /// Every sample of every kind, ordered by time. Samples with equal times
    /// keep their kind and file order.
    pub fn samples(&self) -> Vec<Sample> {
        let mut samples: Vec<Sample> = self
            .batteries
            .iter()
            .cloned()
            .map(Sample::from)
            .chain(self.positions.iter().cloned().map(Sample::from))
            .chain(self.wifis.iter().cloned().map(Sample::from))
            .collect();
        samples.sort_by_key(Sample::time);
        samples
    }

    fn push(&mut self, sample: Sample) {
        match sample {
            Sample::Battery(b) => self.batteries.push(b),
            Sample::Position(p) => self.positions.push(p),
            Sample::Wifi(w) => self.wifis.push(w),
        }
    }
}

/// Parse the file of every registered kind in `folder`. Missing files give
/// no samples for their kind.
///
/// # Errors
/// The first kind whose file is malformed or unreadable.
#[instrument(level = "debug", skip(folder), fields(folder = %folder.display()))]
pub fn parse_folder(folder: &Path) -> Result<Collected, FolderError> {
    parse_folder_with_buffer(folder, DEFAULT_READ_BUFFER)
}

pub(crate) fn parse_folder_with_buffer(
    folder: &Path,
    read_buffer: usize,
) -> Result<Collected, FolderError> {
    let mut collected = Collected::default();
    for registered in &KINDS {
        let path = folder.join(registered.file_name);
        let samples = (registered.parse)(&path, read_buffer).map_err(|error| FolderError {
            kind: registered.kind,
            error,
        })?;
        for sample in samples {
            collected.push(sample);
        }
    }
    Ok(collected)
}
