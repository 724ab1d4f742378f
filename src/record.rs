use core::fmt;
use std::io;
use std::path::Path;

use tracing::{debug, instrument};

use crate::decode::{self, DecodeError};
use crate::file;
use crate::schema::{BuildError, Schema};

/// A kind of sample that can be stored in and parsed from its own file.
pub trait Record: Sized + fmt::Debug + 'static {
    /// What the platform hands us, e.g. a location fix.
    type Source;
    /// Collects field values while an entry is reconstructed.
    type Builder: Default;

    /// Name of the file holding the entries of this record type.
    const FILE_NAME: &'static str;

    fn schema() -> &'static Schema<Self>;

    /// Called once every field has been applied to the builder.
    fn finish(builder: Self::Builder) -> Result<Self, BuildError>;

    /// Equal in the attributes that matter when comparing a stored reading
    /// with a fresh one.
    fn fairly_eq(&self, other: &Self) -> bool;

    /// Text form that keeps the time as milliseconds, see
    /// [`from_string_form`](Record::from_string_form).
    fn string_form(&self) -> String;

    fn from_string_form(s: &str) -> Result<Self, TextFormError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Could not open data file: {0}")]
    Open(io::Error),
    #[error("Could not split file into entries: {0}")]
    Decode(#[from] DecodeError),
    #[error("Malformed file, entry {entry}: {error}")]
    Malformed {
        entry: usize,
        #[source]
        error: BuildError,
    },
}

/// Parse every entry of a record type's file.
///
/// A missing file means nothing was collected yet and gives an empty list.
/// The first malformed entry aborts the parse, no entry is skipped.
///
/// # Errors
/// See the [`ParseError`] docs for everything that can go wrong.
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display(), kind = R::FILE_NAME))]
pub fn parse_file<R: Record>(
    path: impl AsRef<Path>,
    read_buffer: usize,
) -> Result<Vec<R>, ParseError> {
    let Some(file) = file::open_existing(path.as_ref()).map_err(ParseError::Open)? else {
        debug!("no data file yet");
        return Ok(Vec::new());
    };

    let schema = R::schema();
    let mut records = Vec::new();
    for (entry, values) in decode::decode_with_buffer(file, schema.layout(), read_buffer).enumerate()
    {
        let record = schema
            .build(&values?)
            .map_err(|error| ParseError::Malformed { entry, error })?;
        records.push(record);
    }
    debug!(records = records.len(), "parsed data file");
    Ok(records)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextFormError {
    #[error("Text form is empty")]
    Empty,
    #[error("Missing line: {0}")]
    MissingLine(&'static str),
    #[error("Expected a line starting with {expected:?}, got: {line:?}")]
    Label { expected: &'static str, line: String },
    #[error("Invalid number in line {0:?}")]
    Number(String),
}

pub(crate) const IS: &str = ": ";

/// Reads `<label>: <value>` lines in order.
pub(crate) struct Lines<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> Lines<'a> {
    pub(crate) fn new(s: &'a str) -> Result<Self, TextFormError> {
        if s.trim().is_empty() {
            return Err(TextFormError::Empty);
        }
        Ok(Self { lines: s.lines() })
    }

    pub(crate) fn time(&mut self) -> Result<i64, TextFormError> {
        let line = self.lines.next().ok_or(TextFormError::MissingLine("time"))?;
        parse_number(line.trim())
    }

    pub(crate) fn labeled(&mut self, label: &'static str) -> Result<&'a str, TextFormError> {
        let line = self.lines.next().ok_or(TextFormError::MissingLine(label))?;
        labeled(line, label)
    }

    pub(crate) fn rest(self) -> impl Iterator<Item = &'a str> {
        self.lines.filter(|l| !l.trim().is_empty())
    }
}

pub(crate) fn labeled<'a>(line: &'a str, label: &'static str) -> Result<&'a str, TextFormError> {
    line.strip_prefix(label)
        .and_then(|rest| rest.strip_prefix(IS))
        .map(str::trim)
        .ok_or_else(|| TextFormError::Label {
            expected: label,
            line: line.to_owned(),
        })
}

pub(crate) fn parse_number<T: std::str::FromStr>(s: &str) -> Result<T, TextFormError> {
    s.parse().map_err(|_| TextFormError::Number(s.to_owned()))
}

/// Human readable form of a millisecond unix time.
pub(crate) fn display_time(millis: i64) -> String {
    match jiff::Timestamp::from_millisecond(millis) {
        Ok(ts) => ts.to_string(),
        Err(_) => format!("{millis} ms"),
    }
}
