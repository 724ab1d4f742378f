use std::io::{self, BufRead, BufReader, Read};
use std::mem;

use tracing::{instrument, warn};

use crate::framing::{Arity, FieldValue, FIELD_SEP, ITEM_SEP, RECORD_SEP};

/// Same as the default of [`BufReader`].
pub const DEFAULT_READ_BUFFER: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Could not read entries: {0}")]
    Io(#[from] io::Error),
    #[error("Entry {entry} has more than the {expected} fields of its schema")]
    TooManyFields { entry: usize, expected: usize },
    #[error("Entry {entry} has {found} fields, its schema needs {expected}")]
    TooFewFields {
        entry: usize,
        expected: usize,
        found: usize,
    },
}

/// Splits a byte stream into entries, each entry into one [`FieldValue`] per
/// field of the layout. Bytes are fed in one at a time, the scanner keeps no
/// state from one entry to the next.
#[derive(Debug)]
pub(crate) struct Scanner<'a> {
    layout: &'a [Arity],
    fields: Vec<FieldValue>,
    items: Vec<Vec<u8>>,
    current: Vec<u8>,
    /// at least one byte of the current entry has been seen
    started: bool,
    /// index of the entry being scanned
    entry: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(layout: &'a [Arity]) -> Self {
        Self {
            layout,
            fields: Vec::with_capacity(layout.len()),
            items: Vec::new(),
            current: Vec::new(),
            started: false,
            entry: 0,
        }
    }

    /// Returns a finished entry once its record separator is pushed.
    pub(crate) fn push(&mut self, byte: u8) -> Result<Option<Vec<FieldValue>>, DecodeError> {
        self.started = true;
        match byte {
            RECORD_SEP => {
                self.close_field()?;
                if self.fields.len() != self.layout.len() {
                    return Err(DecodeError::TooFewFields {
                        entry: self.entry,
                        expected: self.layout.len(),
                        found: self.fields.len(),
                    });
                }
                self.started = false;
                self.entry += 1;
                let entry = mem::replace(&mut self.fields, Vec::with_capacity(self.layout.len()));
                Ok(Some(entry))
            }
            FIELD_SEP => {
                self.close_field()?;
                Ok(None)
            }
            ITEM_SEP if self.current_arity() == Some(Arity::List) => {
                let item = mem::take(&mut self.current);
                self.items.push(item);
                Ok(None)
            }
            payload => {
                self.current.push(payload);
                Ok(None)
            }
        }
    }

    /// An entry is in progress but its record separator has not been seen.
    pub(crate) fn has_partial_entry(&self) -> bool {
        self.started
    }

    fn current_arity(&self) -> Option<Arity> {
        self.layout.get(self.fields.len()).copied()
    }

    fn close_field(&mut self) -> Result<(), DecodeError> {
        let arity = self.current_arity().ok_or(DecodeError::TooManyFields {
            entry: self.entry,
            expected: self.layout.len(),
        })?;
        let value = match arity {
            Arity::Scalar => FieldValue::Scalar(mem::take(&mut self.current)),
            Arity::List => {
                // a zero length span is an empty list, not one empty item
                if !(self.items.is_empty() && self.current.is_empty()) {
                    let last = mem::take(&mut self.current);
                    self.items.push(last);
                }
                FieldValue::List(mem::take(&mut self.items))
            }
        };
        self.fields.push(value);
        Ok(())
    }
}

/// Lazily decoded entries of a byte stream.
///
/// Stops after the first error. A trailing entry that is not terminated is
/// dropped, it is only ever returned once its record separator has been read.
#[derive(Debug)]
pub struct Entries<'a, R> {
    reader: BufReader<R>,
    scanner: Scanner<'a>,
    done: bool,
}

/// Decode the entries in `reader` according to `layout`.
pub fn decode<R: Read>(reader: R, layout: &[Arity]) -> Entries<'_, R> {
    decode_with_buffer(reader, layout, DEFAULT_READ_BUFFER)
}

pub fn decode_with_buffer<R: Read>(
    reader: R,
    layout: &[Arity],
    buffer_size: usize,
) -> Entries<'_, R> {
    Entries {
        reader: BufReader::with_capacity(buffer_size, reader),
        scanner: Scanner::new(layout),
        done: false,
    }
}

/// Collect every entry, failing on the first malformed one.
///
/// # Errors
/// See [`DecodeError`].
#[instrument(level = "debug", skip(reader))]
pub fn decode_all<R: Read>(
    reader: R,
    layout: &[Arity],
) -> Result<Vec<Vec<FieldValue>>, DecodeError> {
    decode(reader, layout).collect()
}

impl<R: Read> Entries<'_, R> {
    fn next_entry(&mut self) -> Result<Option<Vec<FieldValue>>, DecodeError> {
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if buf.is_empty() {
                if self.scanner.has_partial_entry() {
                    warn!(
                        entry = self.scanner.entry,
                        "Discarding entry without record separator at end of stream"
                    );
                }
                return Ok(None);
            }

            let mut used = 0;
            let mut finished = None;
            for byte in buf {
                used += 1;
                if let Some(entry) = self.scanner.push(*byte)? {
                    finished = Some(entry);
                    break;
                }
            }
            self.reader.consume(used);

            if finished.is_some() {
                return Ok(finished);
            }
        }
    }
}

impl<R: Read> Iterator for Entries<'_, R> {
    type Item = Result<Vec<FieldValue>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for Entries<'_, R> {}
