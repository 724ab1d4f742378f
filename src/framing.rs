//! The three sentinel bytes that give an entry its structure.
//!
//! An entry is one line: field blocks separated by [`FIELD_SEP`], the items of
//! a list field separated by [`ITEM_SEP`], and the whole thing terminated by
//! [`RECORD_SEP`] which takes the place of the last field separator.
//!
//! Payloads are not escaped. A [`RECORD_SEP`] in a payload is refused by the
//! encoder, as is a list holding one empty item, which would read back as an
//! empty list. [`FIELD_SEP`] in any payload, or [`ITEM_SEP`] in a list item,
//! is written as is and splits the field when read.

/// Ends a field block.
pub const FIELD_SEP: u8 = 0x00;
/// Ends an item inside a list field. Ordinary payload inside scalar fields.
pub const ITEM_SEP: u8 = 0x01;
/// Ends an entry. Must never appear inside a payload.
pub const RECORD_SEP: u8 = b'\n';

/// Whether a field holds a single buffer or a list of them. This is schema
/// metadata, the bytes on disk do not carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Scalar,
    List,
}

/// The raw bytes of one field of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Scalar(Vec<u8>),
    List(Vec<Vec<u8>>),
}

impl FieldValue {
    pub fn arity(&self) -> Arity {
        match self {
            FieldValue::Scalar(_) => Arity::Scalar,
            FieldValue::List(_) => Arity::List,
        }
    }

    /// Number of bytes this value takes on disk, including the separators
    /// between its items and the one that closes it.
    pub(crate) fn encoded_len(&self) -> usize {
        match self {
            FieldValue::Scalar(bytes) => bytes.len() + 1,
            FieldValue::List(items) => {
                let payload: usize = items.iter().map(Vec::len).sum();
                payload + items.len().saturating_sub(1) + 1
            }
        }
    }
}
