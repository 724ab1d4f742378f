use tracing::instrument;

use crate::framing::{Arity, FieldValue, FIELD_SEP, ITEM_SEP, RECORD_SEP};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error(
        "Field {field} (item {item:?}) contains a record separator, \
        writing it would split the entry"
    )]
    RecordSepInPayload { field: usize, item: Option<usize> },
    #[error(
        "List field {field} holds a single empty item, it would read back \
        as an empty list"
    )]
    LoneEmptyItem { field: usize },
}

/// Turn the values of one record into a single entry.
///
/// `values[i]` must have the arity of `layout[i]`, anything else is a bug in
/// the record type calling this and panics.
///
/// # Errors
/// Returns an error if any payload contains [`RECORD_SEP`], or if a list
/// field holds exactly one empty item (indistinguishable from an empty list
/// on disk). Nothing is produced in that case so the caller can not write
/// an entry that does not parse back.
#[instrument(level = "trace", skip_all, fields(fields = layout.len()))]
pub fn encode(layout: &[Arity], values: &[FieldValue]) -> Result<Vec<u8>, EncodeError> {
    assert_eq!(
        layout.len(),
        values.len(),
        "record type produced {} field values for a schema of {} fields",
        values.len(),
        layout.len()
    );
    check_payloads(values)?;

    let len = values.iter().map(FieldValue::encoded_len).sum();
    let mut entry = Vec::with_capacity(len);
    for (i, (arity, value)) in layout.iter().zip(values).enumerate() {
        match (arity, value) {
            (Arity::Scalar, FieldValue::Scalar(bytes)) => {
                entry.extend_from_slice(bytes);
            }
            (Arity::List, FieldValue::List(items)) => {
                for (n, item) in items.iter().enumerate() {
                    if n > 0 {
                        entry.push(ITEM_SEP);
                    }
                    entry.extend_from_slice(item);
                }
            }
            (arity, value) => panic!(
                "field {i} is {arity:?} in the schema but got a {:?} value",
                value.arity()
            ),
        }
        entry.push(FIELD_SEP);
    }
    terminate(&mut entry);
    Ok(entry)
}

/// Encoding for record types without list fields, there is no item
/// separator logic involved.
///
/// # Errors
/// Returns an error if any payload contains [`RECORD_SEP`].
pub fn encode_scalars(values: &[Vec<u8>]) -> Result<Vec<u8>, EncodeError> {
    assert!(!values.is_empty(), "an entry needs at least one field");
    if let Some(field) = values.iter().position(|v| v.contains(&RECORD_SEP)) {
        return Err(EncodeError::RecordSepInPayload { field, item: None });
    }

    let len = values.iter().map(|v| v.len() + 1).sum();
    let mut entry = Vec::with_capacity(len);
    for value in values {
        entry.extend_from_slice(value);
        entry.push(FIELD_SEP);
    }
    terminate(&mut entry);
    Ok(entry)
}

/// The separator after the last field becomes the record separator.
fn terminate(entry: &mut [u8]) {
    let last = entry
        .last_mut()
        .expect("every field pushes a separator and there is at least one field");
    *last = RECORD_SEP;
}

fn check_payloads(values: &[FieldValue]) -> Result<(), EncodeError> {
    for (field, value) in values.iter().enumerate() {
        match value {
            FieldValue::Scalar(bytes) if bytes.contains(&RECORD_SEP) => {
                return Err(EncodeError::RecordSepInPayload { field, item: None })
            }
            FieldValue::Scalar(_) => (),
            FieldValue::List(items) if matches!(items.as_slice(), [only] if only.is_empty()) => {
                return Err(EncodeError::LoneEmptyItem { field })
            }
            FieldValue::List(items) => {
                if let Some(item) = items.iter().position(|i| i.contains(&RECORD_SEP)) {
                    return Err(EncodeError::RecordSepInPayload {
                        field,
                        item: Some(item),
                    });
                }
            }
        }
    }
    Ok(())
}
