//! Conversions between field bytes and values. Numbers are stored as their
//! ascii decimal text, text as UTF-8.

use crate::schema::FieldError;

/// Name of the encoding used for every text field.
pub const FILES_ENCODING: &str = "UTF-8";

pub(crate) fn ascii(bytes: &[u8]) -> Result<&str, FieldError> {
    if !bytes.is_ascii() {
        return Err(FieldError::NotAscii);
    }
    std::str::from_utf8(bytes).map_err(|_| FieldError::NotAscii)
}

pub(crate) fn integer<T>(bytes: &[u8]) -> Result<T, FieldError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    Ok(ascii(bytes)?.parse()?)
}

pub(crate) fn decimal(bytes: &[u8]) -> Result<f64, FieldError> {
    Ok(ascii(bytes)?.parse()?)
}

pub(crate) fn text(bytes: &[u8]) -> Result<String, FieldError> {
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub(crate) fn number_bytes(n: impl ToString) -> Vec<u8> {
    n.to_string().into_bytes()
}
