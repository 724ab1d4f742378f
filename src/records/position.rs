use core::fmt;
use std::sync::LazyLock;

use crate::record::{display_time, parse_number, Lines, Record, TextFormError, IS};
use crate::schema::{BuildError, Field, Schema};
use crate::util;

/// A location fix as handed over by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    /// unix time of the fix in milliseconds
    pub time: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub provider: String,
}

impl Fix {
    /// A fix stamped with the current time.
    pub fn now(latitude: f64, longitude: f64, provider: impl Into<String>) -> Self {
        Self {
            time: jiff::Timestamp::now().as_millisecond(),
            latitude,
            longitude,
            provider: provider.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    time: i64,
    latitude: f64,
    longitude: f64,
    provider: String,
}

#[derive(Debug, Default)]
pub struct PositionBuilder {
    time: Option<i64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    provider: Option<String>,
}

type F = Field<Position>;

static SCHEMA: LazyLock<Schema<Position>> = LazyLock::new(|| {
    Schema::new(vec![
        F::scalar(
            "TIME",
            |fix| util::number_bytes(fix.time),
            |bytes, b| {
                b.time = Some(util::integer(bytes)?);
                Ok(())
            },
        ),
        F::scalar(
            "LAT",
            |fix| util::number_bytes(fix.latitude),
            |bytes, b| {
                b.latitude = Some(util::decimal(bytes)?);
                Ok(())
            },
        ),
        F::scalar(
            "LONG",
            |fix| util::number_bytes(fix.longitude),
            |bytes, b| {
                b.longitude = Some(util::decimal(bytes)?);
                Ok(())
            },
        ),
        F::scalar(
            "PROVIDER",
            |fix| fix.provider.as_bytes().to_vec(),
            |bytes, b| {
                b.provider = Some(util::text(bytes)?);
                Ok(())
            },
        ),
    ])
});

impl Position {
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

impl Record for Position {
    type Source = Fix;
    type Builder = PositionBuilder;

    const FILE_NAME: &'static str = "loc";

    fn schema() -> &'static Schema<Self> {
        &SCHEMA
    }

    fn finish(b: PositionBuilder) -> Result<Self, BuildError> {
        Ok(Position {
            time: b.time.ok_or_else(|| BuildError::missing("TIME"))?,
            latitude: b.latitude.ok_or_else(|| BuildError::missing("LAT"))?,
            longitude: b.longitude.ok_or_else(|| BuildError::missing("LONG"))?,
            provider: b.provider.ok_or_else(|| BuildError::missing("PROVIDER"))?,
        })
    }

    fn fairly_eq(&self, other: &Self) -> bool {
        self.latitude == other.latitude
            && self.longitude == other.longitude
            && self.provider == other.provider
    }

    fn string_form(&self) -> String {
        format!(
            "{}\nLongitude{IS}{}\nLatitude{IS}{}\nProvider{IS}{}",
            self.time, self.longitude, self.latitude, self.provider
        )
    }

    fn from_string_form(s: &str) -> Result<Self, TextFormError> {
        let mut lines = Lines::new(s)?;
        let time = lines.time()?;
        let longitude = parse_number(lines.labeled("Longitude")?)?;
        let latitude = parse_number(lines.labeled("Latitude")?)?;
        let provider = lines.labeled("Provider")?.to_owned();
        Ok(Position {
            time,
            latitude,
            longitude,
            provider,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Time{IS}{}\nLongitude{IS}{}\nLatitude{IS}{}\nProvider{IS}{}",
            display_time(self.time),
            self.longitude,
            self.latitude,
            self.provider
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldError;

    fn athens() -> Fix {
        Fix {
            time: 1_385_000_000_123,
            latitude: 37.983810,
            longitude: 23.727539,
            provider: "gps".to_owned(),
        }
    }

    #[test]
    fn values_are_decimal_text() {
        let values = Position::schema().extract(&athens());
        let text: Vec<_> = values
            .iter()
            .map(|v| match v {
                crate::FieldValue::Scalar(bytes) => String::from_utf8(bytes.clone()).unwrap(),
                crate::FieldValue::List(_) => unreachable!("position has no lists"),
            })
            .collect();
        assert_eq!(text, ["1385000000123", "37.98381", "23.727539", "gps"]);
    }

    #[test]
    fn extract_then_build() {
        let schema = Position::schema();
        let position = schema.build(&schema.extract(&athens())).unwrap();
        assert_eq!(position.time(), 1_385_000_000_123);
        assert_eq!(position.latitude(), 37.983810);
        assert_eq!(position.longitude(), 23.727539);
        assert_eq!(position.provider(), "gps");
    }

    #[test]
    fn bad_latitude() {
        let schema = Position::schema();
        let mut values = schema.extract(&athens());
        values[1] = crate::FieldValue::Scalar(b"north".to_vec());
        let err = schema.build(&values).unwrap_err();
        assert_eq!(err.field, "LAT");
        assert!(matches!(err.cause, FieldError::Decimal(_)));
    }

    #[test]
    fn string_form_round_trips() {
        let schema = Position::schema();
        let position = schema.build(&schema.extract(&athens())).unwrap();
        let parsed = Position::from_string_form(&position.string_form()).unwrap();
        assert_eq!(parsed, position);
    }

    #[test]
    fn string_form_needs_labels() {
        let err = Position::from_string_form("12\nLat: 1.0\nLongitude: 2.0\nProvider: gps")
            .unwrap_err();
        assert!(matches!(
            err,
            TextFormError::Label {
                expected: "Longitude",
                ..
            }
        ));
    }
}
