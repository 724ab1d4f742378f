use core::fmt;
use std::sync::LazyLock;

use crate::record::{display_time, Lines, Record, TextFormError, IS};
use crate::schema::{BuildError, Field, Schema};
use crate::util;

/// Battery level as reported by the platform at some moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryReading {
    /// unix time in milliseconds
    pub time: i64,
    /// charge level, -1 if unknown
    pub level: i32,
}

impl BatteryReading {
    /// A reading stamped with the current time.
    pub fn now(level: i32) -> Self {
        Self {
            time: jiff::Timestamp::now().as_millisecond(),
            level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Battery {
    time: i64,
    status: String,
}

#[derive(Debug, Default)]
pub struct BatteryBuilder {
    time: Option<i64>,
    status: Option<String>,
}

type F = Field<Battery>;

static SCHEMA: LazyLock<Schema<Battery>> = LazyLock::new(|| {
    Schema::new(vec![
        F::scalar(
            "TIME",
            |reading| util::number_bytes(reading.time),
            |bytes, b| {
                b.time = Some(util::integer(bytes)?);
                Ok(())
            },
        ),
        F::scalar(
            "STATUS",
            |reading| util::number_bytes(reading.level),
            |bytes, b| {
                b.status = Some(util::text(bytes)?);
                Ok(())
            },
        ),
    ])
});

impl Battery {
    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn status(&self) -> &str {
        &self.status
    }
}

impl Record for Battery {
    type Source = BatteryReading;
    type Builder = BatteryBuilder;

    const FILE_NAME: &'static str = "batt";

    fn schema() -> &'static Schema<Self> {
        &SCHEMA
    }

    fn finish(builder: BatteryBuilder) -> Result<Self, BuildError> {
        Ok(Battery {
            time: builder.time.ok_or_else(|| BuildError::missing("TIME"))?,
            status: builder.status.ok_or_else(|| BuildError::missing("STATUS"))?,
        })
    }

    fn fairly_eq(&self, other: &Self) -> bool {
        self.status == other.status
    }

    fn string_form(&self) -> String {
        format!("{}\nStatus{IS}{}", self.time, self.status)
    }

    fn from_string_form(s: &str) -> Result<Self, TextFormError> {
        let mut lines = Lines::new(s)?;
        Ok(Battery {
            time: lines.time()?,
            status: lines.labeled("Status")?.to_owned(),
        })
    }
}

impl fmt::Display for Battery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Time{IS}{}\nStatus{IS}{}",
            display_time(self.time),
            self.status
        )
    }
}
