//! Parsing and serialization of the timestamps sent by the bank data provider.
//!
//! The provider sends either full RFC 3339 timestamps or plain calendar dates
//! (`YYYY-MM-DD`). Plain dates are treated as midnight UTC.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date.
///
/// Returns `None` if `value` is neither.
pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();

    if let Ok(timestamp) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(timestamp);
    }

    Date::parse(value, DATE_FORMAT)
        .ok()
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
}

/// Serde adapter that reads [parse_timestamp] formats and writes RFC 3339.
pub mod rfc3339_or_date {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    use super::parse_timestamp;

    pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let text = value.format(&Rfc3339).map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;

        parse_timestamp(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp \"{text}\"")))
    }
}
