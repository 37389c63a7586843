//! Transaction status values and the rule that derives a status from a date.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Duration, OffsetDateTime};

/// How long a transaction is shown as processing after its date.
pub const PROCESSING_WINDOW: Duration = Duration::days(2);

/// The settlement state of a transaction.
///
/// Only [TransactionStatus::Success] counts towards a displayed balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// The transaction has cleared.
    Success,
    /// The provider reports the transaction as not yet final.
    Pending,
    /// The transaction is recent enough that it may not have cleared yet.
    Processing,
    /// A status the provider sent that has no meaning here. Passed through as-is.
    Other(String),
}

impl TransactionStatus {
    /// The status as it is written on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            TransactionStatus::Success => "Success",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Processing => "Processing",
            TransactionStatus::Other(status) => status,
        }
    }

    /// Whether the transaction is eligible to affect the displayed balance.
    pub fn is_cleared(&self) -> bool {
        *self == TransactionStatus::Success
    }
}

impl From<&str> for TransactionStatus {
    fn from(value: &str) -> Self {
        match value {
            "Success" => TransactionStatus::Success,
            "Pending" => TransactionStatus::Pending,
            "Processing" => TransactionStatus::Processing,
            other => TransactionStatus::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(TransactionStatus::from(text.as_str()))
    }
}

/// Classify a transaction by its date alone.
///
/// Transactions dated less than [PROCESSING_WINDOW] before `now` are
/// [TransactionStatus::Processing]; anything at or beyond the window is
/// [TransactionStatus::Success].
pub fn classify_status(transaction_date: OffsetDateTime, now: OffsetDateTime) -> TransactionStatus {
    if transaction_date > now - PROCESSING_WINDOW {
        TransactionStatus::Processing
    } else {
        TransactionStatus::Success
    }
}

#[cfg(test)]
mod classify_status_tests {
    use time::{Duration, macros::datetime};

    use super::{TransactionStatus, classify_status};

    #[test]
    fn one_day_old_is_processing() {
        let now = datetime!(2026-10-14 12:00 UTC);

        let got = classify_status(now - Duration::days(1), now);

        assert_eq!(got, TransactionStatus::Processing);
    }

    #[test]
    fn exactly_two_days_old_is_success() {
        let now = datetime!(2026-10-14 12:00 UTC);

        let got = classify_status(now - Duration::days(2), now);

        assert_eq!(got, TransactionStatus::Success);
    }

    #[test]
    fn just_inside_window_is_processing() {
        let now = datetime!(2026-10-14 12:00 UTC);

        let got = classify_status(now - Duration::days(2) + Duration::seconds(1), now);

        assert_eq!(got, TransactionStatus::Processing);
    }

    #[test]
    fn three_days_old_is_success() {
        let now = datetime!(2026-10-14 12:00 UTC);

        let got = classify_status(now - Duration::days(3), now);

        assert_eq!(got, TransactionStatus::Success);
    }

    #[test]
    fn future_date_is_processing() {
        let now = datetime!(2026-10-14 12:00 UTC);

        let got = classify_status(now + Duration::hours(5), now);

        assert_eq!(got, TransactionStatus::Processing);
    }
}

#[cfg(test)]
mod serde_tests {
    use super::TransactionStatus;

    #[test]
    fn known_statuses_round_trip_as_plain_strings() {
        let got: TransactionStatus = serde_json::from_str("\"Pending\"").unwrap();

        assert_eq!(got, TransactionStatus::Pending);
        assert_eq!(serde_json::to_string(&got).unwrap(), "\"Pending\"");
    }

    #[test]
    fn unknown_status_passes_through() {
        let got: TransactionStatus = serde_json::from_str("\"Reversed\"").unwrap();

        assert_eq!(got, TransactionStatus::Other("Reversed".to_owned()));
        assert_eq!(serde_json::to_string(&got).unwrap(), "\"Reversed\"");
    }
}
