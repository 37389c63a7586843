//! Display formatting for dates, money and free text.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use serde::Serialize;
use time::{
    OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::timestamp::parse_timestamp;

/// The text shown in place of a date that could not be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[weekday repr:short], [month repr:short] [day padding:none], [hour repr:12 padding:none]:[minute] [period]"
);
const DATE_DAY_FORMAT: &[BorrowedFormatItem] =
    format_description!("[weekday repr:short], [month]/[day]/[year]");
const DATE_ONLY_FORMAT: &[BorrowedFormatItem] =
    format_description!("[month repr:short] [day padding:none], [year]");
const TIME_ONLY_FORMAT: &[BorrowedFormatItem] =
    format_description!("[hour repr:12 padding:none]:[minute] [period]");

/// A timestamp rendered four ways for the dashboard widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeStrings {
    /// e.g. "Wed, Oct 14, 3:05 PM"
    pub date_time: String,
    /// e.g. "Wed, 10/14/2026"
    pub date_day: String,
    /// e.g. "Oct 14, 2026"
    pub date_only: String,
    /// e.g. "3:05 PM"
    pub time_only: String,
}

impl DateTimeStrings {
    fn invalid() -> Self {
        Self {
            date_time: INVALID_DATE.to_owned(),
            date_day: INVALID_DATE.to_owned(),
            date_only: INVALID_DATE.to_owned(),
            time_only: INVALID_DATE.to_owned(),
        }
    }
}

/// Format `value` in the timezone `offset`.
pub fn format_date_time(value: OffsetDateTime, offset: UtcOffset) -> DateTimeStrings {
    let local = value.to_offset(offset);
    let format = |description| {
        local
            .format(description)
            .unwrap_or_else(|_| INVALID_DATE.to_owned())
    };

    DateTimeStrings {
        date_time: format(DATE_TIME_FORMAT),
        date_day: format(DATE_DAY_FORMAT),
        date_only: format(DATE_ONLY_FORMAT),
        time_only: format(TIME_ONLY_FORMAT),
    }
}

/// Parse `value` with [parse_timestamp] and format it with [format_date_time].
///
/// Text that is not a timestamp is rendered as [INVALID_DATE] in every field.
pub fn format_date_time_str(value: &str, offset: UtcOffset) -> DateTimeStrings {
    match parse_timestamp(value) {
        Some(timestamp) => format_date_time(timestamp, offset),
        None => DateTimeStrings::invalid(),
    }
}

/// Format `amount` as US dollars with two decimal places, e.g. "-$1,234.50".
///
/// The amount is rounded half away from zero to the nearest cent. A negative
/// amount that rounds to zero keeps its sign, e.g. "-$0.00".
pub fn format_amount(amount: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    if !amount.is_finite() {
        return "$0.00".to_owned();
    }

    let prefix = if amount < 0.0 { "-$" } else { "$" };
    let rounded = (amount.abs() * 100.0).round() / 100.0;

    if rounded == 0.0 {
        // numfmt renders zero as a bare "0"
        return format!("{prefix}0.00");
    }

    if rounded >= NUMFMT_PLAIN_LIMIT {
        return format!("{prefix}{}", group_cents(rounded));
    }

    let formatted = if amount < 0.0 {
        negative_fmt.fmt_string(rounded)
    } else {
        positive_fmt.fmt_string(rounded)
    };

    pad_fraction_digits(formatted)
}

// numfmt switches to scientific notation past twelve integer digits.
const NUMFMT_PLAIN_LIMIT: f64 = 1e11;

// Digit grouping for amounts numfmt would print in scientific notation.
fn group_cents(rounded: f64) -> String {
    let cents = (rounded * 100.0).round() as u128;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3 + 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{grouped}.{:02}", cents % 100)
}

// numfmt drops trailing zeros in the fraction, e.g. "$12.3" or "$5,000".
fn pad_fraction_digits(mut formatted: String) -> String {
    match formatted.rfind('.') {
        Some(point) => {
            let digits = formatted.len() - point - 1;
            for _ in digits..2 {
                formatted.push('0');
            }
        }
        None => formatted.push_str(".00"),
    }

    formatted
}

/// Strip everything except ASCII word characters (`[A-Za-z0-9_]`) and whitespace.
///
/// `None` produces an empty string.
pub fn remove_special_characters(value: Option<&str>) -> String {
    value
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}


#[cfg(test)]
mod format_amount_tests {
    use super::format_amount;

    #[test]
    fn formats_with_two_decimal_places() {
        assert_eq!(format_amount(1234.5), "$1,234.50");
        assert_eq!(format_amount(12.34), "$12.34");
    }

    #[test]
    fn formats_whole_numbers() {
        assert_eq!(format_amount(5000.0), "$5,000.00");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_amount(-150000.0), "-$150,000.00");
    }

    #[test]
    fn formats_zero() {
        assert_eq!(format_amount(0.0), "$0.00");
    }

    #[test]
    fn fractions_of_a_cent_round_to_zero() {
        assert_eq!(format_amount(0.001), "$0.00");
        assert_eq!(format_amount(-0.001), "-$0.00");
    }

    #[test]
    fn rounds_to_the_nearest_cent() {
        assert_eq!(format_amount(9.999), "$10.00");
        assert_eq!(format_amount(0.005), "$0.01");
        assert_eq!(format_amount(-2.567), "-$2.57");
    }

    #[test]
    fn large_amounts_are_not_in_scientific_notation() {
        assert_eq!(format_amount(1e15), "$1,000,000,000,000,000.00");
        assert_eq!(format_amount(-123_456_789_012.5), "-$123,456,789,012.50");
        assert_eq!(format_amount(99_999_999_999.99), "$99,999,999,999.99");
    }
}
