use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// ESPN scoreboard form: minute precision with a `Z` suffix.
const MINUTES_UTC: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]Z");

/// Offset-less form used by SportsData's `DateTime` and `Day` fields.
const NAIVE_SECONDS: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// A point in time, always held and rendered in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Reads the timestamp spellings vendors send for kickoffs and
    /// publication times.
    ///
    /// RFC3339 with any offset is shifted to UTC. Offset-less values are read
    /// as UTC. `None` when nothing matches.
    pub fn from_upstream(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Ok(parsed) = OffsetDateTime::parse(input, &Rfc3339) {
            return Some(Self(parsed.to_offset(UtcOffset::UTC)));
        }
        [MINUTES_UTC, NAIVE_SECONDS]
            .iter()
            .find_map(|format| PrimitiveDateTime::parse(input, *format).ok())
            .map(|naive| Self(naive.assume_utc()))
    }

    pub fn format_rfc3339(self) -> String {
        // Only years outside 0..=9999 fail to format.
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| format!("{:?}", self.0))
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(input: &str) -> Option<String> {
        UtcDateTime::from_upstream(input).map(UtcDateTime::format_rfc3339)
    }

    #[test]
    fn vendor_spellings_normalize_to_utc() {
        assert_eq!(
            normalized("2024-01-06T00:10:00Z").as_deref(),
            Some("2024-01-06T00:10:00Z")
        );
        assert_eq!(
            normalized("2024-01-05T19:30:00-05:00").as_deref(),
            Some("2024-01-06T00:30:00Z")
        );
        assert_eq!(
            normalized("2024-01-06T00:30Z").as_deref(),
            Some("2024-01-06T00:30:00Z")
        );
        assert_eq!(
            normalized(" 2024-01-05T00:00:00 ").as_deref(),
            Some("2024-01-05T00:00:00Z")
        );
    }

    #[test]
    fn unrecognized_spellings_are_none() {
        assert_eq!(normalized("TBD"), None);
        assert_eq!(normalized("2024-01-05"), None);
        assert_eq!(normalized("2024-13-05T00:00:00Z"), None);
    }

    #[test]
    fn now_serializes_as_the_same_z_suffixed_string_it_displays() {
        let now = UtcDateTime::now();
        let json = serde_json::to_value(now).expect("serializable");

        assert_eq!(json, serde_json::Value::String(now.to_string()));
        assert!(now.to_string().ends_with('Z'));
    }
}
