//! Serde helpers for persisted instants.
//!
//! Instants are stored as local `NaiveDateTime`, but records written by older
//! installations carry offset-aware ISO-8601 strings (`...Z`, `...+01:00`).
//! Deserialization accepts both, converting offset-bearing instants to local
//! naive time; serialization always writes the naive form.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, de};

pub fn parse(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    s.parse::<NaiveDateTime>().ok()
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).ok_or_else(|| de::Error::custom(format!("invalid instant: {}", s)))
}

pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) => parse(&s)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid instant: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn naive_strings_parse() {
        assert_eq!(
            parse("2027-01-01T23:59:59"),
            NaiveDate::from_ymd_opt(2027, 1, 1)
                .unwrap()
                .and_hms_opt(23, 59, 59)
        );
        assert!(parse("2027-01-01T23:59:59.123").is_some());
    }

    #[test]
    fn offset_suffixed_strings_parse_to_local() {
        let parsed = parse("1990-01-01T00:00:00Z").unwrap();
        let expected = Utc
            .with_ymd_and_hms(1990, 1, 1, 0, 0, 0)
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(parsed, expected);

        assert!(parse("2027-01-01T23:59:59.000+01:00").is_some());
        assert!(parse("2027-01-01T23:59:59-05:30").is_some());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse("tomorrow").is_none());
        assert!(parse("2027-01-01").is_none());
        assert!(parse("").is_none());
    }
}
