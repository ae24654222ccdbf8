//! Cache and ledger key derivation.

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::fmt::Display;

use crate::Error;
use crate::clock::Clock;

#[derive(Serialize)]
struct RequestKey<'a> {
    search_term: &'a str,
    page: u32,
}

/// Encode a `(search_term, page)` pair as canonical JSON.
///
/// Field order is fixed by the struct, and JSON string escaping keeps the
/// encoding injective: `{"search_term":"a\",\"page\":1","page":2}` can never
/// collide with a different pair.
pub fn request_key(search_term: &str, page: u32) -> Result<String, Error> {
    serde_json::to_string(&RequestKey { search_term, page }).map_err(Error::from)
}

/// Today's ledger partition (`YYYYMMDD`, server local time).
pub fn date_key(clock: &dyn Clock) -> String {
    date_key_at(&clock.now().with_timezone(&Local))
}

/// Ledger partition for an arbitrary instant, in that instant's own time zone.
pub fn date_key_at<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%Y%m%d").to_string()
}

/// Whether `date` looks like a ledger partition key.
pub fn is_date_key(date: &str) -> bool {
    date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use std::collections::HashSet;

    #[test]
    fn test_request_key_format() {
        let key = request_key("batman", 1).unwrap();
        assert_eq!(key, r#"{"search_term":"batman","page":1}"#);
    }

    #[test]
    fn test_request_key_stability() {
        let key1 = request_key("the matrix", 3).unwrap();
        let key2 = request_key("the matrix", 3).unwrap();
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_request_key_distinct_pairs() {
        let pairs = [
            ("batman", 1),
            ("batman", 2),
            ("batman", 11),
            ("batman1", 1),
            ("Batman", 1),
            ("batman ", 1),
            (r#"a","page":1"#, 2),
            ("a", 1),
            ("a\\", 1),
            ("ünïcödé", 1),
        ];

        let keys: HashSet<String> = pairs.iter().map(|(t, p)| request_key(t, *p).unwrap()).collect();
        assert_eq!(keys.len(), pairs.len());
    }

    #[test]
    fn test_request_key_escapes_quotes() {
        let injected = request_key(r#"x","page":9,"z":""#, 1).unwrap();
        let value: serde_json::Value = serde_json::from_str(&injected).unwrap();
        assert_eq!(value["page"], 1);
        assert_eq!(value["search_term"], r#"x","page":9,"z":""#);
    }

    #[test]
    fn test_date_key_format() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let at = tz.with_ymd_and_hms(2024, 1, 5, 10, 30, 0).unwrap();
        assert_eq!(date_key_at(&at), "20240105");
        assert!(is_date_key(&date_key_at(&at)));
    }

    #[test]
    fn test_date_key_stable_within_day() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let morning = tz.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        let night = tz.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(date_key_at(&morning), date_key_at(&night));
    }

    #[test]
    fn test_date_key_rolls_over_at_local_midnight() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let before = tz.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let after = before + Duration::seconds(1);

        assert_eq!(date_key_at(&before), "20241231");
        assert_eq!(date_key_at(&after), "20250101");
    }

    #[test]
    fn test_date_key_uses_local_offset_not_utc() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let local = tz.with_ymd_and_hms(2024, 6, 2, 1, 0, 0).unwrap();
        assert_eq!(date_key_at(&local), "20240602");
        assert_eq!(date_key_at(&local.with_timezone(&chrono::Utc)), "20240601");
    }

    #[test]
    fn test_is_date_key() {
        assert!(is_date_key("20240101"));
        assert!(!is_date_key("2024011"));
        assert!(!is_date_key("2024-01-01"));
        assert!(!is_date_key("abcdefgh"));
    }
}
