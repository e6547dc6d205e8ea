use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a server timestamp.
///
/// The server emits `isoformat()` strings which may or may not carry an
/// offset. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_offset_timestamp() {
        let dt = parse_timestamp("2024-05-01T12:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        let dt = parse_timestamp("2024-05-01T10:00:00.123456").unwrap();
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_garbage_timestamp() {
        assert!(parse_timestamp("yesterday").is_none());
    }
}
