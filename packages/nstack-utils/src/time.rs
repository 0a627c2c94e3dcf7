use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// The timestamp used before anything has ever been synchronized.
pub fn distant_past() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Wire and storage representation, e.g. `2024-05-01T12:00:00+00:00`.
pub fn format_timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, false)
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
