//! Publish timestamp parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::types::{DefaultReason, ParseOutcome};

/// Parses a publish timestamp as the upstream platforms emit it.
///
/// Accepted, in order: RFC 3339 (`2026-10-19T08:00:00Z`), RFC 2822 (news
/// `pubDate`), a naive `YYYY-MM-DDTHH:MM:SS` taken as UTC, and a bare
/// `YYYY-MM-DD` taken as midnight UTC.
#[must_use]
pub fn parse_published_at(raw: &str) -> ParseOutcome<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return ParseOutcome::Defaulted(DefaultReason::Missing);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return ParseOutcome::Parsed(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return ParseOutcome::Parsed(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return ParseOutcome::Parsed(naive.and_utc());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return ParseOutcome::Parsed(midnight.and_utc());
    }

    ParseOutcome::Defaulted(DefaultReason::Unrecognized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("2026-10-19T08:30:00Z", Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap())]
    #[case("2026-10-19T17:30:00+09:00", Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap())]
    #[case("Mon, 19 Oct 2026 17:30:00 +0900", Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap())]
    #[case("2026-10-19T08:30:00", Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap())]
    #[case("2026-10-19", Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap())]
    fn accepts_platform_formats(#[case] raw: &str, #[case] expected: DateTime<Utc>) {
        assert_eq!(parse_published_at(raw), ParseOutcome::Parsed(expected));
    }

    #[rstest]
    #[case("yesterday")]
    #[case("2026-13-45")]
    #[case("19/10/2026")]
    fn unparseable_values_default(#[case] raw: &str) {
        assert_eq!(
            parse_published_at(raw),
            ParseOutcome::Defaulted(DefaultReason::Unrecognized)
        );
    }

    #[test]
    fn blank_value_is_missing() {
        assert_eq!(
            parse_published_at(""),
            ParseOutcome::Defaulted(DefaultReason::Missing)
        );
    }
}
