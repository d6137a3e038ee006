//! Parsing of the compact `PT#H#M#S` duration encoding used by video details.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{DefaultReason, ParseOutcome};

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration pattern compiles")
});

/// Converts an encoding like `PT1H2M10S` into total seconds.
///
/// Unit groups are optional but must appear in H, M, S order; trailing text
/// after the last recognised group is ignored. Anything that does not start
/// with `PT` falls back to zero seconds. Overflowing values saturate.
#[must_use]
pub fn parse_duration(encoded: &str) -> ParseOutcome<u64> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return ParseOutcome::Defaulted(DefaultReason::Missing);
    }

    let Some(captures) = DURATION_RE.captures(encoded) else {
        return ParseOutcome::Defaulted(DefaultReason::Unrecognized);
    };

    let unit = |index: usize| -> u64 {
        captures
            .get(index)
            // digits only, so the parse can fail solely on overflow
            .map_or(0, |m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
    };

    let total = unit(1)
        .saturating_mul(3600)
        .saturating_add(unit(2).saturating_mul(60))
        .saturating_add(unit(3));

    ParseOutcome::Parsed(total)
}
