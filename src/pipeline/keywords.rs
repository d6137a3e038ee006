//! Keyword extraction from titles and top-N frequency summaries.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::util::text::{normalize_nfc, strip_markup};

/// Number of keywords kept by the trend summaries.
pub const DEFAULT_TOP_KEYWORDS: usize = 20;

// Hangul syllables, two or more in a row.
static KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[가-힣]{2,}").expect("keyword pattern compiles"));

/// Tokens of a single title: markup stripped, then maximal Hangul runs.
#[must_use]
pub fn extract_title_keywords(title: &str) -> Vec<String> {
    let cleaned = strip_markup(&normalize_nfc(title));
    KEYWORD_RE
        .find_iter(&cleaned)
        .map(|token| token.as_str().to_string())
        .collect()
}

/// Flat token stream over `titles`, in input order with duplicates kept.
///
/// Latin text, digits, punctuation and single-syllable fragments are dropped.
#[must_use]
pub fn extract_keywords<I, S>(titles: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    titles
        .into_iter()
        .flat_map(|title| extract_title_keywords(title.as_ref()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub frequency: usize,
}

/// Counts `tokens` and keeps the `limit` most frequent.
///
/// Ties are broken by first appearance in the stream.
#[must_use]
pub fn top_keywords<I, S>(tokens: I, limit: usize) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: FxHashMap<String, (usize, usize)> = FxHashMap::default();
    for (position, token) in tokens.into_iter().enumerate() {
        let entry = counts
            .entry(token.as_ref().to_string())
            .or_insert((0, position));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(keyword, (frequency, first_seen))| (keyword, frequency, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(keyword, frequency, _)| KeywordCount { keyword, frequency })
        .collect()
}

/// Counts raw video tags as-is (no tokenization); blank tags are ignored.
#[must_use]
pub fn tally_tags<I, S>(tags: I, limit: usize) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let cleaned: Vec<String> = tags
        .into_iter()
        .map(|tag| tag.as_ref().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();
    top_keywords(cleaned, limit)
}
