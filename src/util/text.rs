/// テキスト処理ユーティリティ。
///
/// マークアップ除去とUnicode正規化を提供します。
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static MARKUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("markup pattern compiles"));

/// HTMLタグを除去する。
///
/// 検索APIのタイトルは `<b>` などの強調タグを含むため、表示・集計前に取り除きます。
/// エンティティのデコードは行いません。
#[must_use]
pub fn strip_markup(text: &str) -> String {
    MARKUP_RE.replace_all(text, "").into_owned()
}

/// NFC正規化する。分解形のハングル字母を音節に合成します。
#[must_use]
pub fn normalize_nfc(text: &str) -> String {
    text.nfc().collect::<String>()
}
